use crate::application::ports::{
    Clock, ImageUrlResolver, ListingRepository, SessionProvider, ViewRecordRepository,
};
use crate::domain::entities::{ClearResult, Listing, RecentlyViewedListing, ViewRecord};
use crate::domain::value_objects::{ListingId, UserId, ViewRecordId};
use crate::shared::config::RecentlyViewedConfig;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// 物件の閲覧履歴（recently viewed）を管理するサービス
///
/// 閲覧の記録はベストエフォートで、未ログイン・掲載終了・バックエンド障害は
/// すべて「何も記録しない／何も返さない」に縮退する。エラーは呼び出し側へ返さない。
pub struct RecentlyViewedService {
    views: Arc<dyn ViewRecordRepository>,
    listings: Arc<dyn ListingRepository>,
    session: Arc<dyn SessionProvider>,
    images: Arc<dyn ImageUrlResolver>,
    clock: Arc<dyn Clock>,
    retention_cap: usize,
    default_limit: usize,
}

impl RecentlyViewedService {
    pub fn new(
        views: Arc<dyn ViewRecordRepository>,
        listings: Arc<dyn ListingRepository>,
        session: Arc<dyn SessionProvider>,
        images: Arc<dyn ImageUrlResolver>,
        clock: Arc<dyn Clock>,
        config: &RecentlyViewedConfig,
    ) -> Self {
        Self {
            views,
            listings,
            session,
            images,
            clock,
            retention_cap: config.retention_cap,
            default_limit: config.default_list_limit,
        }
    }

    pub fn retention_cap(&self) -> usize {
        self.retention_cap
    }

    async fn authenticated_user(&self) -> Option<UserId> {
        match self.session.current_user().await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                debug!("No authenticated session; skipping recently viewed operation");
                None
            }
            Err(err) => {
                warn!(error = %err, "Failed to look up current session");
                None
            }
        }
    }

    /// 物件の閲覧を記録し、閲覧履歴の ID を返す
    pub async fn record_view(&self, listing_id: &ListingId) -> Option<ViewRecordId> {
        let user = self.authenticated_user().await?;

        match self.listings.get_listing(listing_id).await {
            Ok(Some(listing)) if listing.is_available() => {}
            Ok(Some(_)) => {
                debug!(listing_id = %listing_id, "Listing is not available; view not recorded");
                return None;
            }
            Ok(None) => {
                debug!(listing_id = %listing_id, "Listing not found; view not recorded");
                return None;
            }
            Err(err) => {
                warn!(listing_id = %listing_id, error = %err, "Failed to load listing");
                return None;
            }
        }

        let recorded = match self
            .views
            .upsert_view(&user, listing_id, self.clock.now())
            .await
        {
            Ok(recorded) => recorded,
            Err(err) => {
                warn!(listing_id = %listing_id, error = %err, "Failed to record view");
                return None;
            }
        };

        let record_id = recorded.record.id().clone();

        // 上限超過は新規作成時にだけ起こり得る
        if recorded.inserted {
            match self.views.trim_to_cap(&user, self.retention_cap).await {
                Ok(0) => {}
                Ok(evicted) => {
                    debug!(user_id = %user, evicted, "Evicted oldest recently viewed entries");
                    // 端末の時計が遅れていると、記録したばかりの行が最古として消される
                    if !self.is_retained(&user, &record_id).await {
                        debug!(
                            listing_id = %listing_id,
                            "New view is older than the retained window; treating as not recorded"
                        );
                        return None;
                    }
                }
                Err(err) => {
                    warn!(user_id = %user, error = %err, "Failed to trim recently viewed entries");
                }
            }
        }

        Some(record_id)
    }

    async fn is_retained(&self, user: &UserId, record_id: &ViewRecordId) -> bool {
        match self.views.list_recent_views(user, self.retention_cap).await {
            Ok(records) => records.iter().any(|record| record.id() == record_id),
            Err(err) => {
                // 書き込み自体は成功しているので記録済みとして扱う
                warn!(user_id = %user, error = %err, "Failed to confirm retained view");
                true
            }
        }
    }

    /// 最近閲覧した物件を新しい順に返す（掲載中のもののみ）
    pub async fn list_recent(&self, limit: Option<usize>) -> Vec<RecentlyViewedListing> {
        let limit = limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Vec::new();
        }
        let Some(user) = self.authenticated_user().await else {
            return Vec::new();
        };

        // 掲載終了分で件数が欠けないよう、保持上限まで読んでから絞り込む
        let fetch_limit = limit.max(self.retention_cap);
        let records = match self.views.list_recent_views(&user, fetch_limit).await {
            Ok(records) => records,
            Err(err) => {
                warn!(user_id = %user, error = %err, "Failed to list recently viewed entries");
                return Vec::new();
            }
        };
        if records.is_empty() {
            return Vec::new();
        }

        let ids: Vec<ListingId> = records.iter().map(|r| r.listing_id().clone()).collect();
        let listings = match self.listings.get_listings_by_ids(&ids).await {
            Ok(listings) => listings,
            Err(err) => {
                warn!(user_id = %user, error = %err, "Failed to load recently viewed listings");
                return Vec::new();
            }
        };

        let mut available: HashMap<ListingId, Listing> = listings
            .into_iter()
            .filter(Listing::is_available)
            .map(|listing| (listing.id.clone(), listing))
            .collect();

        let visible: Vec<(ViewRecord, Listing)> = records
            .into_iter()
            .filter_map(|record| {
                available
                    .remove(record.listing_id())
                    .map(|listing| (record, listing))
            })
            .take(limit)
            .collect();

        join_all(visible.into_iter().map(|(record, listing)| async move {
            let image_urls = self.resolve_images(&listing.image_paths).await;
            RecentlyViewedListing {
                record_id: record.id().clone(),
                viewed_at: record.viewed_at(),
                listing,
                image_urls,
            }
        }))
        .await
    }

    async fn resolve_images(&self, paths: &[String]) -> Vec<String> {
        let resolved = join_all(paths.iter().map(|path| self.images.resolve(path))).await;

        paths
            .iter()
            .zip(resolved)
            .filter_map(|(path, result)| match result {
                Ok(url) => Some(url),
                Err(err) => {
                    debug!(path = %path, error = %err, "Dropping unresolved image");
                    None
                }
            })
            .collect()
    }

    /// ユーザーの閲覧履歴をすべて削除する
    pub async fn clear_all(&self) -> ClearResult {
        let Some(user) = self.authenticated_user().await else {
            return ClearResult::failed();
        };

        match self.views.delete_all_views(&user).await {
            Ok(deleted) => {
                debug!(user_id = %user, deleted, "Cleared recently viewed entries");
                ClearResult::cleared(deleted)
            }
            Err(err) => {
                warn!(user_id = %user, error = %err, "Failed to clear recently viewed entries");
                ClearResult::failed()
            }
        }
    }

    /// 1 件の閲覧履歴を削除する。削除できたら true
    pub async fn remove(&self, listing_id: &ListingId) -> bool {
        let Some(user) = self.authenticated_user().await else {
            return false;
        };

        match self.views.delete_view(&user, listing_id).await {
            Ok(removed) => removed,
            Err(err) => {
                warn!(listing_id = %listing_id, error = %err, "Failed to remove recently viewed entry");
                false
            }
        }
    }
}
