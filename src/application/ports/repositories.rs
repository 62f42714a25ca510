use crate::domain::entities::{Listing, RecordedView, ViewRecord};
use crate::domain::value_objects::{ListingId, UserId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait ViewRecordRepository: Send + Sync {
    /// (user, listing) をキーに閲覧履歴を作成、または `viewed_at` を更新する。
    async fn upsert_view(
        &self,
        user_id: &UserId,
        listing_id: &ListingId,
        viewed_at: DateTime<Utc>,
    ) -> Result<RecordedView, AppError>;
    /// 新しい順に `cap` 件を残して残りを削除し、削除件数を返す。
    async fn trim_to_cap(&self, user_id: &UserId, cap: usize) -> Result<u64, AppError>;
    async fn list_recent_views(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ViewRecord>, AppError>;
    async fn delete_view(&self, user_id: &UserId, listing_id: &ListingId)
    -> Result<bool, AppError>;
    async fn delete_all_views(&self, user_id: &UserId) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn get_listing(&self, id: &ListingId) -> Result<Option<Listing>, AppError>;
    /// 存在する物件だけを返す（順序は保証しない）
    async fn get_listings_by_ids(&self, ids: &[ListingId]) -> Result<Vec<Listing>, AppError>;
    async fn save_listing(&self, listing: &Listing) -> Result<(), AppError>;
}
