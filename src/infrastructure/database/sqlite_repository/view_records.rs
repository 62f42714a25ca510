use super::queries::{
    DELETE_ALL_VIEWS, DELETE_VIEW, SELECT_RECENT_VIEWS, TRIM_VIEWS_TO_CAP, UPSERT_VIEW,
};
use super::{SqliteRepository, millis_to_datetime};
use crate::application::ports::repositories::ViewRecordRepository;
use crate::domain::entities::{RecordedView, ViewRecord};
use crate::domain::value_objects::{ListingId, UserId, ViewRecordId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
struct ViewRecordRow {
    id: String,
    user_id: String,
    listing_id: String,
    viewed_at: i64,
    touch_seq: i64,
}

impl ViewRecordRow {
    fn into_domain(self) -> Result<ViewRecord, AppError> {
        let id = ViewRecordId::new(self.id)
            .map_err(|err| AppError::ValidationError(format!("Invalid view record id: {err}")))?;
        let user_id = UserId::new(self.user_id)
            .map_err(|err| AppError::ValidationError(format!("Invalid user id: {err}")))?;
        let listing_id = ListingId::new(self.listing_id)
            .map_err(|err| AppError::ValidationError(format!("Invalid listing id: {err}")))?;
        let viewed_at = millis_to_datetime(self.viewed_at)?;

        Ok(ViewRecord::from_parts(
            id,
            user_id,
            listing_id,
            viewed_at,
            self.touch_seq,
        ))
    }
}

fn limit_param(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl ViewRecordRepository for SqliteRepository {
    async fn upsert_view(
        &self,
        user_id: &UserId,
        listing_id: &ListingId,
        viewed_at: DateTime<Utc>,
    ) -> Result<RecordedView, AppError> {
        let candidate = ViewRecordId::random();

        let row = sqlx::query_as::<_, ViewRecordRow>(UPSERT_VIEW)
            .bind(candidate.as_str())
            .bind(user_id.as_str())
            .bind(listing_id.as_str())
            .bind(viewed_at.timestamp_millis())
            .fetch_one(self.pool.get_pool())
            .await?;

        // 競合時は既存行の id が返る
        let inserted = row.id == candidate.as_str();
        Ok(RecordedView {
            record: row.into_domain()?,
            inserted,
        })
    }

    async fn trim_to_cap(&self, user_id: &UserId, cap: usize) -> Result<u64, AppError> {
        let result = sqlx::query(TRIM_VIEWS_TO_CAP)
            .bind(user_id.as_str())
            .bind(limit_param(cap))
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_recent_views(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ViewRecord>, AppError> {
        let rows = sqlx::query_as::<_, ViewRecordRow>(SELECT_RECENT_VIEWS)
            .bind(user_id.as_str())
            .bind(limit_param(limit))
            .fetch_all(self.pool.get_pool())
            .await?;

        rows.into_iter().map(ViewRecordRow::into_domain).collect()
    }

    async fn delete_view(
        &self,
        user_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(DELETE_VIEW)
            .bind(user_id.as_str())
            .bind(listing_id.as_str())
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_views(&self, user_id: &UserId) -> Result<u64, AppError> {
        let result = sqlx::query(DELETE_ALL_VIEWS)
            .bind(user_id.as_str())
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::super::setup_repository;
    use super::*;
    use chrono::{Duration, TimeZone};

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn listing(id: &str) -> ListingId {
        ListingId::new(id.to_string()).unwrap()
    }

    fn base_time() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_704_067_200_000).unwrap()
    }

    #[tokio::test]
    async fn upsert_creates_then_touches_single_row() {
        let repo = setup_repository().await;
        let alice = user("alice");
        let l1 = listing("l1");

        let first = repo.upsert_view(&alice, &l1, base_time()).await.unwrap();
        assert!(first.inserted);

        let later = base_time() + Duration::seconds(30);
        let second = repo.upsert_view(&alice, &l1, later).await.unwrap();
        assert!(!second.inserted);
        assert_eq!(second.record.id(), first.record.id());
        assert_eq!(second.record.viewed_at(), later);
        assert!(second.record.touch_seq() > first.record.touch_seq());

        assert_eq!(repo.list_recent_views(&alice, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn same_timestamp_orders_by_touch_sequence() {
        let repo = setup_repository().await;
        let alice = user("alice");
        let at = base_time();

        repo.upsert_view(&alice, &listing("l1"), at).await.unwrap();
        repo.upsert_view(&alice, &listing("l2"), at).await.unwrap();
        repo.upsert_view(&alice, &listing("l1"), at).await.unwrap();

        let views = repo.list_recent_views(&alice, 10).await.unwrap();
        let ids: Vec<_> = views.iter().map(|v| v.listing_id().as_str()).collect();
        assert_eq!(ids, vec!["l1", "l2"]);
    }

    #[tokio::test]
    async fn trim_keeps_newest_per_user() {
        let repo = setup_repository().await;
        let alice = user("alice");
        let bob = user("bob");

        for i in 0..5 {
            let at = base_time() + Duration::seconds(i);
            repo.upsert_view(&alice, &listing(&format!("l{i}")), at)
                .await
                .unwrap();
        }
        repo.upsert_view(&bob, &listing("l0"), base_time())
            .await
            .unwrap();

        assert_eq!(repo.trim_to_cap(&alice, 3).await.unwrap(), 2);
        // 二度目は何も消さない
        assert_eq!(repo.trim_to_cap(&alice, 3).await.unwrap(), 0);

        let views = repo.list_recent_views(&alice, 10).await.unwrap();
        let ids: Vec<_> = views.iter().map(|v| v.listing_id().as_str()).collect();
        assert_eq!(ids, vec!["l4", "l3", "l2"]);
        assert_eq!(repo.list_recent_views(&bob, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_single_and_all() {
        let repo = setup_repository().await;
        let alice = user("alice");
        repo.upsert_view(&alice, &listing("l1"), base_time())
            .await
            .unwrap();
        repo.upsert_view(&alice, &listing("l2"), base_time())
            .await
            .unwrap();

        assert!(repo.delete_view(&alice, &listing("l1")).await.unwrap());
        assert!(!repo.delete_view(&alice, &listing("l1")).await.unwrap());

        assert_eq!(repo.delete_all_views(&alice).await.unwrap(), 1);
        assert_eq!(repo.delete_all_views(&alice).await.unwrap(), 0);
        assert!(repo.list_recent_views(&alice, 10).await.unwrap().is_empty());
    }
}
