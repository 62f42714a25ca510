use crate::{
    application::services::RecentlyViewedService,
    domain::value_objects::ListingId,
    presentation::dto::{
        Validate,
        recently_viewed_dto::{
            ClearRecentlyViewedResponse, ListRecentlyViewedRequest, RecentlyViewedItemResponse,
            RecordViewRequest, RecordViewResponse, RemoveViewRequest, RemoveViewResponse,
        },
    },
    shared::error::AppError,
};
use std::sync::Arc;

pub struct RecentlyViewedHandler {
    service: Arc<RecentlyViewedService>,
}

impl RecentlyViewedHandler {
    pub fn new(service: Arc<RecentlyViewedService>) -> Self {
        Self { service }
    }

    pub async fn record_view(
        &self,
        request: RecordViewRequest,
    ) -> Result<RecordViewResponse, AppError> {
        request.validate().map_err(AppError::InvalidInput)?;
        let listing_id = parse_listing_id(request.listing_id)?;

        let record_id = self.service.record_view(&listing_id).await;
        Ok(RecordViewResponse {
            record_id: record_id.map(|id| id.to_string()),
        })
    }

    pub async fn list_recent(
        &self,
        request: ListRecentlyViewedRequest,
    ) -> Result<Vec<RecentlyViewedItemResponse>, AppError> {
        request.validate().map_err(AppError::InvalidInput)?;

        let items = self.service.list_recent(request.limit).await;
        Ok(items.into_iter().map(Into::into).collect())
    }

    pub async fn clear_all(&self) -> Result<ClearRecentlyViewedResponse, AppError> {
        Ok(self.service.clear_all().await.into())
    }

    pub async fn remove(&self, request: RemoveViewRequest) -> Result<RemoveViewResponse, AppError> {
        request.validate().map_err(AppError::InvalidInput)?;
        let listing_id = parse_listing_id(request.listing_id)?;

        Ok(RemoveViewResponse {
            removed: self.service.remove(&listing_id).await,
        })
    }
}

fn parse_listing_id(value: String) -> Result<ListingId, AppError> {
    ListingId::new(value).map_err(AppError::InvalidInput)
}
