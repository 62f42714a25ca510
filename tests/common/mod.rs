#![allow(dead_code)]

use rentora::AppState;
use rentora::domain::entities::{Listing, ListingStatus};
use rentora::domain::value_objects::{ListingId, UserId};
use rentora::infrastructure::clock::ManualClock;
use rentora::shared::config::AppConfig;
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let clock = Arc::new(ManualClock::default());
        let state = AppState::in_memory(config, clock.clone())
            .await
            .expect("in-memory state");
        Self { state, clock }
    }

    pub async fn sign_in(&self, user: &str) -> UserId {
        let user_id = UserId::new(user.to_string()).expect("valid user id");
        self.state.session.sign_in(user_id.clone()).await;
        user_id
    }

    pub async fn seed_listing(&self, title: &str, status: ListingStatus) -> ListingId {
        let listing = Listing::new(title.to_string(), "Osaka".to_string(), 85_000, 1)
            .with_status(status)
            .with_images(vec![format!("{title}/cover.jpg")]);
        self.state
            .listing_repository
            .save_listing(&listing)
            .await
            .expect("save listing");
        listing.id
    }

    pub async fn seed_available(&self, count: usize) -> Vec<ListingId> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            ids.push(self.seed_listing(&format!("listing-{i}"), ListingStatus::Available).await);
        }
        ids
    }

    /// 1 秒進めてから閲覧を記録する
    pub async fn view(&self, listing_id: &ListingId) -> bool {
        self.clock.advance(Duration::from_secs(1));
        self.state
            .recently_viewed_service
            .record_view(listing_id)
            .await
            .is_some()
    }

    pub async fn recent_ids(&self) -> Vec<ListingId> {
        self.state
            .recently_viewed_service
            .list_recent(Some(100))
            .await
            .into_iter()
            .map(|item| item.listing.id)
            .collect()
    }
}
