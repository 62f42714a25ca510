pub mod recently_viewed_service;

pub use recently_viewed_service::RecentlyViewedService;
