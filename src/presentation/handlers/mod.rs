pub mod recently_viewed_handler;

pub use recently_viewed_handler::RecentlyViewedHandler;
