pub mod live_query;
pub mod ports;
pub mod services;

pub use services::RecentlyViewedService;
