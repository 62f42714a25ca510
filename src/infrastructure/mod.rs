pub mod auth;
pub mod cache;
pub mod clock;
pub mod database;
pub mod live_query;
pub mod storage;
