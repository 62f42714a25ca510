pub mod watch_source;

pub use watch_source::WatchQuerySource;
