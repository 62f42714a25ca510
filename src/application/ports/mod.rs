pub mod clock;
pub mod image_resolver;
pub mod key_value_store;
pub mod query_source;
pub mod repositories;
pub mod session;

pub use clock::Clock;
pub use image_resolver::ImageUrlResolver;
pub use key_value_store::KeyValueStore;
pub use query_source::{QuerySource, QueryUpdate};
pub use repositories::{ListingRepository, ViewRecordRepository};
pub use session::SessionProvider;
