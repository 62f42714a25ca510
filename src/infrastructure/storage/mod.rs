pub mod image_url_resolver;
pub mod local_store;

pub use image_url_resolver::StorageUrlResolver;
pub use local_store::{FileKeyValueStore, MemoryKeyValueStore};
