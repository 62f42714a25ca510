pub mod listing_id;
pub mod query_key;
pub mod user_id;
pub mod view_record_id;

pub use listing_id::ListingId;
pub use query_key::QueryKey;
pub use user_id::UserId;
pub use view_record_id::ViewRecordId;
