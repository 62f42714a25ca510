pub mod listing;
pub mod recently_viewed;
pub mod view_record;

pub use listing::{Listing, ListingStatus};
pub use recently_viewed::{ClearResult, RecentlyViewedListing};
pub use view_record::{RecordedView, ViewRecord};
