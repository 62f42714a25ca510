use super::listing::Listing;
use crate::domain::value_objects::ViewRecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 閲覧履歴フィードの 1 件。物件情報は読み出し時点のもの。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyViewedListing {
    pub record_id: ViewRecordId,
    pub viewed_at: DateTime<Utc>,
    pub listing: Listing,
    /// 解決できた画像 URL のみ
    pub image_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearResult {
    pub success: bool,
    pub deleted: u64,
}

impl ClearResult {
    pub fn failed() -> Self {
        Self {
            success: false,
            deleted: 0,
        }
    }

    pub fn cleared(deleted: u64) -> Self {
        Self {
            success: true,
            deleted,
        }
    }
}
