use super::Validate;
use crate::domain::entities::{ClearResult, RecentlyViewedListing};
use serde::{Deserialize, Serialize};

const MAX_LIST_LIMIT: usize = 100;

fn validate_listing_id(listing_id: &str) -> Result<(), String> {
    if listing_id.trim().is_empty() {
        return Err("物件IDが必要です".to_string());
    }
    Ok(())
}

// リクエストDTO
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewRequest {
    pub listing_id: String,
}

impl Validate for RecordViewRequest {
    fn validate(&self) -> Result<(), String> {
        validate_listing_id(&self.listing_id)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecentlyViewedRequest {
    pub limit: Option<usize>,
}

impl Validate for ListRecentlyViewedRequest {
    fn validate(&self) -> Result<(), String> {
        match self.limit {
            Some(0) => Err("件数は1以上を指定してください".to_string()),
            Some(limit) if limit > MAX_LIST_LIMIT => {
                Err(format!("件数が多すぎます（最大{MAX_LIST_LIMIT}件）"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveViewRequest {
    pub listing_id: String,
}

impl Validate for RemoveViewRequest {
    fn validate(&self) -> Result<(), String> {
        validate_listing_id(&self.listing_id)
    }
}

// レスポンスDTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewResponse {
    /// 記録されなかった場合は null
    pub record_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyViewedItemResponse {
    pub record_id: String,
    pub viewed_at: i64,
    pub listing_id: String,
    pub title: String,
    pub city: String,
    pub monthly_rent: i64,
    pub bedrooms: u32,
    pub image_urls: Vec<String>,
}

impl From<RecentlyViewedListing> for RecentlyViewedItemResponse {
    fn from(item: RecentlyViewedListing) -> Self {
        Self {
            record_id: item.record_id.to_string(),
            viewed_at: item.viewed_at.timestamp_millis(),
            listing_id: item.listing.id.to_string(),
            title: item.listing.title,
            city: item.listing.city,
            monthly_rent: item.listing.monthly_rent,
            bedrooms: item.listing.bedrooms,
            image_urls: item.image_urls,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRecentlyViewedResponse {
    pub success: bool,
    pub deleted: u64,
}

impl From<ClearResult> for ClearRecentlyViewedResponse {
    fn from(result: ClearResult) -> Self {
        Self {
            success: result.success,
            deleted: result.deleted,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveViewResponse {
    pub removed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_limit_bounds() {
        assert!(ListRecentlyViewedRequest::default().validate().is_ok());
        assert!(ListRecentlyViewedRequest { limit: Some(0) }.validate().is_err());
        assert!(ListRecentlyViewedRequest { limit: Some(101) }.validate().is_err());
        assert!(ListRecentlyViewedRequest { limit: Some(20) }.validate().is_ok());
    }

    #[test]
    fn requests_use_camel_case() {
        let request: RecordViewRequest =
            serde_json::from_str(r#"{"listingId":"abc"}"#).unwrap();
        assert_eq!(request.listing_id, "abc");
        assert!(RemoveViewRequest { listing_id: "  ".into() }.validate().is_err());
    }
}
