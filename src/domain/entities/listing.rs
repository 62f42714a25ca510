use crate::domain::value_objects::ListingId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Available,
    Pending,
    Leased,
    Unlisted,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::Pending => "pending",
            ListingStatus::Leased => "leased",
            ListingStatus::Unlisted => "unlisted",
        }
    }
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "available" => Ok(ListingStatus::Available),
            "pending" => Ok(ListingStatus::Pending),
            "leased" => Ok(ListingStatus::Leased),
            "unlisted" => Ok(ListingStatus::Unlisted),
            other => Err(format!("Unknown listing status: {other}")),
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 閲覧履歴の表示に必要な物件情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub city: String,
    /// 月額賃料（最小通貨単位）
    pub monthly_rent: i64,
    pub bedrooms: u32,
    pub status: ListingStatus,
    /// ストレージ上の画像パス。表示時に URL へ解決する。
    pub image_paths: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn new(title: String, city: String, monthly_rent: i64, bedrooms: u32) -> Self {
        Self {
            id: ListingId::generate(),
            title,
            city,
            monthly_rent,
            bedrooms,
            status: ListingStatus::Available,
            image_paths: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_images(mut self, image_paths: Vec<String>) -> Self {
        self.image_paths = image_paths;
        self
    }

    /// 掲載中（閲覧履歴に出してよい状態）か
    pub fn is_available(&self) -> bool {
        self.status == ListingStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_available_status_counts_as_listed() {
        let listing = Listing::new("Loft".into(), "Osaka".into(), 98_000, 1);
        assert!(listing.is_available());
        assert!(!listing.clone().with_status(ListingStatus::Leased).is_available());
        assert!(!listing.with_status(ListingStatus::Unlisted).is_available());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ListingStatus::Available,
            ListingStatus::Pending,
            ListingStatus::Leased,
            ListingStatus::Unlisted,
        ] {
            assert_eq!(status.as_str().parse::<ListingStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ListingStatus>().is_err());
    }
}
