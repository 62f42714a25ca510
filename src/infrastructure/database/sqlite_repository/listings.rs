use super::queries::{SELECT_LISTING_BY_ID, SELECT_LISTING_COLUMNS, UPSERT_LISTING};
use super::{SqliteRepository, millis_to_datetime};
use crate::application::ports::repositories::ListingRepository;
use crate::domain::entities::{Listing, ListingStatus};
use crate::domain::value_objects::ListingId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use tracing::warn;

#[derive(Debug, FromRow)]
struct ListingRow {
    id: String,
    title: String,
    city: String,
    monthly_rent: i64,
    bedrooms: i64,
    status: String,
    image_paths: String,
    updated_at: i64,
}

impl ListingRow {
    fn into_domain(self) -> Result<Listing, AppError> {
        let id = ListingId::new(self.id)
            .map_err(|err| AppError::ValidationError(format!("Invalid listing id: {err}")))?;
        let status = self
            .status
            .parse::<ListingStatus>()
            .map_err(AppError::DeserializationError)?;
        let image_paths: Vec<String> = serde_json::from_str(&self.image_paths)?;
        let bedrooms = u32::try_from(self.bedrooms).map_err(|_| {
            AppError::DeserializationError(format!("Invalid bedroom count: {}", self.bedrooms))
        })?;

        Ok(Listing {
            id,
            title: self.title,
            city: self.city,
            monthly_rent: self.monthly_rent,
            bedrooms,
            status,
            image_paths,
            updated_at: millis_to_datetime(self.updated_at)?,
        })
    }
}

#[async_trait]
impl ListingRepository for SqliteRepository {
    async fn get_listing(&self, id: &ListingId) -> Result<Option<Listing>, AppError> {
        let row = sqlx::query_as::<_, ListingRow>(SELECT_LISTING_BY_ID)
            .bind(id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        row.map(ListingRow::into_domain).transpose()
    }

    async fn get_listings_by_ids(&self, ids: &[ListingId]) -> Result<Vec<Listing>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_LISTING_COLUMNS);
        builder.push(" WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let rows = builder
            .build_query_as::<ListingRow>()
            .fetch_all(self.pool.get_pool())
            .await?;

        // 壊れた行はその行だけ読み飛ばす
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                match row.into_domain() {
                    Ok(listing) => Some(listing),
                    Err(err) => {
                        warn!(listing_id = %id, error = %err, "Skipping undecodable listing row");
                        None
                    }
                }
            })
            .collect())
    }

    async fn save_listing(&self, listing: &Listing) -> Result<(), AppError> {
        let image_paths = serde_json::to_string(&listing.image_paths)?;

        sqlx::query(UPSERT_LISTING)
            .bind(listing.id.as_str())
            .bind(&listing.title)
            .bind(&listing.city)
            .bind(listing.monthly_rent)
            .bind(i64::from(listing.bedrooms))
            .bind(listing.status.as_str())
            .bind(image_paths)
            .bind(listing.updated_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }
}
