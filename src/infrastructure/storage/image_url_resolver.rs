use crate::application::ports::ImageUrlResolver;
use crate::infrastructure::cache::MemoryCacheService;
use crate::shared::config::StorageConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// ストレージの公開バケット URL を組み立てるリゾルバー
///
/// 解決結果は件数上限付きの TTL キャッシュに載せる。
pub struct StorageUrlResolver {
    base_url: String,
    bucket: String,
    cache: MemoryCacheService<String>,
}

impl StorageUrlResolver {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        cache_size: usize,
        ttl: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            cache: MemoryCacheService::new(cache_size, ttl),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(
            config.public_base_url.clone(),
            config.image_bucket.clone(),
            config.image_url_cache_size,
            Duration::from_secs(config.image_url_ttl_secs),
        )
    }

    fn normalize(path: &str) -> Result<String, AppError> {
        let trimmed = path.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(AppError::InvalidInput("Image path is empty".to_string()));
        }
        if trimmed
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(AppError::InvalidInput(format!(
                "Invalid image path: {path}"
            )));
        }
        Ok(trimmed.to_string())
    }

    fn build_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }
}

#[async_trait]
impl ImageUrlResolver for StorageUrlResolver {
    async fn resolve(&self, path: &str) -> Result<String, AppError> {
        let path = Self::normalize(path)?;
        if let Some(url) = self.cache.get(&path).await {
            return Ok(url);
        }

        let url = self.build_url(&path);
        debug!(path = %path, "Resolved image url");
        self.cache.set(path, url.clone()).await;
        Ok(url)
    }
}
