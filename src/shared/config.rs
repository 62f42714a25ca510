use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub recently_viewed: RecentlyViewedConfig,
    pub query_cache: QueryCacheConfig,
    pub viewport: ViewportConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyViewedConfig {
    /// ユーザーごとに保持する閲覧履歴の上限
    pub retention_cap: usize,
    pub default_list_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCacheConfig {
    pub stale_after_secs: u64,
    pub persisted_ttl_secs: u64,
    pub debounce_ms: u64,
    pub key_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub initial_count: usize,
    pub increment: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    pub public_base_url: String,
    pub image_bucket: String,
    pub image_url_cache_size: usize,
    pub image_url_ttl_secs: u64,
    pub local_store_quota_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:data/rentora.db?mode=rwc".to_string(),
                max_connections: 5,
            },
            recently_viewed: RecentlyViewedConfig {
                retention_cap: 20,
                default_list_limit: 10,
            },
            query_cache: QueryCacheConfig {
                stale_after_secs: 300, // 5 minutes
                persisted_ttl_secs: 300,
                debounce_ms: 300,
                key_prefix: "query-cache".to_string(),
            },
            viewport: ViewportConfig {
                initial_count: 12,
                increment: 8,
            },
            storage: StorageConfig {
                data_dir: default_data_dir(),
                public_base_url: "http://localhost:54321".to_string(),
                image_bucket: "property-images".to_string(),
                image_url_cache_size: 512,
                image_url_ttl_secs: 3600, // 1 hour
                local_store_quota_bytes: 5 * 1024 * 1024, // 5MB
            },
        }
    }
}

impl QueryCacheConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn persisted_ttl(&self) -> Duration {
        Duration::from_secs(self.persisted_ttl_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("RENTORA_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v.trim().to_string();
            }
        }
        if let Some(value) = env_parsed::<u32>("RENTORA_DATABASE_MAX_CONNECTIONS") {
            cfg.database.max_connections = value.max(1);
        }

        // 閲覧履歴
        if let Some(value) = env_parsed::<usize>("RENTORA_RECENTLY_VIEWED_CAP") {
            cfg.recently_viewed.retention_cap = value;
        }
        if let Some(value) = env_parsed::<usize>("RENTORA_RECENTLY_VIEWED_LIMIT") {
            cfg.recently_viewed.default_list_limit = value;
        }

        // クエリキャッシュ
        if let Some(value) = env_parsed::<u64>("RENTORA_QUERY_STALE_SECS") {
            cfg.query_cache.stale_after_secs = value;
        }
        if let Some(value) = env_parsed::<u64>("RENTORA_QUERY_CACHE_TTL_SECS") {
            cfg.query_cache.persisted_ttl_secs = value;
        }
        if let Some(value) = env_parsed::<u64>("RENTORA_QUERY_DEBOUNCE_MS") {
            cfg.query_cache.debounce_ms = value;
        }

        if let Some(value) = env_parsed::<usize>("RENTORA_VIEWPORT_INITIAL") {
            cfg.viewport.initial_count = value;
        }
        if let Some(value) = env_parsed::<usize>("RENTORA_VIEWPORT_INCREMENT") {
            cfg.viewport.increment = value;
        }

        if let Ok(v) = std::env::var("RENTORA_DATA_DIR") {
            if !v.trim().is_empty() {
                cfg.storage.data_dir = v.trim().to_string();
            }
        }
        if let Ok(v) = std::env::var("RENTORA_PUBLIC_BASE_URL") {
            cfg.storage.public_base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Ok(v) = std::env::var("RENTORA_IMAGE_BUCKET") {
            cfg.storage.image_bucket = v.trim().to_string();
        }
        if let Some(value) = env_parsed::<usize>("RENTORA_LOCAL_STORE_QUOTA_BYTES") {
            cfg.storage.local_store_quota_bytes = value;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.recently_viewed.retention_cap == 0 {
            return Err("Recently viewed retention_cap must be greater than 0".to_string());
        }
        if self.recently_viewed.default_list_limit == 0 {
            return Err("Recently viewed default_list_limit must be greater than 0".to_string());
        }
        if self.query_cache.stale_after_secs == 0 {
            return Err("Query cache stale_after_secs must be greater than 0".to_string());
        }
        if self.query_cache.persisted_ttl_secs == 0 {
            return Err("Query cache persisted_ttl_secs must be greater than 0".to_string());
        }
        if self.query_cache.key_prefix.trim().is_empty() {
            return Err("Query cache key_prefix must not be empty".to_string());
        }
        if self.viewport.initial_count == 0 || self.viewport.increment == 0 {
            return Err("Viewport initial_count and increment must be greater than 0".to_string());
        }
        if self.storage.public_base_url.trim().is_empty() {
            return Err("Storage public_base_url must not be empty".to_string());
        }
        if self.storage.image_bucket.trim().is_empty() {
            return Err("Storage image_bucket must not be empty".to_string());
        }
        if self.storage.image_url_cache_size == 0 {
            return Err("Storage image_url_cache_size must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("rentora").display().to_string())
        .unwrap_or_else(|| "./data".to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
}
