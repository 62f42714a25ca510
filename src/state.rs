use crate::application::live_query::{
    DebouncedQuery, IncrementalLoader, LiveQuery, LiveQueryOptions, PersistedQueryCache,
};
use crate::application::ports::{
    Clock, ImageUrlResolver, KeyValueStore, ListingRepository, QuerySource, SessionProvider,
    ViewRecordRepository,
};
use crate::application::services::RecentlyViewedService;
use crate::infrastructure::auth::InMemorySessionStore;
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::database::{ConnectionPool, Repository, SqliteRepository};
use crate::infrastructure::storage::{FileKeyValueStore, MemoryKeyValueStore, StorageUrlResolver};
use crate::presentation::handlers::RecentlyViewedHandler;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const LOCAL_STORE_FILE: &str = "query-cache.json";

/// アプリケーション全体の状態を管理する構造体
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: ConnectionPool,
    pub clock: Arc<dyn Clock>,
    pub session: Arc<InMemorySessionStore>,
    pub listing_repository: Arc<dyn ListingRepository>,
    pub recently_viewed_service: Arc<RecentlyViewedService>,
    pub recently_viewed_handler: Arc<RecentlyViewedHandler>,
    pub query_cache: Arc<PersistedQueryCache>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate().map_err(AppError::ConfigurationError)?;

        // Create data directory if it doesn't exist
        std::fs::create_dir_all(&config.storage.data_dir)
            .with_context(|| format!("Failed to create {}", config.storage.data_dir))?;
        if let Some(parent) = sqlite_parent_dir(&config.database.url) {
            std::fs::create_dir_all(&parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let pool = ConnectionPool::new(&config.database.url, config.database.max_connections)
            .await
            .context("Failed to connect to database")?;
        let store_path = Path::new(&config.storage.data_dir).join(LOCAL_STORE_FILE);
        let store = FileKeyValueStore::open(store_path, config.storage.local_store_quota_bytes)
            .context("Failed to open local store")?;

        Self::assemble(config, pool, Arc::new(store), Arc::new(SystemClock)).await
    }

    /// インメモリ DB と揮発ストアで組み立てる（テスト・プレビュー用）
    pub async fn in_memory(config: AppConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let pool = ConnectionPool::from_memory()
            .await
            .context("Failed to open in-memory database")?;
        let store = MemoryKeyValueStore::with_quota(config.storage.local_store_quota_bytes);

        Self::assemble(config, pool, Arc::new(store), clock).await
    }

    async fn assemble(
        config: AppConfig,
        pool: ConnectionPool,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let repository = Arc::new(SqliteRepository::new(pool.clone()));
        repository
            .initialize()
            .await
            .context("Failed to run migrations")?;

        let session = Arc::new(InMemorySessionStore::new());
        let images: Arc<dyn ImageUrlResolver> =
            Arc::new(StorageUrlResolver::from_config(&config.storage));

        let recently_viewed_service = Arc::new(RecentlyViewedService::new(
            Arc::clone(&repository) as Arc<dyn ViewRecordRepository>,
            Arc::clone(&repository) as Arc<dyn ListingRepository>,
            Arc::clone(&session) as Arc<dyn SessionProvider>,
            images,
            Arc::clone(&clock),
            &config.recently_viewed,
        ));
        let recently_viewed_handler =
            Arc::new(RecentlyViewedHandler::new(Arc::clone(&recently_viewed_service)));

        let query_cache = Arc::new(PersistedQueryCache::new(
            store,
            Arc::clone(&clock),
            config.query_cache.persisted_ttl(),
            config.query_cache.key_prefix.clone(),
        ));
        let purged = query_cache.purge_expired();
        info!(purged, "Application state ready");

        Ok(Self {
            config: Arc::new(config),
            db_pool: pool,
            clock,
            session,
            listing_repository: repository,
            recently_viewed_service,
            recently_viewed_handler,
            query_cache,
        })
    }

    /// 永続キャッシュ付きのライブクエリを購読する
    pub fn live_query<A, T>(
        &self,
        source: &dyn QuerySource<A, T>,
        query_name: &str,
        args: &A,
    ) -> Result<LiveQuery<T>, AppError>
    where
        A: Serialize,
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let key = self.query_cache.key_for(query_name, args)?;
        let options = self.query_cache.attach(key, self.live_query_options());
        Ok(LiveQuery::new(source.subscribe(args), options))
    }

    /// 引数の変更をデバウンスするライブクエリを購読する
    pub fn debounced_query<A, T>(
        &self,
        source: Arc<dyn QuerySource<A, T>>,
        initial_args: A,
    ) -> DebouncedQuery<A, T>
    where
        A: Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        DebouncedQuery::new(
            source,
            initial_args,
            self.config.query_cache.debounce(),
            self.live_query_options(),
        )
    }

    pub fn incremental_loader<T>(&self) -> IncrementalLoader<T> {
        IncrementalLoader::from_config(&self.config.viewport)
    }

    fn live_query_options<T>(&self) -> LiveQueryOptions<T> {
        LiveQueryOptions::new(self.config.query_cache.stale_after())
    }

    pub async fn shutdown(&self) {
        self.db_pool.close().await;
    }
}

/// `sqlite:` URL がファイルを指す場合、その親ディレクトリ
fn sqlite_parent_dir(url: &str) -> Option<PathBuf> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
