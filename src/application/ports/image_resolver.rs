use crate::shared::error::AppError;
use async_trait::async_trait;

/// ストレージ上のオブジェクトパスを取得可能な URL へ解決するポート
#[async_trait]
pub trait ImageUrlResolver: Send + Sync {
    async fn resolve(&self, path: &str) -> Result<String, AppError>;
}
