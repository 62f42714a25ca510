use crate::shared::error::AppError;

/// 端末ローカルの永続 KV ストア。同期 API で、容量超過時は `QuotaExceeded` を返す。
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError>;
}
