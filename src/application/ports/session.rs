use crate::domain::value_objects::UserId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// 認証済みユーザーの参照ポート
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// 未ログインなら `Ok(None)`
    async fn current_user(&self) -> Result<Option<UserId>, AppError>;
}
