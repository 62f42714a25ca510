use crate::application::ports::SessionProvider;
use crate::domain::value_objects::UserId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// プロセス内のログイン状態
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    current: RwLock<Option<UserId>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, user_id: UserId) {
        info!(user_id = %user_id, "Signed in");
        *self.current.write().await = Some(user_id);
    }

    pub async fn sign_out(&self) {
        if let Some(user_id) = self.current.write().await.take() {
            info!(user_id = %user_id, "Signed out");
        }
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionStore {
    async fn current_user(&self) -> Result<Option<UserId>, AppError> {
        Ok(self.current.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_and_out() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.current_user().await.unwrap(), None);

        let alice = UserId::new("alice".to_string()).unwrap();
        store.sign_in(alice.clone()).await;
        assert_eq!(store.current_user().await.unwrap(), Some(alice));

        store.sign_out().await;
        assert_eq!(store.current_user().await.unwrap(), None);
    }
}
