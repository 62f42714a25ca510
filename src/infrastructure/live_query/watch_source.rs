use crate::application::ports::{QuerySource, QueryUpdate};
use crate::domain::value_objects::QueryKey;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, warn};

/// `tokio::sync::watch` によるプロセス内のライブクエリ購読元
///
/// 引数ごとにチャネルを 1 本持ち、同じ引数の購読者は同じ値を見る。
/// 値が一度も publish されていない引数は `Pending` から始まる。
pub struct WatchQuerySource<A, T> {
    query_name: String,
    channels: Mutex<HashMap<QueryKey, watch::Sender<QueryUpdate<T>>>>,
    _args: PhantomData<fn(&A)>,
}

impl<A, T> WatchQuerySource<A, T>
where
    A: Serialize,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            channels: Mutex::new(HashMap::new()),
            _args: PhantomData,
        }
    }

    fn key(&self, args: &A) -> Result<QueryKey, String> {
        QueryKey::derive("live", &self.query_name, args)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, watch::Sender<QueryUpdate<T>>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 引数 `args` の購読者へ更新を流す
    pub fn publish(&self, args: &A, update: QueryUpdate<T>) {
        let key = match self.key(args) {
            Ok(key) => key,
            Err(err) => {
                warn!(query = %self.query_name, error = %err, "Cannot publish live query update");
                return;
            }
        };
        let mut channels = self.lock();
        match channels.get(&key) {
            Some(sender) => {
                sender.send_replace(update);
            }
            None => {
                let (sender, _) = watch::channel(update);
                channels.insert(key, sender);
            }
        }
    }
}

impl<A, T> QuerySource<A, T> for WatchQuerySource<A, T>
where
    A: Serialize + Send + Sync,
    T: Clone + Send + Sync + 'static,
{
    fn subscribe(&self, args: &A) -> watch::Receiver<QueryUpdate<T>> {
        let key = match self.key(args) {
            Ok(key) => key,
            Err(err) => {
                let (_, rx) = watch::channel(QueryUpdate::Failed(err));
                return rx;
            }
        };
        debug!(query = %self.query_name, key = %key, "Subscribing to live query");
        self.lock()
            .entry(key)
            .or_insert_with(|| watch::channel(QueryUpdate::Pending).0)
            .subscribe()
    }
}
