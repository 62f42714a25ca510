use super::query::LiveQueryOptions;
use crate::application::ports::{Clock, KeyValueStore};
use crate::domain::value_objects::QueryKey;
use crate::shared::error::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    value: serde_json::Value,
    captured_at: i64,
}

/// ライブクエリの最終確定値を端末ローカルに残すキャッシュ
///
/// 書き込み失敗（容量超過・シリアライズ失敗）は握りつぶす。キャッシュは最適化であり、
/// 正しさの前提にはしない。TTL を過ぎたエントリは読み出し時に削除して「無し」と扱う。
pub struct PersistedQueryCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    prefix: String,
}

impl PersistedQueryCache {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            ttl,
            prefix: prefix.into(),
        }
    }

    /// クエリ名と引数からキーを導出する
    pub fn key_for<A: Serialize + ?Sized>(
        &self,
        query_name: &str,
        args: &A,
    ) -> Result<QueryKey, AppError> {
        QueryKey::derive(&self.prefix, query_name, args).map_err(AppError::InvalidInput)
    }

    fn is_expired(&self, captured_at: i64, now: i64) -> bool {
        let age = now.saturating_sub(captured_at);
        age < 0 || age as u128 > self.ttl.as_millis()
    }

    pub fn load<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let raw = match self.store.get(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                debug!(key = %key, error = %err, "Failed to read query cache entry");
                return None;
            }
        };

        let entry: StoredEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(key = %key, error = %err, "Discarding unreadable query cache entry");
                self.discard(key);
                return None;
            }
        };

        if self.is_expired(entry.captured_at, self.clock.now_millis()) {
            debug!(key = %key, "Query cache entry expired");
            self.discard(key);
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(key = %key, error = %err, "Query cache entry has unexpected shape");
                self.discard(key);
                None
            }
        }
    }

    pub fn store<T: Serialize + ?Sized>(&self, key: &QueryKey, value: &T) {
        if let Err(err) = self.try_store(key, value) {
            debug!(key = %key, error = %err, "Ignoring query cache write failure");
        }
    }

    fn try_store<T: Serialize + ?Sized>(&self, key: &QueryKey, value: &T) -> Result<(), AppError> {
        let entry = StoredEntry {
            value: serde_json::to_value(value)?,
            captured_at: self.clock.now_millis(),
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.set(key.as_str(), &raw)
    }

    fn discard(&self, key: &QueryKey) {
        if let Err(err) = self.store.remove(key.as_str()) {
            debug!(key = %key, error = %err, "Failed to remove query cache entry");
        }
    }

    /// 期限切れ・破損エントリをまとめて削除し、削除件数を返す
    pub fn purge_expired(&self) -> usize {
        let keys = match self.store.keys_with_prefix(&self.prefix) {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "Failed to enumerate query cache entries");
                return 0;
            }
        };

        let now = self.clock.now_millis();
        let mut purged = 0;
        for key in keys {
            let expired = match self.store.get(&key) {
                Ok(Some(raw)) => serde_json::from_str::<StoredEntry>(&raw)
                    .map(|entry| self.is_expired(entry.captured_at, now))
                    .unwrap_or(true),
                Ok(None) => false,
                Err(_) => false,
            };
            if expired && self.store.remove(&key).is_ok() {
                purged += 1;
            }
        }

        if purged > 0 {
            debug!(purged, "Purged expired query cache entries");
        }
        purged
    }

    /// 永続キャッシュで初期値を与え、確定値を書き戻すオプションに変換する
    pub fn attach<T>(self: &Arc<Self>, key: QueryKey, options: LiveQueryOptions<T>) -> LiveQueryOptions<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let fallback = self.load::<T>(&key);
        let cache = Arc::clone(self);
        options
            .with_fallback(fallback)
            .on_value(move |value: &T| cache.store(&key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualClock;
    use crate::infrastructure::storage::MemoryKeyValueStore;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(300);

    fn setup(quota: usize) -> (PersistedQueryCache, Arc<ManualClock>, Arc<MemoryKeyValueStore>) {
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(MemoryKeyValueStore::with_quota(quota));
        let cache = PersistedQueryCache::new(store.clone(), clock.clone(), TTL, "qc");
        (cache, clock, store)
    }

    #[test]
    fn stored_value_is_loaded_until_ttl_passes() {
        let (cache, clock, store) = setup(64 * 1024);
        let key = cache.key_for("listings.search", &json!({"city": "Osaka"})).unwrap();

        cache.store(&key, &vec!["a".to_string(), "b".to_string()]);
        clock.advance(Duration::from_secs(299));
        assert_eq!(
            cache.load::<Vec<String>>(&key),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.load::<Vec<String>>(&key), None);
        // 期限切れは読み出し時に削除される
        assert_eq!(store.get(key.as_str()).unwrap(), None);
    }

    #[test]
    fn quota_failure_is_swallowed() {
        let (cache, _clock, _store) = setup(16);
        let key = cache.key_for("listings.search", &json!({})).unwrap();

        cache.store(&key, &"x".repeat(128));
        assert_eq!(cache.load::<String>(&key), None);
    }

    #[test]
    fn corrupted_entry_is_treated_as_absent() {
        let (cache, _clock, store) = setup(64 * 1024);
        let key = cache.key_for("listings.saved", &json!({"user": 1})).unwrap();
        store.set(key.as_str(), "{broken").unwrap();

        assert_eq!(cache.load::<u32>(&key), None);
        assert_eq!(store.get(key.as_str()).unwrap(), None);
    }

    #[test]
    fn purge_expired_removes_only_old_entries() {
        let (cache, clock, store) = setup(64 * 1024);
        let old = cache.key_for("q", &json!({"n": 1})).unwrap();
        cache.store(&old, &1u32);
        clock.advance(Duration::from_secs(200));
        let fresh = cache.key_for("q", &json!({"n": 2})).unwrap();
        cache.store(&fresh, &2u32);
        store.set("unrelated", "keep").unwrap();

        clock.advance(Duration::from_secs(150));
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.load::<u32>(&fresh), Some(2));
        assert_eq!(store.get("unrelated").unwrap().as_deref(), Some("keep"));
    }
}
