use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

/// 件数上限付きの TTL メモリキャッシュ
///
/// 上限を超えると最も長く参照されていないエントリから追い出す。
pub struct MemoryCacheService<T: Clone> {
    cache: Mutex<LruCache<String, CacheEntry<T>>>,
    default_ttl: Duration,
}

impl<T> MemoryCacheService<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            default_ttl,
        }
    }

    /// キャッシュにデータを保存
    pub async fn set(&self, key: String, value: T) {
        self.set_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn set_with_ttl(&self, key: String, value: T, ttl: Duration) {
        let entry = CacheEntry {
            data: value,
            expires_at: Instant::now() + ttl,
        };

        let mut cache = self.cache.lock().await;
        cache.put(key, entry);
    }

    /// 期限切れのエントリは取り出し時に捨てる
    pub async fn get(&self, key: &str) -> Option<T> {
        let mut cache = self.cache.lock().await;

        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.data.clone()),
            Some(_) => {
                cache.pop(key);
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let cache = MemoryCacheService::new(2, Duration::from_secs(60));
        cache.set("a".into(), 1).await;
        cache.set("b".into(), 2).await;
        assert_eq!(cache.get("a").await, Some(1));

        cache.set("c".into(), 3).await;
        assert_eq!(cache.get("b").await, None);
        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let cache = MemoryCacheService::new(8, Duration::from_secs(60));
        cache
            .set_with_ttl("short".into(), "x", Duration::ZERO)
            .await;
        cache.set("long".into(), "y").await;

        assert_eq!(cache.get("short").await, None);
        assert_eq!(cache.get("long").await, Some("y"));
    }
}
