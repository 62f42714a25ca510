use crate::application::ports::KeyValueStore;
use crate::shared::error::AppError;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

type Entries = BTreeMap<String, String>;

fn used_bytes(entries: &Entries) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// `key` を `value` で置き換えた後の使用量が上限内なら反映する
fn put_within_quota(
    entries: &mut Entries,
    key: &str,
    value: &str,
    quota: usize,
) -> Result<Option<String>, AppError> {
    let current = entries.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
    let used = used_bytes(entries) - current + key.len() + value.len();
    if used > quota {
        return Err(AppError::QuotaExceeded { used, quota });
    }
    Ok(entries.insert(key.to_string(), value.to_string()))
}

fn keys_with_prefix(entries: &Entries, prefix: &str) -> Vec<String> {
    entries
        .range(prefix.to_string()..)
        .take_while(|(key, _)| key.starts_with(prefix))
        .map(|(key, _)| key.clone())
        .collect()
}

/// プロセス内だけで保持する KV ストア
#[derive(Debug)]
pub struct MemoryKeyValueStore {
    entries: Mutex<Entries>,
    quota: usize,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::with_quota(usize::MAX)
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::new()),
            quota,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        put_within_quota(&mut self.lock(), key, value, self.quota).map(|_| ())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        Ok(keys_with_prefix(&self.lock(), prefix))
    }
}

/// JSON ファイル 1 つに全エントリを書き出す KV ストア
///
/// 書き込みのたびに一時ファイルへ書いてから rename する。
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: Mutex<Entries>,
    quota: usize,
}

impl FileKeyValueStore {
    pub fn open(path: impl Into<PathBuf>, quota: usize) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<Entries>(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "Local store is unreadable, starting empty");
                Entries::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Entries::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "Opened local store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
            quota,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, entries: &Entries) -> Result<(), AppError> {
        let raw = serde_json::to_string(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self.lock();
        let previous = put_within_quota(&mut entries, key, value, self.quota)?;
        if let Err(err) = self.flush(&entries) {
            // ディスクに書けなければメモリ上も元に戻す
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        Ok(keys_with_prefix(&self.lock(), prefix))
    }
}
