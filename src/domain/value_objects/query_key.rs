use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// ライブクエリの識別子。クエリ名と引数から決定的に導出する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Query key cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    /// `prefix:query_name:sha256(canonical_json(args))` を生成する。
    ///
    /// 引数のオブジェクトキーは再帰的にソートしてからハッシュするため、
    /// フィールドの並び順が違っても同じキーになる。
    pub fn derive<A: Serialize + ?Sized>(
        prefix: &str,
        query_name: &str,
        args: &A,
    ) -> Result<Self, String> {
        if query_name.trim().is_empty() {
            return Err("Query name cannot be empty".to_string());
        }
        let value = serde_json::to_value(args)
            .map_err(|err| format!("Failed to serialize query args: {err}"))?;
        let canonical = serde_json::to_string(&canonicalize(value))
            .map_err(|err| format!("Failed to serialize query args: {err}"))?;
        let digest = Sha256::digest(canonical.as_bytes());
        Self::new(format!("{prefix}:{query_name}:{digest:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key, canonicalize(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<QueryKey> for String {
    fn from(key: QueryKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_ignores_field_order() {
        let a = QueryKey::derive("qc", "listings.search", &json!({"city": "Osaka", "beds": 2}))
            .unwrap();
        let b = QueryKey::derive("qc", "listings.search", &json!({"beds": 2, "city": "Osaka"}))
            .unwrap();
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("qc:listings.search:"));
    }

    #[test]
    fn key_depends_on_name_and_args() {
        let base = QueryKey::derive("qc", "listings.search", &json!({"city": "Osaka"})).unwrap();
        let other_args =
            QueryKey::derive("qc", "listings.search", &json!({"city": "Kyoto"})).unwrap();
        let other_name = QueryKey::derive("qc", "listings.saved", &json!({"city": "Osaka"})).unwrap();
        assert_ne!(base, other_args);
        assert_ne!(base, other_name);
    }

    #[test]
    fn empty_query_name_is_rejected() {
        assert!(QueryKey::derive("qc", " ", &json!({})).is_err());
    }
}
