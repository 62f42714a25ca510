use serde::{Deserialize, Serialize};
use std::fmt;

/// ViewRecord エンティティの識別子。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewRecordId(String);

impl ViewRecordId {
    /// 既存の識別子文字列から `ViewRecordId` を生成する。
    pub fn new(value: String) -> Result<Self, String> {
        if value.is_empty() {
            return Err("ViewRecordId cannot be empty".to_string());
        }
        uuid::Uuid::parse_str(&value)
            .map_err(|err| format!("Invalid ViewRecordId format: {err}"))?;
        Ok(Self(value))
    }

    /// 新規 ViewRecordId を生成する。
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ViewRecordId> for String {
    fn from(value: ViewRecordId) -> Self {
        value.0
    }
}
