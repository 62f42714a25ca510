use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_USER_ID_LENGTH: usize = 128;

/// 認証済みユーザーの識別子（認証基盤が払い出す subject）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("UserId cannot be empty".to_string());
        }
        if trimmed.len() > MAX_USER_ID_LENGTH {
            return Err(format!(
                "UserId is too long (max {MAX_USER_ID_LENGTH} characters)"
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let id = UserId::new("  user-1 ".to_string()).unwrap();
        assert_eq!(id.as_str(), "user-1");
    }

    #[test]
    fn rejects_blank_and_oversized_values() {
        assert!(UserId::new("   ".to_string()).is_err());
        assert!(UserId::new("x".repeat(MAX_USER_ID_LENGTH + 1)).is_err());
    }
}
