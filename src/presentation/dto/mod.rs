// DTOモジュール
pub mod recently_viewed_dto;

use crate::shared::AppError;
use serde::{Deserialize, Serialize};

// 共通のレスポンス型
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
        }
    }

    pub fn from_app_error(error: AppError) -> Self {
        Self {
            success: false,
            data: None,
            error_code: Some(error.code().to_string()),
            error: Some(error.to_string()),
        }
    }

    pub fn from_result(result: crate::shared::Result<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::from_app_error(err),
        }
    }
}

// バリデーショントレイト
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_carries_code() {
        let response: ApiResponse<()> =
            ApiResponse::from_result(Err(AppError::InvalidInput("bad".to_string())));
        assert!(!response.success);
        assert_eq!(response.error_code.as_deref(), Some("INVALID_INPUT"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["errorCode"], "INVALID_INPUT");
    }
}
