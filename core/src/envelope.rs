//! The uniform result of every API call.
//!
//! `ApiResponse` is what `ApiClient::request` hands back instead of a
//! `Result`: transport failures, decode failures and non-2xx statuses all
//! arrive as `success == false` with a non-empty `error`.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub(crate) const UNKNOWN_ERROR: &str = "Unknown error occurred";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: Option<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            data: None,
            error: Some(if error.is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                error
            }),
            message: None,
        }
    }

    /// Convert into a `Result`, for call sites that prefer `?`.
    ///
    /// A failure envelope becomes `ApiError::Failed` carrying its error text.
    pub fn into_result(self) -> Result<T, ApiError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(ApiError::Deserialization("response carried no data".to_string())),
            (false, _) => Err(ApiError::Failed(
                self.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            )),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            message: self.message,
        }
    }
}

impl<T> From<ApiError> for ApiResponse<T> {
    fn from(err: ApiError) -> Self {
        ApiResponse::fail(err.to_string())
    }
}
