//! Response envelopes.

use serde::Serialize;

use table_manager_core::table::ValidationErrors;

/// Envelope for successful responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always true
    pub success: bool,
    pub data: T,
}

/// Error details carried by [`ErrorResponse`].
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// HTTP status code as string
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Envelope for failed requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    pub error: ApiError,
}

/// Envelope for rows rejected by validation, keyed by column.
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse<'a> {
    /// Always false
    pub success: bool,
    pub errors: &'a ValidationErrors,
}

pub fn success_response<T: Serialize>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
    }
}

pub fn error_response(code: u16, message: String, details: Option<String>) -> ErrorResponse {
    ErrorResponse {
        success: false,
        error: ApiError {
            code: code.to_string(),
            message,
            details,
        },
    }
}

pub fn validation_error_response(errors: &ValidationErrors) -> ValidationErrorResponse<'_> {
    ValidationErrorResponse {
        success: false,
        errors,
    }
}
