//! Error Types for the Stash API
//!
//! This module defines error handling for the HTTP boundary, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.
//! Tier failures never reach this module on the store/fetch paths; the
//! coordinator absorbs them, so 5xx codes are reserved for genuinely
//! unexpected states.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::compress::EnvelopeError;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur while serving record traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request contains invalid input data
    InvalidInput,

    /// Compressed payload envelope could not be decoded
    InvalidEnvelope,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested record does not exist
    RecordNotFound,

    // ========================================================================
    // Payload Errors (413)
    // ========================================================================
    /// Request body exceeds the configured size limit
    PayloadTooLarge,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput | ErrorCode::InvalidEnvelope => StatusCode::BAD_REQUEST,

            ErrorCode::RecordNotFound => StatusCode::NOT_FOUND,

            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::InvalidEnvelope => "Compressed payload could not be decoded",
            ErrorCode::RecordNotFound => "Record not found",
            ErrorCode::PayloadTooLarge => "Request body too large",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
///
/// This type is returned by all API endpoints when an error occurs.
/// It provides a consistent error format across every route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create an InvalidEnvelope error.
    pub fn invalid_envelope(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidEnvelope, message)
    }

    /// Create a RecordNotFound error.
    ///
    /// Also used for ids that cannot name a record at all; a malformed id
    /// is indistinguishable from a missing one to the caller.
    pub fn record_not_found(id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::RecordNotFound,
            format!("Record {} not found", id),
        )
    }

    /// Create a PayloadTooLarge error.
    pub fn payload_too_large() -> Self {
        Self::from_code(ErrorCode::PayloadTooLarge)
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in Axum.
///
/// This allows ApiError to be returned directly from Axum handlers:
/// ```ignore
/// async fn handler() -> Result<Json<Response>, ApiError> {
///     Err(ApiError::record_not_found("abc123"))
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM STANDARD ERRORS
// ============================================================================

/// Convert from axum's JSON extraction rejection to ApiError.
///
/// Covers empty bodies, malformed JSON, and a missing content type, all of
/// which report 400. A body over the configured limit reports 413.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::payload_too_large();
        }
        ApiError::invalid_input(rejection.body_text())
    }
}

/// Convert from a failed envelope decode to ApiError.
impl From<EnvelopeError> for ApiError {
    fn from(err: EnvelopeError) -> Self {
        ApiError::invalid_envelope(err.to_string())
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
///
/// This is the standard result type used throughout the API layer.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::InvalidInput.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::InvalidEnvelope.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::RecordNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ErrorCode::ServiceUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ErrorCode::InternalError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_error_constructors() {
        let err = ApiError::invalid_input("Body was empty");
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.message, "Body was empty");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ApiError::record_not_found("abc123");
        assert_eq!(err.code, ErrorCode::RecordNotFound);
        assert!(err.message.contains("abc123"));

        let err = ApiError::payload_too_large();
        assert_eq!(err.code, ErrorCode::PayloadTooLarge);
        assert_eq!(err.message, ErrorCode::PayloadTooLarge.default_message());
    }

    #[test]
    fn test_api_error_with_details() {
        let details = serde_json::json!({
            "field": "compressed",
            "constraint": "must be base64 text"
        });

        let err = ApiError::invalid_envelope("Bad envelope").with_details(details.clone());

        assert_eq!(err.code, ErrorCode::InvalidEnvelope);
        assert_eq!(err.details, Some(details));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::record_not_found("zzz999");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("RECORD_NOT_FOUND"));
        assert!(json.contains("zzz999"));
        // The details field is omitted entirely when unset.
        assert!(!json.contains("details"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::service_unavailable("Tier stack offline");
        let display = format!("{}", err);

        assert!(display.contains("ServiceUnavailable"));
        assert!(display.contains("Tier stack offline"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = ApiError::from(parse_err);

        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("Invalid JSON"));
    }
}
