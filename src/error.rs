//! Service error types with HTTP status code mapping.
//!
//! [`RealtimeError`] is the central error type for the service. Query
//! failures never reach WebSocket clients (they are converted to safe
//! defaults at the operation boundary), but the REST surface still maps
//! every variant to a status code and a structured JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: status must not be empty",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`RealtimeError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category       | HTTP Status               |
/// |-----------|----------------|---------------------------|
/// | 1000–1999 | Validation     | 400 Bad Request           |
/// | 2000–2999 | Authentication | 401 Unauthorized          |
/// | 3000–3999 | Server         | 500 / 504                 |
#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    /// No active admin matches the supplied credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A client message could not be decoded.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A read against the relational store failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A read against the relational store exceeded the configured timeout.
    #[error("query timed out after {timeout_secs} s: {query}")]
    QueryTimeout {
        /// Name of the query that timed out.
        query: &'static str,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
}

impl RealtimeError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidMessage(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::InvalidCredentials => 2001,
            Self::QueryFailed(_) => 3001,
            Self::QueryTimeout { .. } => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidMessage(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::QueryTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::QueryFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for RealtimeError {
    fn from(err: sqlx::Error) -> Self {
        Self::QueryFailed(err.to_string())
    }
}

impl IntoResponse for RealtimeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn query_errors_map_to_server_range() {
        let err = RealtimeError::QueryFailed("connection reset".to_string());
        assert_eq!(err.error_code(), 3001);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = RealtimeError::QueryTimeout {
            query: "system_stats",
            timeout_secs: 10,
        };
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert!(err.to_string().contains("system_stats"));
    }

    #[test]
    fn invalid_credentials_is_unauthorized() {
        let err = RealtimeError::InvalidCredentials;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn invalid_message_is_validation_error() {
        let err = RealtimeError::InvalidMessage("unknown variant `subscribe`".to_string());
        assert_eq!(err.error_code(), 1001);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("invalid message: "));
    }

    #[test]
    fn sqlx_error_converts_to_query_failed() {
        let err: RealtimeError = sqlx::Error::RowNotFound.into();
        let RealtimeError::QueryFailed(msg) = err else {
            panic!("expected QueryFailed");
        };
        assert!(!msg.is_empty());
    }
}
