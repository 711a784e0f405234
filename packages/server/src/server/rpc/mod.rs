//! RPC envelope and fault codes.
//!
//! Responses follow the typed-RPC JSON envelope the admin frontend already
//! speaks: `{"result":{"data":...}}` on success, `{"error":{...}}` with a
//! matching HTTP status on failure.

pub mod guards;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCode {
    Unauthorized,
    Forbidden,
    NotFound,
    BadRequest,
    InternalServerError,
}

impl RpcCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcCode::Unauthorized => "UNAUTHORIZED",
            RpcCode::Forbidden => "FORBIDDEN",
            RpcCode::NotFound => "NOT_FOUND",
            RpcCode::BadRequest => "BAD_REQUEST",
            RpcCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            RpcCode::Unauthorized => StatusCode::UNAUTHORIZED,
            RpcCode::Forbidden => StatusCode::FORBIDDEN,
            RpcCode::NotFound => StatusCode::NOT_FOUND,
            RpcCode::BadRequest => StatusCode::BAD_REQUEST,
            RpcCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A classified RPC fault. Raised by guards and procedures, passed through
/// unchanged once classified.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", code.as_str())]
pub struct RpcError {
    pub code: RpcCode,
    pub message: String,
}

impl RpcError {
    pub fn new(code: RpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(RpcCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RpcCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(RpcCode::BadRequest, message)
    }

    /// Log an unexpected failure and signal a generic internal fault; the
    /// underlying error never reaches the client.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::new(
            RpcCode::InternalServerError,
            "An unexpected error occurred",
        )
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        let body = json!({
            "error": {
                "code": self.code.as_str(),
                "httpStatus": status.as_u16(),
                "message": self.message,
            }
        });
        (status, Json(body)).into_response()
    }
}

/// Wrap procedure output in the success envelope.
pub fn ok_envelope<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "result": { "data": data } }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_http_statuses() {
        assert_eq!(RpcCode::Unauthorized.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(RpcCode::Forbidden.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(RpcCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(RpcCode::BadRequest.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RpcCode::InternalServerError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn envelope_shapes() {
        let ok = ok_envelope(json!({"x": 1}));
        assert_eq!(ok.0["result"]["data"]["x"], 1);

        let err = RpcError::forbidden("nope");
        assert_eq!(err.code.as_str(), "FORBIDDEN");
    }
}
