use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A user record as returned by the auth API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form metadata attached at signup (e.g. display name).
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// An issued session: opaque token pair plus the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    pub user: User,
}

/// Outcome of a credential operation. `session` is absent when the account
/// still needs email confirmation.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: User,
    pub session: Option<Session>,
}

/// Error body shape used by the auth API.
///
/// Newer versions report a machine-readable `error_code`; older ones only a
/// message under `msg`, `message` or `error_description`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error_description.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[derive(Debug, Error)]
pub enum SupabaseError {
    /// The API answered with a non-success status.
    #[error("supabase api error ({status}): {message}")]
    Api {
        status: u16,
        error_code: Option<String>,
        message: String,
    },

    /// The request itself failed (DNS, TLS, connect, ...).
    #[error("supabase request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response did not match the expected shape.
    #[error("unexpected supabase response body: {0}")]
    UnexpectedBody(String),
}

impl SupabaseError {
    pub fn unexpected_body(detail: impl Into<String>) -> Self {
        Self::UnexpectedBody(detail.into())
    }

    /// Machine-readable vendor error code, when the API provided one.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Api { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_prefers_msg() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(body.error_code.as_deref(), Some("invalid_credentials"));
        assert_eq!(body.message(), "Invalid login credentials");
    }

    #[test]
    fn error_body_falls_back_to_error_description() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error_description":"refresh token expired"}"#).unwrap();
        assert_eq!(body.error_code, None);
        assert_eq!(body.message(), "refresh token expired");
    }

    #[test]
    fn session_deserializes() {
        let session: Session = serde_json::from_str(
            r#"{
                "access_token": "at",
                "refresh_token": "rt",
                "expires_in": 3600,
                "token_type": "bearer",
                "user": {"id": "6a4b2b44-7c11-4de5-b81b-b53b7e7f0b9f", "email": "a@b.com"}
            }"#,
        )
        .unwrap();
        assert_eq!(session.expires_in, 3600);
        assert_eq!(session.user.email.as_deref(), Some("a@b.com"));
    }
}
