//! User-facing auth error taxonomy.
//!
//! Vendor errors are mapped exactly once, at the provider boundary, and never
//! re-interpreted downstream. The mapping is a fixed lookup over the vendor's
//! machine-readable error code.

use serde::Serialize;
use thiserror::Error;

/// Closed set of user-facing auth error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorKind {
    InvalidCredentials,
    EmailNotConfirmed,
    UserAlreadyExists,
    /// User-correctable conditions like rate limiting.
    OtherUserError,
    UnknownError,
}

/// A mapped auth error: category plus a short human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct AuthUserError {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl AuthUserError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(AuthErrorKind::UnknownError, "An unknown error occurred.")
    }

    /// Map a vendor error code to exactly one taxonomy member. Unmapped
    /// codes (and absent codes) fall through to `UnknownError`.
    pub fn from_error_code(code: Option<&str>, fallback_message: &str) -> Self {
        match code {
            Some("user_already_exists") => Self::new(
                AuthErrorKind::UserAlreadyExists,
                "An account with this email already exists.",
            ),
            Some("invalid_credentials") => Self::new(
                AuthErrorKind::InvalidCredentials,
                "Invalid email or password.",
            ),
            Some("email_not_confirmed") => Self::new(
                AuthErrorKind::EmailNotConfirmed,
                "Please check your email and confirm your account before signing in.",
            ),
            Some("over_request_rate_limit") | Some("over_email_send_rate_limit") => Self::new(
                AuthErrorKind::OtherUserError,
                "Too many attempts. Please wait a moment and try again.",
            ),
            _ => {
                if fallback_message.is_empty() {
                    Self::unknown()
                } else {
                    Self::new(AuthErrorKind::UnknownError, fallback_message)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_known_code() {
        let cases = [
            ("user_already_exists", AuthErrorKind::UserAlreadyExists),
            ("invalid_credentials", AuthErrorKind::InvalidCredentials),
            ("email_not_confirmed", AuthErrorKind::EmailNotConfirmed),
            ("over_request_rate_limit", AuthErrorKind::OtherUserError),
            ("over_email_send_rate_limit", AuthErrorKind::OtherUserError),
        ];
        for (code, kind) in cases {
            assert_eq!(
                AuthUserError::from_error_code(Some(code), "msg").kind,
                kind,
                "code {code}"
            );
        }
    }

    #[test]
    fn unmapped_codes_are_unknown() {
        for code in ["weak_password", "bad_jwt", "totally_made_up", ""] {
            assert_eq!(
                AuthUserError::from_error_code(Some(code), "msg").kind,
                AuthErrorKind::UnknownError
            );
        }
    }

    #[test]
    fn absent_code_is_unknown_with_fallback_message() {
        let err = AuthUserError::from_error_code(None, "something broke");
        assert_eq!(err.kind, AuthErrorKind::UnknownError);
        assert_eq!(err.message, "something broke");
    }

    #[test]
    fn absent_code_and_message_uses_generic_text() {
        let err = AuthUserError::from_error_code(None, "");
        assert_eq!(err, AuthUserError::unknown());
    }

    #[test]
    fn kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&AuthErrorKind::UserAlreadyExists).unwrap();
        assert_eq!(json, "\"USER_ALREADY_EXISTS\"");
    }
}
