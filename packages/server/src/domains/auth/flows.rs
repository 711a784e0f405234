//! Auth flows: the server-side halves of login, signup, password reset,
//! password update and confirmation resend.
//!
//! Every flow is a single provider attempt: validate locally, call the
//! provider once, map the vendor error once. No retries.

use thiserror::Error;
use tracing::{info, warn};

use crate::common::auth::AuthUserError;
use crate::domains::auth::provider::{AuthApi, ProviderError, ProviderSession};
use crate::domains::auth::validation::{
    validate_email_only, validate_login, validate_password_update, validate_signup,
    ValidationErrors,
};

/// Successful flow result. `needs_confirm_email` marks the branch where the
/// provider acknowledged the account but withheld a session.
#[derive(Debug, Clone)]
pub struct FlowOutcome {
    pub needs_confirm_email: bool,
    pub session: Option<ProviderSession>,
}

impl FlowOutcome {
    fn confirmed(session: ProviderSession) -> Self {
        Self {
            needs_confirm_email: false,
            session: Some(session),
        }
    }

    fn needs_confirmation() -> Self {
        Self {
            needs_confirm_email: true,
            session: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Auth(#[from] AuthUserError),
}

impl From<ValidationErrors> for FlowError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<ProviderError> for FlowError {
    fn from(err: ProviderError) -> Self {
        Self::Auth(AuthUserError::from_error_code(
            err.code.as_deref(),
            &err.message,
        ))
    }
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

pub async fn login(
    auth: &dyn AuthApi,
    email: &str,
    password: &str,
) -> Result<FlowOutcome, FlowError> {
    validate_login(email, password)?;

    let outcome = auth.sign_in(email, password).await?;
    match outcome.session {
        Some(session) => {
            info!(user = %outcome.user.id, "user logged in");
            Ok(FlowOutcome::confirmed(session))
        }
        // A user without a session means the email is not confirmed yet.
        None => Ok(FlowOutcome::needs_confirmation()),
    }
}

pub async fn signup(
    auth: &dyn AuthApi,
    input: &SignupInput,
    admin_base_url: &str,
) -> Result<FlowOutcome, FlowError> {
    validate_signup(
        &input.name,
        &input.email,
        &input.password,
        &input.confirm_password,
    )?;

    let outcome = auth
        .sign_up(
            &input.email,
            &input.password,
            Some(input.name.trim()),
            Some(admin_base_url),
        )
        .await?;

    match outcome.session {
        Some(session) => {
            info!(user = %outcome.user.id, "user signed up");
            Ok(FlowOutcome::confirmed(session))
        }
        None => Ok(FlowOutcome::needs_confirmation()),
    }
}

/// Send a password recovery email. The response never distinguishes unknown
/// addresses from known ones.
pub async fn request_password_reset(
    auth: &dyn AuthApi,
    email: &str,
    admin_base_url: &str,
) -> Result<(), FlowError> {
    validate_email_only(email)?;

    let redirect = format!("{}/auth/reset-password", admin_base_url.trim_end_matches('/'));
    auth.send_reset_email(email, Some(&redirect)).await?;
    Ok(())
}

/// Update the caller's password, then refresh the session so the new
/// credential state propagates before success is reported. Returns the
/// refreshed session when one was obtained.
pub async fn update_password(
    auth: &dyn AuthApi,
    access_token: &str,
    refresh_token: Option<&str>,
    password: &str,
    confirm_password: &str,
) -> Result<Option<ProviderSession>, FlowError> {
    validate_password_update(password, confirm_password)?;

    let identity = auth.update_password(access_token, password).await?;
    info!(user = %identity.id, "password updated");

    let Some(refresh_token) = refresh_token else {
        return Ok(None);
    };
    match auth.refresh_session(refresh_token).await {
        Ok(session) => Ok(Some(session)),
        Err(err) => {
            // The password change already happened; a failed refresh only
            // means the old session keeps running until it expires.
            warn!(error = %err, "session refresh after password update failed");
            Ok(None)
        }
    }
}

pub async fn resend_confirmation(auth: &dyn AuthApi, email: &str) -> Result<(), FlowError> {
    validate_email_only(email)?;
    auth.resend_confirmation(email).await?;
    Ok(())
}
