// Narrow seam in front of the hosted auth provider.
//
// The provider owns credentials, sessions and confirmation emails; this
// server only relays them. Everything the rest of the codebase may ask of
// the vendor goes through `AuthApi` so tests can swap in a fake.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use supabase::models::SupabaseError;
use supabase::{AuthClient, SupabaseOptions};

use crate::config::Config;

/// The identity behind a validated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
}

/// A provider-issued session: opaque token pair with an expiry.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
    pub user: Identity,
}

/// Result of a credential operation. A user without a session means the
/// account still needs email confirmation.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: Identity,
    pub session: Option<ProviderSession>,
}

/// Error reported by the auth provider.
#[derive(Debug, Clone, Error)]
#[error("auth provider error ({status}): {message}")]
pub struct ProviderError {
    pub status: u16,
    /// Machine-readable vendor error code, when available.
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(status: u16, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }
}

impl From<SupabaseError> for ProviderError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Api {
                status,
                error_code,
                message,
            } => Self {
                status,
                code: error_code,
                message,
            },
            other => Self {
                status: 0,
                code: None,
                message: other.to_string(),
            },
        }
    }
}

/// Operations this server needs from the hosted auth provider.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Validate an access token server-side and return its identity.
    async fn get_user(&self, access_token: &str) -> Result<Identity, ProviderError>;

    /// Exchange a refresh token for a fresh session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthOutcome, ProviderError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
        email_redirect_to: Option<&str>,
    ) -> Result<AuthOutcome, ProviderError>;

    async fn send_reset_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ProviderError>;

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<Identity, ProviderError>;

    async fn resend_confirmation(&self, email: &str) -> Result<(), ProviderError>;
}

/// Production `AuthApi` backed by the Supabase auth API.
pub struct SupabaseAuthProvider {
    client: AuthClient,
}

impl SupabaseAuthProvider {
    pub fn new(client: AuthClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(AuthClient::new(SupabaseOptions {
            url: config.supabase_public_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        }))
    }
}

fn identity_from(user: supabase::models::User) -> Identity {
    Identity {
        id: user.id,
        email: user.email,
    }
}

fn session_from(session: supabase::models::Session) -> ProviderSession {
    ProviderSession {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        expires_in: session.expires_in,
        user: identity_from(session.user),
    }
}

#[async_trait]
impl AuthApi for SupabaseAuthProvider {
    async fn get_user(&self, access_token: &str) -> Result<Identity, ProviderError> {
        Ok(identity_from(self.client.get_user(access_token).await?))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        Ok(session_from(self.client.refresh_session(refresh_token).await?))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthOutcome, ProviderError> {
        let session = self.client.sign_in_with_password(email, password).await?;
        let session = session_from(session);
        Ok(AuthOutcome {
            user: session.user.clone(),
            session: Some(session),
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
        email_redirect_to: Option<&str>,
    ) -> Result<AuthOutcome, ProviderError> {
        let outcome = self
            .client
            .sign_up(email, password, name, email_redirect_to)
            .await?;
        Ok(AuthOutcome {
            user: identity_from(outcome.user),
            session: outcome.session.map(session_from),
        })
    }

    async fn send_reset_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), ProviderError> {
        Ok(self.client.send_reset_email(email, redirect_to).await?)
    }

    async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<Identity, ProviderError> {
        Ok(identity_from(
            self.client.update_password(access_token, new_password).await?,
        ))
    }

    async fn resend_confirmation(&self, email: &str) -> Result<(), ProviderError> {
        Ok(self.client.resend_confirmation(email).await?)
    }
}
