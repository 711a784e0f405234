// Minimal client for the hosted Supabase auth (GoTrue) and management APIs.
//
// Only the endpoints this workspace actually calls are wrapped; this is not
// a general-purpose SDK.

pub mod management;
pub mod models;

use reqwest::Client;
use serde_json::json;

use crate::models::{ApiErrorBody, AuthOutcome, Session, SupabaseError, User};

/// Connection options for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseOptions {
    /// Project base URL, e.g. `https://abcdefgh.supabase.co`
    pub url: String,
    /// Publishable (anon) API key, sent as the `apikey` header.
    pub anon_key: String,
    /// Service-role key for privileged server-side calls.
    pub service_role_key: String,
}

/// HTTP client for the auth (GoTrue) endpoints of a Supabase project.
#[derive(Debug, Clone)]
pub struct AuthClient {
    options: SupabaseOptions,
    http: Client,
}

impl AuthClient {
    pub fn new(options: SupabaseOptions) -> Self {
        Self {
            options,
            http: Client::new(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.options.url.trim_end_matches('/'), path)
    }

    /// Sign in with email/password.
    ///
    /// A user without a session in the response means the email is not
    /// confirmed yet; GoTrue reports that as an error which callers map
    /// through their own taxonomy.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SupabaseError> {
        let res = self
            .http
            .post(self.auth_url("/token?grant_type=password"))
            .header("apikey", &self.options.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        Self::parse_response(res).await
    }

    /// Exchange a refresh token for a fresh session.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, SupabaseError> {
        let res = self
            .http
            .post(self.auth_url("/token?grant_type=refresh_token"))
            .header("apikey", &self.options.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        Self::parse_response(res).await
    }

    /// Register a new account. When email confirmation is enabled the
    /// response carries a user but no session.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
        email_redirect_to: Option<&str>,
    ) -> Result<AuthOutcome, SupabaseError> {
        let mut body = json!({ "email": email, "password": password });
        if let Some(name) = name {
            body["data"] = json!({ "name": name });
        }

        let mut req = self
            .http
            .post(self.auth_url("/signup"))
            .header("apikey", &self.options.anon_key);
        if let Some(redirect) = email_redirect_to {
            req = req.query(&[("redirect_to", redirect)]);
        }

        let res = req.json(&body).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Self::error_from(status.as_u16(), res).await);
        }

        // Autoconfirmed projects answer with a full session, projects with
        // email confirmation answer with the bare user.
        let value: serde_json::Value = res.json().await?;
        if value.get("access_token").is_some() {
            let session: Session = serde_json::from_value(value)
                .map_err(|e| SupabaseError::unexpected_body(e.to_string()))?;
            Ok(AuthOutcome {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            let user: User = serde_json::from_value(value)
                .map_err(|e| SupabaseError::unexpected_body(e.to_string()))?;
            Ok(AuthOutcome {
                user,
                session: None,
            })
        }
    }

    /// Fetch the user behind an access token, validating it server-side.
    pub async fn get_user(&self, access_token: &str) -> Result<User, SupabaseError> {
        let res = self
            .http
            .get(self.auth_url("/user"))
            .header("apikey", &self.options.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::parse_response(res).await
    }

    /// Update the password of the user behind the access token.
    pub async fn update_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<User, SupabaseError> {
        let res = self
            .http
            .put(self.auth_url("/user"))
            .header("apikey", &self.options.anon_key)
            .bearer_auth(access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .await?;

        Self::parse_response(res).await
    }

    /// Send a password recovery email.
    pub async fn send_reset_email(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let mut req = self
            .http
            .post(self.auth_url("/recover"))
            .header("apikey", &self.options.anon_key);
        if let Some(redirect) = redirect_to {
            req = req.query(&[("redirect_to", redirect)]);
        }

        let res = req.json(&json!({ "email": email })).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Self::error_from(status.as_u16(), res).await);
        }
        Ok(())
    }

    /// Re-send the signup confirmation email.
    pub async fn resend_confirmation(&self, email: &str) -> Result<(), SupabaseError> {
        let res = self
            .http
            .post(self.auth_url("/resend"))
            .header("apikey", &self.options.anon_key)
            .json(&json!({ "type": "signup", "email": email }))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(Self::error_from(status.as_u16(), res).await);
        }
        Ok(())
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        res: reqwest::Response,
    ) -> Result<T, SupabaseError> {
        let status = res.status();
        if !status.is_success() {
            return Err(Self::error_from(status.as_u16(), res).await);
        }
        res.json::<T>()
            .await
            .map_err(|e| SupabaseError::unexpected_body(e.to_string()))
    }

    async fn error_from(status: u16, res: reqwest::Response) -> SupabaseError {
        let body = res.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) => SupabaseError::Api {
                status,
                message: parsed.message(),
                error_code: parsed.error_code,
            },
            Err(_) => SupabaseError::Api {
                status,
                error_code: None,
                message: body,
            },
        }
    }
}
