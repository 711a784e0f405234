//! Client for the Supabase management API (`api.supabase.com/v1`).
//!
//! Used by the provisioning CLI to create projects, configure the
//! confirmation email template and mint API keys.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::models::SupabaseError;

pub const DEFAULT_MANAGEMENT_URL: &str = "https://api.supabase.com/v1";

/// A project as returned by `POST /projects`.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// Project reference, e.g. `abcdefghijklmnop`. Doubles as the subdomain
    /// of the project URL.
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// An API key attached to a project.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
    pub id: String,
    /// `publishable` or `secret`.
    #[serde(rename = "type")]
    pub key_type: String,
    pub name: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Authenticated client for the management API.
#[derive(Debug, Clone)]
pub struct ManagementClient {
    base_url: String,
    bearer_token: String,
    http: Client,
}

impl ManagementClient {
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_MANAGEMENT_URL, bearer_token)
    }

    pub fn with_base_url(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Create a new managed project and return its reference.
    pub async fn create_project(
        &self,
        name: &str,
        organization_id: &str,
        region: &str,
        db_password: &str,
    ) -> Result<Project, SupabaseError> {
        let res = self
            .http
            .post(self.url("/projects"))
            .bearer_auth(&self.bearer_token)
            .json(&json!({
                "name": name,
                "organization_id": organization_id,
                "region": region,
                "db_pass": db_password,
            }))
            .send()
            .await?;

        Self::parse(res).await
    }

    /// Overwrite the signup confirmation email template for a project.
    pub async fn configure_confirmation_template(
        &self,
        project_ref: &str,
        subject: &str,
        content: &str,
    ) -> Result<(), SupabaseError> {
        let res = self
            .http
            .patch(self.url(&format!("/projects/{project_ref}/config/auth")))
            .bearer_auth(&self.bearer_token)
            .json(&json!({
                "mailer_subjects_confirmation": subject,
                "mailer_templates_confirmation_content": content,
            }))
            .send()
            .await?;

        Self::check(res).await
    }

    pub async fn list_api_keys(&self, project_ref: &str) -> Result<Vec<ApiKey>, SupabaseError> {
        let res = self
            .http
            .get(self.url(&format!("/projects/{project_ref}/api-keys")))
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        Self::parse(res).await
    }

    /// Create an API key. `reveal` must be set to get the secret material
    /// back in the response.
    pub async fn create_api_key(
        &self,
        project_ref: &str,
        key_type: &str,
        name: &str,
        reveal: bool,
    ) -> Result<ApiKey, SupabaseError> {
        let mut req = self
            .http
            .post(self.url(&format!("/projects/{project_ref}/api-keys")))
            .bearer_auth(&self.bearer_token);
        if reveal {
            req = req.query(&[("reveal", "true")]);
        }

        let res = req
            .json(&json!({ "type": key_type, "name": name }))
            .send()
            .await?;

        Self::parse(res).await
    }

    pub async fn delete_api_key(
        &self,
        project_ref: &str,
        key_id: &str,
    ) -> Result<(), SupabaseError> {
        let res = self
            .http
            .delete(self.url(&format!("/projects/{project_ref}/api-keys/{key_id}")))
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        Self::check(res).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        res: reqwest::Response,
    ) -> Result<T, SupabaseError> {
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                error_code: None,
                message: body,
            });
        }
        res.json::<T>()
            .await
            .map_err(|e| SupabaseError::unexpected_body(e.to_string()))
    }

    async fn check(res: reqwest::Response) -> Result<(), SupabaseError> {
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                error_code: None,
                message: body,
            });
        }
        Ok(())
    }
}
