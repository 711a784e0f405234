use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Public URL of the hosted auth project, e.g. `https://ref.supabase.co`
    pub supabase_public_url: String,
    /// Publishable (anon) API key.
    pub supabase_anon_key: String,
    /// Service-role key for privileged server-side calls.
    pub supabase_service_role_key: String,
    /// Static shared secret granting the root procedure tier.
    pub app_key: String,
    pub admin_base_url: String,
    pub api_base_url: String,
    pub landing_base_url: String,
    /// `production` enables cross-subdomain session cookies.
    pub environment: String,
    pub sentry_dsn: Option<String>,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            supabase_public_url: env::var("SUPABASE_PUBLIC_URL")
                .context("SUPABASE_PUBLIC_URL must be set")?,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .context("SUPABASE_ANON_KEY must be set")?,
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .context("SUPABASE_SERVICE_ROLE_KEY must be set")?,
            app_key: env::var("APP_KEY").context("APP_KEY must be set")?,
            admin_base_url: env::var("ADMIN_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            landing_base_url: env::var("LANDING_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            sentry_dsn: env::var("SENTRY_DSN").ok(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
