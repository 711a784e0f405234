// Common test utilities

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use server_core::common::cookies::CookiePolicy;
use server_core::domains::auth::fake::FakeAuthApi;
use server_core::domains::users::{InMemoryRoleStore, UserRole};
use server_core::server::{build_router, AppState};
use server_core::Config;

pub const ROOT_KEY: &str = "root-key-for-tests";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/unused".to_string(),
        supabase_public_url: "http://localhost:54321".to_string(),
        supabase_anon_key: "anon".to_string(),
        supabase_service_role_key: "service".to_string(),
        app_key: ROOT_KEY.to_string(),
        admin_base_url: "http://localhost:3000".to_string(),
        api_base_url: "http://localhost:8080".to_string(),
        landing_base_url: "http://localhost:3001".to_string(),
        environment: "test".to_string(),
        sentry_dsn: None,
        port: 8080,
    }
}

/// Full application wired against in-memory fakes.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryRoleStore>,
    pub auth: Arc<FakeAuthApi>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryRoleStore::new());
        let auth = Arc::new(FakeAuthApi::new());
        let config = test_config();
        let cookie_policy =
            CookiePolicy::from_environment(&config.environment, &config.admin_base_url);

        let router = build_router(AppState {
            config: Arc::new(config),
            store: store.clone(),
            auth: auth.clone(),
            cookie_policy,
        });

        Self {
            router,
            store,
            auth,
        }
    }

    /// Register a confirmed account with a role record and an active
    /// session, returning (user id, session cookie header value).
    pub fn login_as(&self, email: &str, role: UserRole) -> (Uuid, String) {
        let user_id = self.auth.add_user(email, "password-123", true);
        self.store.insert(user_id, role);
        let session = self.auth.issue_session(user_id);
        let cookie = format!(
            "sb-access-token={}; sb-refresh-token={}",
            session.access_token, session.refresh_token
        );
        (user_id, cookie)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: Value,
        cookie: Option<&str>,
        authorization: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn assert_rpc_error(response: Response<Body>, status: StatusCode, code: &str) -> Value {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], code, "body: {body}");
    assert_eq!(body["error"]["httpStatus"], status.as_u16(), "body: {body}");
    body
}
