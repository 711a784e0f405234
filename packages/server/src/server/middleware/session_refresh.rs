use std::sync::Arc;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;
use uuid::Uuid;

use crate::common::cookies::CookiePolicy;
use crate::domains::auth::provider::{AuthApi, ProviderSession};
use crate::domains::auth::session::{append_session_cookies, read_session_cookies};

/// Authenticated user extracted from the session cookies.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Session refresh middleware.
///
/// Runs on every inbound request before any route logic: reads the session
/// cookies, validates the access token with the provider, and falls back to
/// the refresh token when validation fails. A refreshed session is written
/// back as `Set-Cookie` headers on the response.
///
/// This middleware never blocks a request. Any failure just leaves the
/// request anonymous. It must also always reach the provider validation
/// call when cookies are present; skipping it silently breaks session
/// continuity for the clients sharing these cookies.
pub async fn session_refresh_middleware(
    auth: Arc<dyn AuthApi>,
    policy: CookiePolicy,
    mut request: Request,
    next: Next,
) -> Response {
    let mut refreshed: Option<ProviderSession> = None;

    if let Some(tokens) = read_session_cookies(request.headers()) {
        match auth.get_user(&tokens.access_token).await {
            Ok(identity) => {
                debug!(user = %identity.id, "session valid");
                request.extensions_mut().insert(AuthUser {
                    id: identity.id,
                    email: identity.email,
                    access_token: tokens.access_token,
                    refresh_token: tokens.refresh_token,
                });
            }
            Err(err) => {
                debug!(error = %err, "access token rejected");
                if let Some(refresh_token) = tokens.refresh_token {
                    match auth.refresh_session(&refresh_token).await {
                        Ok(session) => {
                            debug!(user = %session.user.id, "session refreshed");
                            request.extensions_mut().insert(AuthUser {
                                id: session.user.id,
                                email: session.user.email.clone(),
                                access_token: session.access_token.clone(),
                                refresh_token: Some(session.refresh_token.clone()),
                            });
                            refreshed = Some(session);
                        }
                        Err(err) => {
                            debug!(error = %err, "session refresh failed, continuing anonymous");
                        }
                    }
                }
            }
        }
    }

    let mut response = next.run(request).await;

    if let Some(session) = refreshed {
        append_session_cookies(response.headers_mut(), &session, &policy);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::{HeaderValue, Request as HttpRequest, StatusCode};
    use axum::middleware;
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    use crate::domains::auth::fake::FakeAuthApi;

    async fn whoami(user: Option<Extension<AuthUser>>) -> String {
        match user {
            Some(Extension(user)) => user.id.to_string(),
            None => "anonymous".to_string(),
        }
    }

    fn app(auth: Arc<FakeAuthApi>) -> Router {
        let policy = CookiePolicy::from_environment("development", "http://localhost:3000");
        Router::new().route("/whoami", get(whoami)).layer(
            middleware::from_fn(move |req, next| {
                session_refresh_middleware(auth.clone(), policy.clone(), req, next)
            }),
        )
    }

    #[tokio::test]
    async fn valid_access_token_authenticates_request() {
        let auth = Arc::new(FakeAuthApi::new());
        let user_id = auth.add_user("a@b.com", "password-1", true);
        let session = auth.issue_session(user_id);

        let response = app(auth)
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(
                        COOKIE,
                        format!("sb-access-token={}", session.access_token),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[tokio::test]
    async fn expired_access_token_is_refreshed_and_cookies_rewritten() {
        let auth = Arc::new(FakeAuthApi::new());
        let user_id = auth.add_user("a@b.com", "password-1", true);
        let session = auth.issue_session(user_id);
        auth.expire_access_token(&session.access_token);

        let response = app(auth)
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(
                        COOKIE,
                        format!(
                            "sb-access-token={}; sb-refresh-token={}",
                            session.access_token, session.refresh_token
                        ),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let set_cookies: Vec<&HeaderValue> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(set_cookies.len(), 2, "expected refreshed cookie pair");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[tokio::test]
    async fn invalid_session_never_blocks_the_request() {
        let auth = Arc::new(FakeAuthApi::new());

        let response = app(auth)
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .header(COOKIE, "sb-access-token=garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, b"anonymous".as_ref());
    }

    #[tokio::test]
    async fn no_cookies_means_anonymous() {
        let auth = Arc::new(FakeAuthApi::new());
        let response = app(auth)
            .oneshot(
                HttpRequest::builder()
                    .uri("/whoami")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, b"anonymous".as_ref());
    }
}
