//! Application setup and router construction.

use std::sync::Arc;

use axum::{
    extract::{Extension, Request},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::common::cookies::CookiePolicy;
use crate::config::Config;
use crate::domains::auth::provider::{AuthApi, SupabaseAuthProvider};
use crate::domains::users::{PostgresRoleStore, RoleStore};
use crate::server::context::RequestContext;
use crate::server::middleware::{session_refresh_middleware, AuthUser};
use crate::server::routes::{
    get_all_users_handler, health_handler, hello_handler, login_handler, resend_handler,
    reset_handler, set_user_role_handler, signup_handler, update_password_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn RoleStore>,
    pub auth: Arc<dyn AuthApi>,
    pub cookie_policy: CookiePolicy,
}

/// Middleware to create a RequestContext per request.
async fn create_request_context(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Populated earlier by the session refresh middleware, when present.
    let auth_user = request.extensions().get::<AuthUser>().cloned();

    let context = RequestContext {
        config: state.config.clone(),
        store: state.store.clone(),
        auth_user,
    };
    request.extensions_mut().insert(context);

    next.run(request).await
}

/// Build the Axum router around an already-assembled state.
///
/// Split out from [`build_app`] so tests can wire in fakes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let auth_for_middleware = state.auth.clone();
    let policy_for_middleware = state.cookie_policy.clone();

    Router::new()
        // RPC procedures
        .route("/api/trpc/example.hello", get(hello_handler))
        .route("/api/trpc/userAdmin.getAllUsers", get(get_all_users_handler))
        .route("/api/trpc/userAdmin.setUserRole", post(set_user_role_handler))
        // Auth flow endpoints
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/signup", post(signup_handler))
        .route("/api/auth/reset", post(reset_handler))
        .route("/api/auth/update-password", post(update_password_handler))
        .route("/api/auth/resend", post(resend_handler))
        // Health check
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(create_request_context))
        .layer(middleware::from_fn(move |req, next| {
            session_refresh_middleware(
                auth_for_middleware.clone(),
                policy_for_middleware.clone(),
                req,
                next,
            )
        }))
        .layer(Extension(state)) // Shared state (must be after middlewares that need it)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build the application with production dependencies.
pub fn build_app(config: Config, pool: PgPool) -> Router {
    let cookie_policy =
        CookiePolicy::from_environment(&config.environment, &config.admin_base_url);
    let auth: Arc<dyn AuthApi> = Arc::new(SupabaseAuthProvider::from_config(&config));
    let store: Arc<dyn RoleStore> = Arc::new(PostgresRoleStore::new(pool));

    build_router(AppState {
        config: Arc::new(config),
        store,
        auth,
        cookie_policy,
    })
}
