//! RPC procedure handlers for the typed bridge.
//!
//! Each handler runs its guard first, then its input checks, then touches
//! the store. Responses use the `{"result":{"data":...}}` envelope.

use axum::extract::{Extension, Query};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domains::users::{UserData, UserRole};
use crate::server::context::RequestContext;
use crate::server::rpc::guards::{require_admin, require_root};
use crate::server::rpc::{ok_envelope, RpcError};

#[derive(Debug, Deserialize)]
pub struct HelloInput {
    pub name: Option<String>,
}

/// Public smoke-test procedure; no guard.
pub async fn hello_handler(Query(input): Query<HelloInput>) -> Json<Value> {
    let name = input.name.as_deref().unwrap_or("world");
    ok_envelope(json!({
        "greeting": format!("Hello, {name}!"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserRoleInput {
    pub user_id: String,
    pub role: i32,
}

/// Set a user's role. Root key only; the target row must already exist.
pub async fn set_user_role_handler(
    Extension(ctx): Extension<RequestContext>,
    headers: HeaderMap,
    Json(input): Json<SetUserRoleInput>,
) -> Result<Json<Value>, RpcError> {
    require_root(&headers, &ctx.config)?;

    let user_id = Uuid::parse_str(&input.user_id)
        .map_err(|_| RpcError::bad_request("Invalid user ID format"))?;
    let role = UserRole::try_from(input.role)
        .map_err(|value| RpcError::bad_request(format!("Invalid role value: {value}")))?;

    // Resolve the row first so a missing user reads as NOT_FOUND rather
    // than a silent no-op update.
    ctx.store
        .get(user_id)
        .await
        .map_err(|e| RpcError::internal("role lookup failed", e))?
        .ok_or_else(|| RpcError::not_found("User not found"))?;

    let updated = ctx
        .store
        .set_role(user_id, role)
        .await
        .map_err(|e| RpcError::internal("role update failed", e))?
        .ok_or_else(|| RpcError::not_found("User not found"))?;

    tracing::info!(user = %user_id, role = role.label(), "role changed by root");

    Ok(ok_envelope(json!({
        "success": true,
        "message": format!("User role updated to {}", role.label()),
        "user": UserData::from(updated),
    })))
}

#[derive(Debug, Deserialize)]
pub struct GetAllUsersInput {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// List role records, admins first. Admin sessions only.
pub async fn get_all_users_handler(
    Extension(ctx): Extension<RequestContext>,
    Query(input): Query<GetAllUsersInput>,
) -> Result<Json<Value>, RpcError> {
    require_admin(&ctx).await?;

    if !(1..=100).contains(&input.limit) {
        return Err(RpcError::bad_request("limit must be between 1 and 100"));
    }
    if input.offset < 0 {
        return Err(RpcError::bad_request("offset must be non-negative"));
    }

    let records = ctx
        .store
        .list(input.limit, input.offset)
        .await
        .map_err(|e| RpcError::internal("user listing failed", e))?;
    let total = ctx
        .store
        .count()
        .await
        .map_err(|e| RpcError::internal("user count failed", e))?;

    let users: Vec<UserData> = records.into_iter().map(UserData::from).collect();

    Ok(ok_envelope(json!({
        "users": users,
        "pagination": {
            "limit": input.limit,
            "offset": input.offset,
            "total": total,
        }
    })))
}
