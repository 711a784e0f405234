//! Authorization guards for RPC procedures.
//!
//! Three escalating levels; each procedure declares exactly one:
//! 1. `require_user` - a valid session whose role record exists.
//! 2. `require_admin` - (1) plus the Admin role.
//! 3. `require_root` - a static shared secret in the Authorization header,
//!    independent of any session.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::config::Config;
use crate::domains::users::{UserRecord, UserRole};
use crate::server::context::RequestContext;
use crate::server::middleware::AuthUser;
use crate::server::rpc::RpcError;

/// Require a valid session and its role record.
pub async fn require_user(ctx: &RequestContext) -> Result<(AuthUser, UserRecord), RpcError> {
    let user = ctx.auth_user.clone().ok_or_else(|| {
        RpcError::unauthorized("You must be logged in to access this resource")
    })?;

    let record = ctx
        .store
        .get(user.id)
        .await
        .map_err(|e| RpcError::internal("role record lookup failed", e))?
        .ok_or_else(|| RpcError::not_found("User record not found"))?;

    Ok((user, record))
}

/// Require a valid session with the Admin role.
pub async fn require_admin(ctx: &RequestContext) -> Result<(AuthUser, UserRecord), RpcError> {
    let user = ctx.auth_user.clone().ok_or_else(|| {
        RpcError::unauthorized("You must be logged in to access this resource")
    })?;

    let record = ctx
        .store
        .get(user.id)
        .await
        .map_err(|e| RpcError::internal("role record lookup failed", e))?;

    match record {
        Some(record) if record.role == UserRole::Admin => Ok((user, record)),
        _ => Err(RpcError::forbidden(
            "You must be an admin to access this resource",
        )),
    }
}

/// Require the static root key in the Authorization header, accepted with
/// or without a `Bearer ` prefix. Plain string equality; see DESIGN.md for
/// the open question on constant-time comparison.
pub fn require_root(headers: &HeaderMap, config: &Config) -> Result<(), RpcError> {
    let header = headers.get(AUTHORIZATION).ok_or_else(|| {
        RpcError::unauthorized("Authorization header is required for root access")
    })?;

    let value = header
        .to_str()
        .map_err(|_| RpcError::forbidden("Invalid root access key"))?;
    let key = value.strip_prefix("Bearer ").unwrap_or(value);

    if key.is_empty() || key != config.app_key {
        return Err(RpcError::forbidden("Invalid root access key"));
    }

    Ok(())
}
