use std::sync::Arc;

use crate::config::Config;
use crate::domains::users::RoleStore;
use crate::server::middleware::AuthUser;

/// Per-request context handed to RPC procedures.
///
/// Built fresh for every request from the shared state plus whatever the
/// session middleware extracted; never persisted or shared across requests.
#[derive(Clone)]
pub struct RequestContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn RoleStore>,
    pub auth_user: Option<AuthUser>,
}
