pub mod app;
pub mod context;
pub mod middleware;
pub mod routes;
pub mod rpc;

pub use app::{build_app, build_router, AppState};
