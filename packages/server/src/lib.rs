// Admin backend - API core
//
// This crate provides the backend worker behind the admin dashboard: the
// typed RPC procedures under /api/trpc, the email/password auth flow
// endpoints under /api/auth, and the session refresh middleware that keeps
// provider-issued cookies alive across requests.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
