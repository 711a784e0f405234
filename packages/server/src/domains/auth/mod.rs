pub mod fake;
pub mod flows;
pub mod provider;
pub mod session;
pub mod validation;

pub use provider::{AuthApi, AuthOutcome, Identity, ProviderError, ProviderSession};
