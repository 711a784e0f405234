mod errors;

pub use errors::{AuthErrorKind, AuthUserError};
