mod session_refresh;

pub use session_refresh::{session_refresh_middleware, AuthUser};
