use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize logging. Safe to call more than once; only the first call
/// installs the subscriber.
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}
