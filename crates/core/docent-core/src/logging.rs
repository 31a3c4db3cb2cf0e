//! Logging setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global logging system
///
/// Respects `RUST_LOG` when set, otherwise `DOCENT_LOG_LEVEL` (default
/// `info`). Output goes to stderr so stdout stays clean for chat rendering.
pub fn init_logging() {
    let level = std::env::var("DOCENT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
