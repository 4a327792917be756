//! Logging setup for Tsudoi binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the hub library (`tsudoi_server`) and the binary itself.
/// `RUST_LOG` takes precedence when set.
///
/// # Examples
///
/// ```no_run
/// use tsudoi_shared::logger::setup_logger;
///
/// setup_logger("tsudoi-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "tsudoi_server={},{}={},tower_http={}",
                    default_log_level,
                    binary_name.replace('-', "_"),
                    default_log_level,
                    default_log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
