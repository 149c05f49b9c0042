//! Tracing initialization and subscriber setup.
//!
//! The subscriber is a registry with an [`EnvFilter`] and a compact `fmt`
//! layer writing to stderr. Stdout is left to the runtime's JSON protocol.

use crate::Config;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

/// Initializes the tracing subscriber.
///
/// # Parameters
///
/// * `config` - Configuration containing the `trace_level` option
///
/// # Trace Level Resolution
///
/// Level is determined by:
/// 1. `RUST_LOG` if set and valid
/// 2. `config.trace_level` if set
/// 3. Default: `"info"`
///
/// # Initialization Behavior
///
/// Idempotent: safe to call multiple times (only the first call takes effect),
/// which matters because tests initialize many states in one process.
///
/// # Example
///
/// ```rust
/// use hubshell::observability::init_tracing;
/// use hubshell::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| configured_filter(config));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr),
    );

    let _ = subscriber.try_init();
}

/// Filter built from the configuration alone; an unparsable level falls back to the default.
fn configured_filter(config: &Config) -> EnvFilter {
    let level = config.trace_level.as_deref().unwrap_or(DEFAULT_LEVEL);
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}
