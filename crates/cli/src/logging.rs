// Diagnostics (tracing) setup shared by the binaries
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map operator-style level names (DEBUG, WARNING, CRITICAL) to filter directives
pub fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" | "critical" | "fatal" => "error",
        "off" => "off",
        _ => "info",
    }
}

/// Install the global subscriber, writing to stderr
///
/// `RUST_LOG` wins over `level`. `format` picks the layout: `json`, `pretty`,
/// anything else is compact.
pub fn init_tracing(level: &str, format: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(normalize_level(level)));

    let registry = tracing_subscriber::registry().with(env_filter);

    // try_init: a second call (e.g. from tests) is not an error
    let _ = match format.trim().to_ascii_lowercase().as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        "pretty" => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };
}
