use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::ConfigError(format!("invalid log level '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| Error::ConfigError(format!("tracing already initialised: {}", e)))
}

pub fn trace_read(symbol: &str) -> Span {
    tracing::info_span!(
        "read",
        symbol = %symbol,
    )
}

pub fn trace_watch(address: &str) -> Span {
    tracing::info_span!(
        "watch",
        address = %address,
    )
}

pub fn trace_compare(symbols: &[&str]) -> Span {
    tracing::info_span!(
        "compare",
        symbols = ?symbols,
    )
}
