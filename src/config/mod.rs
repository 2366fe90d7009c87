use std::sync::Arc;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::quote_infra::connectors::fixture::FixtureConnector;
use crate::quote_infra::connectors::iex::IexConnector;
use crate::quote_infra::connectors::QuoteConnector;

pub mod loader;

pub use loader::AppConfig;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Iex,
    Fixture,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    pub kind: TransportKind,
    pub base_url: String,
    pub timeout_ms: u64,
    /// JSON file of quote payloads, required when `kind = "fixture"`.
    pub fixtures_path: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            kind: TransportKind::Iex,
            base_url: "https://stock-price-checker-proxy.freecodecamp.rocks".to_string(),
            timeout_ms: 5_000,
            fixtures_path: None,
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Builds the connector selected by `kind`.
    pub fn connector(&self) -> Result<Arc<dyn QuoteConnector>> {
        match self.kind {
            TransportKind::Iex => Ok(Arc::new(IexConnector::new(&self.base_url, self.timeout())?)),
            TransportKind::Fixture => {
                let path = self.fixtures_path.as_deref().ok_or_else(|| {
                    Error::ConfigError("transport.fixtures_path is required for the fixture transport".to_string())
                })?;
                Ok(Arc::new(FixtureConnector::from_json_file(path)?))
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}
