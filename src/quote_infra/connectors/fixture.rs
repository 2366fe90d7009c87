use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use crate::error::{Error, Result};
use crate::quote_infra::connectors::QuoteConnector;
use crate::quote_infra::quote::Quote;
use crate::types::Symbol;

#[derive(Clone, Debug, Deserialize)]
pub enum FixtureFailure {
    NotFound,
    Connection(String),
}

/// Serves quotes from raw JSON payloads held in memory.
///
/// Payloads are validated on every fetch, exactly like a remote response would be,
/// and every fetch is counted per symbol. Each fetch yields to the scheduler once so
/// concurrent fetches interleave.
#[derive(Debug, Default)]
pub struct FixtureConnector {
    payloads: HashMap<String, Value>,
    failures: HashMap<String, FixtureFailure>,
    fetch_counts: DashMap<String, usize>,
}

impl FixtureConnector {
    pub fn new() -> Self {
        FixtureConnector::default()
    }

    /// Registers a payload under its own `symbol` field. Payloads without a string
    /// `symbol` are skipped; use [`with_payload`](Self::with_payload) to key them.
    pub fn with_quote(self, payload: Value) -> Self {
        let key = match payload.get("symbol").and_then(Value::as_str) {
            Some(symbol) if !symbol.trim().is_empty() => symbol.to_string(),
            _ => {
                tracing::warn!("Skipping fixture payload without a symbol: {}", payload);
                return self;
            }
        };
        self.with_payload(&key, payload)
    }

    /// Registers a payload under `symbol`, whatever the payload itself says.
    pub fn with_payload(mut self, symbol: &str, payload: Value) -> Self {
        self.payloads.insert(symbol.trim().to_ascii_uppercase(), payload);
        self
    }

    pub fn with_failure(mut self, symbol: &str, failure: FixtureFailure) -> Self {
        self.failures.insert(symbol.trim().to_ascii_uppercase(), failure);
        self
    }

    /// Loads a JSON object of `symbol -> quote payload`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let payloads: Map<String, Value> = serde_json::from_str(&raw)
            .map_err(|e| Error::ConfigError(format!("invalid fixture file {}: {}", path.display(), e)))?;

        let connector = payloads
            .into_iter()
            .fold(FixtureConnector::new(), |c, (symbol, payload)| c.with_payload(&symbol, payload));

        tracing::info!("Loaded {} quote fixtures from {}", connector.payloads.len(), path.display());
        Ok(connector)
    }

    pub fn fetch_count(&self, symbol: &str) -> usize {
        self.fetch_counts
            .get(&symbol.to_ascii_uppercase())
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetch_counts.iter().map(|entry| *entry.value()).sum()
    }
}

#[async_trait]
impl QuoteConnector for FixtureConnector {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
        *self.fetch_counts.entry(symbol.to_string()).or_insert(0) += 1;
        tokio::task::yield_now().await;

        if let Some(failure) = self.failures.get(symbol.as_str()) {
            return Err(match failure {
                FixtureFailure::NotFound => Error::NotFound(symbol.to_string()),
                FixtureFailure::Connection(detail) => Error::Connection(detail.clone()),
            });
        }

        let payload = self.payloads
            .get(symbol.as_str())
            .cloned()
            .ok_or_else(|| Error::NotFound(symbol.to_string()))?;

        Quote::from_json(payload)
            .map_err(|e| Error::Connection(format!("unexpected quote payload for {}: {}", symbol, e)))
    }
}
