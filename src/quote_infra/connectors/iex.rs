use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use crate::error::{Error, Result};
use crate::quote_infra::connectors::QuoteConnector;
use crate::quote_infra::quote::Quote;
use crate::types::Symbol;

/// Connector for IEX-style quote endpoints (`GET {base}/v1/stock/{symbol}/quote`).
pub struct IexConnector {
    client: Client,
    base_url: String,
}

impl IexConnector {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("HTTP client setup failed: {}", e)))?;

        Ok(IexConnector {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn quote_url(&self, symbol: &Symbol) -> String {
        format!("{}/v1/stock/{}/quote", self.base_url, symbol.as_str().to_ascii_lowercase())
    }
}

#[async_trait]
impl QuoteConnector for IexConnector {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
        let url = self.quote_url(symbol);
        tracing::debug!("Fetching quote: {}", url);

        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Connection(format!("quote request for {} failed: {}", symbol, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(Error::Connection(format!(
                "quote endpoint returned {} for {}",
                status, symbol
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Connection(format!("unparseable quote payload for {}: {}", symbol, e)))?;

        match body {
            // The proxy answers unknown tickers with a bare JSON string
            Value::String(message) if is_unknown_symbol(&message) => {
                Err(Error::NotFound(symbol.to_string()))
            }
            Value::Object(bag) => Quote::from_fields(bag).map_err(|e| {
                Error::Connection(format!("unexpected quote payload for {}: {}", symbol, e))
            }),
            other => Err(Error::Connection(format!(
                "unexpected quote payload for {}: {}",
                symbol, other
            ))),
        }
    }
}

fn is_unknown_symbol(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("unknown symbol") || message.contains("invalid symbol") || message.contains("not found")
}
