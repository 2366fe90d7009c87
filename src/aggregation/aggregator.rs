use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::Instrument;
use crate::aggregation::comparison::ComparisonResult;
use crate::aggregation::snapshot::SnapshotResult;
use crate::error::{Error, Result};
use crate::observability::tracing::{trace_compare, trace_read, trace_watch};
use crate::quote_infra::cache::QuoteCache;
use crate::quote_infra::connectors::QuoteConnector;
use crate::record::ValidationError;
use crate::types::{Symbol, WatcherAddress};
use crate::watch::WatchRegistry;

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum WatchOutcome {
    Snapshot(SnapshotResult),
    Comparison(ComparisonResult),
}

/// Answers read, watch and compare requests on top of the quote cache and the
/// watch registry.
pub struct Aggregator {
    cache: QuoteCache,
    registry: RwLock<WatchRegistry>,
}

impl Aggregator {
    pub fn new(cache: QuoteCache) -> Self {
        Aggregator {
            cache,
            registry: RwLock::new(WatchRegistry::new()),
        }
    }

    pub fn with_connector(connector: Arc<dyn QuoteConnector>) -> Self {
        Self::new(QuoteCache::new(connector))
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    /// Detached copy of the registry; later registrations do not show up in it.
    pub async fn registry(&self) -> WatchRegistry {
        self.registry.read().await.clone()
    }

    /// Latest quote for `symbol` with its current watchers.
    pub async fn read(&self, symbol: &str) -> Result<SnapshotResult> {
        async {
            let symbol = Symbol::parse(symbol)?;
            self.read_symbol(&symbol).await
        }
        .instrument(trace_read(symbol))
        .await
    }

    /// Registers `address` as a watcher of each symbol, in order.
    ///
    /// Symbols and address are validated before anything is registered, including
    /// the distinctness of the compared pair. Each symbol is then read before it is
    /// registered; a failing read stops the loop and earlier registrations stay in
    /// place. More than one symbol returns the comparison of the first two,
    /// otherwise a fresh snapshot.
    pub async fn watch<S: AsRef<str>>(&self, symbols: &[S], address: &str) -> Result<WatchOutcome> {
        async {
            if symbols.is_empty() {
                return Err(Error::from(ValidationError::single(
                    "WatchRequest",
                    "symbols",
                    "at least one symbol is required",
                )));
            }
            WatcherAddress::parse(address)?;

            let parsed = symbols
                .iter()
                .map(|raw| Symbol::parse(raw.as_ref()))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            if parsed.len() > 1 && parsed[0] == parsed[1] {
                return Err(Error::DuplicateSymbol(parsed[0].to_string()));
            }

            for symbol in &parsed {
                let quote = self.cache.get_or_fetch(symbol).await?;
                self.registry.write().await.add(quote, address)?;
            }

            if symbols.len() > 1 {
                Ok(WatchOutcome::Comparison(self.compare(symbols).await?))
            } else {
                Ok(WatchOutcome::Snapshot(self.read(symbols[0].as_ref()).await?))
            }
        }
        .instrument(trace_watch(address))
        .await
    }

    /// Reads the first two symbols concurrently and pairs them. Extra symbols are
    /// ignored.
    pub async fn compare<S: AsRef<str>>(&self, symbols: &[S]) -> Result<ComparisonResult> {
        let requested: Vec<&str> = symbols.iter().take(2).map(AsRef::as_ref).collect();

        async {
            if requested.len() < 2 {
                return Err(Error::from(ValidationError::single(
                    "CompareRequest",
                    "symbols",
                    format!("two symbols are required, got {}", requested.len()),
                )));
            }

            let first = Symbol::parse(requested[0])?;
            let second = Symbol::parse(requested[1])?;
            if first == second {
                return Err(Error::DuplicateSymbol(first.to_string()));
            }

            let (a, b) = tokio::try_join!(self.read_symbol(&first), self.read_symbol(&second))?;
            ComparisonResult::new(vec![(first.to_string(), a), (second.to_string(), b)])
        }
        .instrument(trace_compare(&requested))
        .await
    }

    async fn read_symbol(&self, symbol: &Symbol) -> Result<SnapshotResult> {
        let quote = self.cache.get_or_fetch(symbol).await?;
        let registry = self.registry.read().await;
        Ok(SnapshotResult::single(quote, &registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote_infra::connectors::fixture::{FixtureConnector, FixtureFailure};
    use serde_json::json;

    fn connector() -> Arc<FixtureConnector> {
        Arc::new(
            FixtureConnector::new()
                .with_quote(json!({"symbol": "DIS", "latestPrice": 100.0, "volume": 500}))
                .with_quote(json!({"symbol": "NKE", "latestPrice": 90.0, "volume": 800}))
                .with_quote(json!({"symbol": "AAPL", "latestPrice": 180.0}))
                .with_failure("DOWN", FixtureFailure::Connection("reset by peer".to_string())),
        )
    }

    #[tokio::test]
    async fn read_fetches_once_then_hits_cache() {
        let connector = connector();
        let aggregator = Aggregator::with_connector(connector.clone());

        let first = aggregator.read("dis").await.unwrap();
        let second = aggregator.read("DIS").await.unwrap();

        assert!(Arc::ptr_eq(first.quote().unwrap(), second.quote().unwrap()));
        assert_eq!(first.watcher_count(), 0);
        assert_eq!(connector.fetch_count("DIS"), 1);
    }

    #[tokio::test]
    async fn malformed_symbol_fails_before_transport() {
        let connector = connector();
        let aggregator = Aggregator::with_connector(connector.clone());

        let err = aggregator.read("ZZZZZZZ").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(connector.total_fetches(), 0);

        let err = aggregator.read("ZZZZ").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(connector.fetch_count("ZZZZ"), 1);
    }

    #[tokio::test]
    async fn single_watch_returns_updated_snapshot() {
        let aggregator = Aggregator::with_connector(connector());

        let outcome = aggregator.watch(&["DIS"], "10.0.0.1").await.unwrap();
        let WatchOutcome::Snapshot(snapshot) = outcome else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.watcher_count(), 1);
        assert_eq!(snapshot.watchers()[0].address().as_str(), "10.0.0.1");
    }

    #[tokio::test]
    async fn multi_watch_returns_comparison() {
        let aggregator = Aggregator::with_connector(connector());
        aggregator.watch(&["DIS"], "10.0.0.9").await.unwrap();

        let outcome = aggregator.watch(&["DIS", "NKE", "AAPL"], "10.0.0.1").await.unwrap();
        let WatchOutcome::Comparison(result) = outcome else {
            panic!("expected a comparison");
        };
        assert_eq!(result.names().collect::<Vec<_>>(), vec!["DIS", "NKE"]);

        let comparison = result.comparison().unwrap();
        assert_eq!(comparison.watchers["DIS"], -1);
        assert_eq!(comparison.watchers["NKE"], 1);

        // Every listed symbol was registered, not only the compared two
        let registry = aggregator.registry().await;
        let entry = registry.search(None, Some(&WatcherAddress::parse("10.0.0.1").unwrap()));
        assert_eq!(entry[0].stock().len(), 3);
    }

    #[tokio::test]
    async fn failed_symbol_keeps_earlier_registrations() {
        let aggregator = Aggregator::with_connector(connector());

        let err = aggregator.watch(&["DIS", "DOWN", "NKE"], "10.0.0.1").await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));

        let registry = aggregator.registry().await;
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.items()[0].stock().len(), 1);
        assert_eq!(registry.items()[0].stock()[0].symbol().as_str(), "DIS");
    }

    #[tokio::test]
    async fn watch_rejects_bad_input() {
        let connector = connector();
        let aggregator = Aggregator::with_connector(connector.clone());

        let empty: [&str; 0] = [];
        assert!(matches!(aggregator.watch(&empty, "10.0.0.1").await, Err(Error::Validation(_))));
        assert!(matches!(aggregator.watch(&["DIS"], "no such host!").await, Err(Error::Validation(_))));
        assert!(aggregator.registry().await.is_empty());
        assert_eq!(connector.total_fetches(), 0);
    }

    #[tokio::test]
    async fn duplicate_pair_is_rejected_before_registration() {
        let connector = connector();
        let aggregator = Aggregator::with_connector(connector.clone());

        let err = aggregator.watch(&["DIS", "dis"], "10.0.0.1").await.unwrap_err();
        assert!(matches!(err, Error::DuplicateSymbol(s) if s == "DIS"));
        assert!(aggregator.registry().await.is_empty());
        assert_eq!(connector.total_fetches(), 0);
    }

    #[tokio::test]
    async fn malformed_later_symbol_is_rejected_before_registration() {
        let aggregator = Aggregator::with_connector(connector());

        let err = aggregator.watch(&["DIS", "NKE", "TOOLONG"], "10.0.0.1").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(aggregator.registry().await.is_empty());
    }

    #[tokio::test]
    async fn registry_copy_is_detached() {
        let aggregator = Aggregator::with_connector(connector());
        let before = aggregator.registry().await;

        aggregator.watch(&["DIS"], "10.0.0.1").await.unwrap();
        assert!(before.is_empty());
        assert_eq!(aggregator.registry().await.len(), 1);
    }

    #[tokio::test]
    async fn compare_diffs_prices_and_ignores_extra_symbols() {
        let connector = connector();
        let aggregator = Aggregator::with_connector(connector.clone());

        let result = aggregator.compare(&["DIS", "NKE", "AAPL"]).await.unwrap();
        let comparison = result.comparison().unwrap();

        assert_eq!(comparison.stocks["DIS"]["latestPrice"], -10.0);
        assert_eq!(comparison.stocks["NKE"]["latestPrice"], 10.0);
        assert_eq!(comparison.stocks["DIS"]["volume"], 300.0);
        assert_eq!(connector.fetch_count("AAPL"), 0);
    }

    #[tokio::test]
    async fn compare_needs_two_distinct_symbols() {
        let aggregator = Aggregator::with_connector(connector());

        assert!(matches!(aggregator.compare(&["DIS"]).await, Err(Error::Validation(_))));
        assert!(matches!(aggregator.compare(&["DIS", "dis"]).await, Err(Error::DuplicateSymbol(_))));
    }

    #[tokio::test]
    async fn compare_fails_if_either_read_fails() {
        let aggregator = Aggregator::with_connector(connector());
        let err = aggregator.compare(&["DIS", "DOWN"]).await.unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }
}
