use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use crate::quote_infra::quote::Quote;
use crate::types::Symbol;
use crate::watch::{StockRef, WatchEntry, WatchRegistry};

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum QuoteSet {
    Single(Arc<Quote>),
    Mapping(BTreeMap<Symbol, Arc<Quote>>),
}

impl QuoteSet {
    pub fn symbols(&self) -> Vec<&Symbol> {
        match self {
            QuoteSet::Single(quote) => vec![quote.symbol()],
            QuoteSet::Mapping(quotes) => quotes.keys().collect(),
        }
    }

    /// Numeric fields of the held quotes. Mapping fields are namespaced as
    /// `SYMBOL.field` so two mappings line up symbol by symbol.
    pub fn numeric_fields(&self) -> BTreeMap<String, f64> {
        match self {
            QuoteSet::Single(quote) => quote.numeric_fields(),
            QuoteSet::Mapping(quotes) => quotes
                .iter()
                .flat_map(|(symbol, quote)| {
                    quote
                        .numeric_fields()
                        .into_iter()
                        .map(move |(field, value)| (format!("{}.{}", symbol, field), value))
                })
                .collect(),
        }
    }
}

/// Quote(s) plus the watchers tracking them, captured at read time.
#[derive(Clone, Debug, Serialize)]
pub struct SnapshotResult {
    quotes: QuoteSet,
    watchers: Vec<WatchEntry>,
}

impl SnapshotResult {
    pub fn single(quote: Arc<Quote>, registry: &WatchRegistry) -> Self {
        let watchers = registry
            .search(Some(StockRef::Symbol(quote.symbol())), None)
            .into_iter()
            .cloned()
            .collect();

        SnapshotResult {
            quotes: QuoteSet::Single(quote),
            watchers,
        }
    }

    /// Watchers are the entries tracking any of the mapped symbols.
    pub fn mapping(quotes: BTreeMap<Symbol, Arc<Quote>>, registry: &WatchRegistry) -> Self {
        let watchers = registry
            .items()
            .into_iter()
            .filter(|entry| quotes.values().any(|q| entry.watches_symbol(q.symbol())))
            .cloned()
            .collect();

        SnapshotResult {
            quotes: QuoteSet::Mapping(quotes),
            watchers,
        }
    }

    pub fn quotes(&self) -> &QuoteSet {
        &self.quotes
    }

    /// The quote of a single-quote snapshot.
    pub fn quote(&self) -> Option<&Arc<Quote>> {
        match &self.quotes {
            QuoteSet::Single(quote) => Some(quote),
            QuoteSet::Mapping(_) => None,
        }
    }

    pub fn watchers(&self) -> &[WatchEntry] {
        &self.watchers
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quote(symbol: &str, price: f64) -> Arc<Quote> {
        Arc::new(Quote::from_json(json!({"symbol": symbol, "latestPrice": price})).unwrap())
    }

    #[test]
    fn single_snapshot_collects_symbol_watchers() {
        let mut registry = WatchRegistry::new();
        let dis = quote("DIS", 100.0);
        registry.add(dis.clone(), "10.0.0.1").unwrap();
        registry.add(quote("NKE", 90.0), "10.0.0.2").unwrap();

        let snapshot = SnapshotResult::single(dis.clone(), &registry);
        assert_eq!(snapshot.watcher_count(), 1);
        assert_eq!(snapshot.watchers()[0].address().as_str(), "10.0.0.1");
        assert!(Arc::ptr_eq(snapshot.quote().unwrap(), &dis));
    }

    #[test]
    fn snapshot_is_detached_from_later_registrations() {
        let mut registry = WatchRegistry::new();
        let dis = quote("DIS", 100.0);
        let snapshot = SnapshotResult::single(dis.clone(), &registry);

        registry.add(dis, "10.0.0.1").unwrap();
        assert_eq!(snapshot.watcher_count(), 0);
    }

    #[test]
    fn mapping_snapshot_namespaces_fields() {
        let mut registry = WatchRegistry::new();
        let dis = quote("DIS", 100.0);
        let nke = quote("NKE", 90.0);
        registry.add(dis.clone(), "10.0.0.1").unwrap();
        registry.add(nke.clone(), "10.0.0.2").unwrap();
        registry.add(quote("AAPL", 1.0), "10.0.0.3").unwrap();

        let quotes = BTreeMap::from([(dis.symbol().clone(), dis), (nke.symbol().clone(), nke)]);
        let snapshot = SnapshotResult::mapping(quotes, &registry);

        assert_eq!(snapshot.watcher_count(), 2);
        assert!(snapshot.quote().is_none());
        let fields = snapshot.quotes().numeric_fields();
        assert_eq!(fields["DIS.latestPrice"], 100.0);
        assert_eq!(fields["NKE.latestPrice"], 90.0);
        assert_eq!(snapshot.quotes().symbols().len(), 2);
    }
}
