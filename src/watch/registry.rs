use std::collections::BTreeSet;
use std::sync::Arc;
use crate::error::Result;
use crate::observability::metrics::WATCH_REGISTRATIONS;
use crate::quote_infra::quote::Quote;
use crate::types::{Symbol, WatcherAddress};
use crate::watch::entry::WatchEntry;

/// Stock filter for [`WatchRegistry::search`].
#[derive(Clone, Copy, Debug)]
pub enum StockRef<'a> {
    /// Matches entries holding this exact quote instance.
    Quote(&'a Arc<Quote>),
    /// Matches entries holding any quote with this symbol.
    Symbol(&'a Symbol),
}

impl StockRef<'_> {
    fn matches(&self, entry: &WatchEntry) -> bool {
        match self {
            StockRef::Quote(quote) => entry.holds_quote(quote),
            StockRef::Symbol(symbol) => entry.watches_symbol(symbol),
        }
    }
}

impl<'a> From<&'a Arc<Quote>> for StockRef<'a> {
    fn from(quote: &'a Arc<Quote>) -> Self {
        StockRef::Quote(quote)
    }
}

impl<'a> From<&'a Symbol> for StockRef<'a> {
    fn from(symbol: &'a Symbol) -> Self {
        StockRef::Symbol(symbol)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    Created,
    Appended,
    AlreadyWatching,
}

impl Registration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Registration::Created => "created",
            Registration::Appended => "appended",
            Registration::AlreadyWatching => "already_watching",
        }
    }
}

/// Watch entries in registration order, at most one per address.
#[derive(Clone, Debug, Default)]
pub struct WatchRegistry {
    entries: Vec<WatchEntry>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        WatchRegistry { entries: Vec::new() }
    }

    /// Entries matching every given filter; no filters returns everything.
    pub fn search(&self, stock: Option<StockRef<'_>>, address: Option<&WatcherAddress>) -> Vec<&WatchEntry> {
        self.entries
            .iter()
            .filter(|entry| stock.is_none_or(|s| s.matches(entry)))
            .filter(|entry| address.is_none_or(|a| entry.address() == a))
            .collect()
    }

    /// Records `address` as a watcher of `quote`.
    ///
    /// Watching a symbol the address already watches is a no-op. Otherwise the quote
    /// is appended to the address's entry, or a new entry is created.
    pub fn add(&mut self, quote: Arc<Quote>, address: &str) -> Result<Registration> {
        let address = WatcherAddress::parse(address)?;

        let outcome = if !self.search(Some(StockRef::Symbol(quote.symbol())), Some(&address)).is_empty() {
            Registration::AlreadyWatching
        } else if let Some(entry) = self.entries.iter_mut().find(|e| e.address() == &address) {
            entry.push(quote.clone());
            Registration::Appended
        } else {
            self.entries.push(WatchEntry::new(address.as_str(), quote.clone())?);
            Registration::Created
        };

        WATCH_REGISTRATIONS.with_label_values(&[outcome.as_str()]).inc();
        tracing::info!(
            address = %address,
            symbol = %quote.symbol(),
            outcome = outcome.as_str(),
            "Watch registered"
        );

        Ok(outcome)
    }

    /// Drops the entry for `address`. Not used by the watch flow.
    pub fn remove(&mut self, address: &WatcherAddress) -> Option<WatchEntry> {
        let index = self.entries.iter().position(|e| e.address() == address)?;
        tracing::info!("Watch entry removed: {}", address);
        Some(self.entries.remove(index))
    }

    pub fn items(&self) -> Vec<&WatchEntry> {
        self.search(None, None)
    }

    pub fn addresses(&self) -> BTreeSet<&WatcherAddress> {
        self.entries.iter().map(WatchEntry::address).collect()
    }

    /// Distinct quote instances across all entries, in first-seen order.
    pub fn stocks(&self) -> Vec<Arc<Quote>> {
        let mut stocks: Vec<Arc<Quote>> = Vec::new();
        for quote in self.entries.iter().flat_map(|e| e.stock()) {
            if !stocks.iter().any(|seen| Arc::ptr_eq(seen, quote)) {
                stocks.push(Arc::clone(quote));
            }
        }
        stocks
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn quote(symbol: &str) -> Arc<Quote> {
        Arc::new(Quote::from_json(json!({"symbol": symbol, "latestPrice": 10.0})).unwrap())
    }

    fn addr(s: &str) -> WatcherAddress {
        WatcherAddress::parse(s).unwrap()
    }

    #[test]
    fn repeated_watch_is_idempotent() {
        let mut registry = WatchRegistry::new();
        let dis = quote("DIS");

        assert_eq!(registry.add(dis.clone(), "10.0.0.1").unwrap(), Registration::Created);
        assert_eq!(registry.add(dis.clone(), "10.0.0.1").unwrap(), Registration::AlreadyWatching);

        let found = registry.search(Some((&dis).into()), Some(&addr("10.0.0.1")));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].stock().len(), 1);
    }

    #[test]
    fn same_symbol_from_a_new_instance_is_still_a_duplicate() {
        let mut registry = WatchRegistry::new();
        registry.add(quote("DIS"), "10.0.0.1").unwrap();
        assert_eq!(registry.add(quote("DIS"), "10.0.0.1").unwrap(), Registration::AlreadyWatching);
        assert_eq!(registry.items()[0].stock().len(), 1);
    }

    #[test]
    fn one_entry_per_address() {
        let mut registry = WatchRegistry::new();
        registry.add(quote("DIS"), "1.2.3.4").unwrap();
        assert_eq!(registry.add(quote("NKE"), "1.2.3.4").unwrap(), Registration::Appended);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.addresses().len(), 1);
        assert_eq!(registry.items()[0].stock().len(), 2);
    }

    #[test]
    fn rejects_invalid_address() {
        let mut registry = WatchRegistry::new();
        let err = registry.add(quote("DIS"), "not valid").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn search_filters_combine() {
        let mut registry = WatchRegistry::new();
        let dis = quote("DIS");
        let nke = quote("NKE");
        registry.add(dis.clone(), "10.0.0.1").unwrap();
        registry.add(nke.clone(), "10.0.0.2").unwrap();
        registry.add(dis.clone(), "10.0.0.2").unwrap();

        assert_eq!(registry.search(None, None).len(), 2);
        assert_eq!(registry.search(Some(StockRef::Symbol(dis.symbol())), None).len(), 2);
        assert_eq!(registry.search(Some(StockRef::Quote(&nke)), None).len(), 1);
        assert_eq!(registry.search(None, Some(&addr("10.0.0.1"))).len(), 1);
        assert!(registry
            .search(Some(StockRef::Symbol(nke.symbol())), Some(&addr("10.0.0.1")))
            .is_empty());
    }

    #[test]
    fn identity_filter_ignores_equal_copies() {
        let mut registry = WatchRegistry::new();
        let dis = quote("DIS");
        registry.add(dis.clone(), "10.0.0.1").unwrap();

        let other = quote("DIS");
        assert!(registry.search(Some(StockRef::Quote(&other)), None).is_empty());
        assert_eq!(registry.search(Some(StockRef::Symbol(other.symbol())), None).len(), 1);
    }

    #[test]
    fn stocks_are_distinct_instances() {
        let mut registry = WatchRegistry::new();
        let dis = quote("DIS");
        let nke = quote("NKE");
        registry.add(dis.clone(), "10.0.0.1").unwrap();
        registry.add(dis.clone(), "10.0.0.2").unwrap();
        registry.add(nke.clone(), "10.0.0.2").unwrap();

        let stocks = registry.stocks();
        assert_eq!(stocks.len(), 2);
        assert!(Arc::ptr_eq(&stocks[0], &dis));
        assert!(Arc::ptr_eq(&stocks[1], &nke));
    }

    #[test]
    fn remove_drops_entry() {
        let mut registry = WatchRegistry::new();
        registry.add(quote("DIS"), "10.0.0.1").unwrap();
        registry.add(quote("DIS"), "10.0.0.2").unwrap();

        let removed = registry.remove(&addr("10.0.0.1")).unwrap();
        assert_eq!(removed.address().as_str(), "10.0.0.1");
        assert_eq!(registry.len(), 1);
        assert!(registry.remove(&addr("10.0.0.1")).is_none());
    }
}
