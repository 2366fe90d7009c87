use dashmap::DashMap;
use std::sync::Arc;
use crate::error::Result;
use crate::observability::metrics::{
    QUOTE_CACHE_EVICTIONS, QUOTE_CACHE_HITS, QUOTE_CACHE_MISSES, QUOTE_FETCH_FAILURES,
    QUOTE_FETCH_LATENCY,
};
use crate::quote_infra::connectors::QuoteConnector;
use crate::quote_infra::hooks::{EvictionHook, FetchHook, FetchOrigin};
use crate::quote_infra::quote::Quote;
use crate::types::Symbol;

/// Symbol -> Quote cache in front of a [`QuoteConnector`].
///
/// Unbounded and without expiry: a symbol fetched once is served from memory until it
/// is evicted. Concurrent misses for the same symbol are not coalesced; each one goes
/// to the transport and the last insert wins.
pub struct QuoteCache {
    quotes: DashMap<Symbol, Arc<Quote>>,
    connector: Arc<dyn QuoteConnector>,
    fetch_hook: Option<Arc<dyn FetchHook>>,
    eviction_hook: Option<Arc<dyn EvictionHook>>,
}

impl QuoteCache {
    pub fn new(connector: Arc<dyn QuoteConnector>) -> Self {
        QuoteCache {
            quotes: DashMap::new(),
            connector,
            fetch_hook: None,
            eviction_hook: None,
        }
    }

    pub fn with_fetch_hook(mut self, hook: impl FetchHook + 'static) -> Self {
        self.fetch_hook = Some(Arc::new(hook));
        self
    }

    pub fn with_eviction_hook(mut self, hook: impl EvictionHook + 'static) -> Self {
        self.eviction_hook = Some(Arc::new(hook));
        self
    }

    pub async fn get_or_fetch(&self, symbol: &Symbol) -> Result<Arc<Quote>> {
        // Clone out so no map guard is held across the fetch
        let cached = self.quotes.get(symbol).map(|entry| Arc::clone(entry.value()));
        if let Some(quote) = cached {
            QUOTE_CACHE_HITS.inc();
            tracing::debug!("Quote cache hit: {}", symbol);
            self.notify_fetch(symbol, &quote, FetchOrigin::CacheHit);
            return Ok(quote);
        }

        QUOTE_CACHE_MISSES.inc();
        let timer = QUOTE_FETCH_LATENCY.start_timer();
        let fetched = self.connector.fetch_quote(symbol).await;
        timer.observe_duration();

        let quote = match fetched {
            Ok(quote) => Arc::new(quote),
            Err(e) => {
                QUOTE_FETCH_FAILURES.with_label_values(&[e.kind()]).inc();
                tracing::warn!("Quote fetch failed for {}: {}", symbol, e);
                return Err(e);
            }
        };

        if quote.symbol() != symbol {
            tracing::debug!("Transport returned {} for requested {}", quote.symbol(), symbol);
        }

        // Keyed by the requested symbol, not the echoed one
        self.quotes.insert(symbol.clone(), Arc::clone(&quote));
        tracing::info!("Quote cached: {}", symbol);

        self.notify_fetch(symbol, &quote, FetchOrigin::Fetched);
        Ok(quote)
    }

    /// Removes `symbol` from the cache. Returns `true`, or the eviction hook's verdict
    /// when one is installed. The removal happens either way.
    pub fn evict(&self, symbol: &Symbol) -> bool {
        let removed = self.quotes.remove(symbol).map(|(_, quote)| quote);
        if removed.is_some() {
            QUOTE_CACHE_EVICTIONS.inc();
            tracing::info!("Quote evicted: {}", symbol);
        }

        match &self.eviction_hook {
            Some(hook) => hook.on_evict(symbol, removed.as_ref()),
            None => true,
        }
    }

    /// Cached quote for `symbol`, without fetching.
    pub fn get(&self, symbol: &Symbol) -> Option<Arc<Quote>> {
        self.quotes.get(symbol).map(|entry| Arc::clone(entry.value()))
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.quotes.iter().map(|entry| entry.key().clone()).collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    fn notify_fetch(&self, symbol: &Symbol, quote: &Arc<Quote>, origin: FetchOrigin) {
        if let Some(hook) = &self.fetch_hook {
            hook.on_quote(symbol, quote, origin);
        }
    }
}
