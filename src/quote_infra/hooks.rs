use std::sync::Arc;
use crate::quote_infra::quote::Quote;
use crate::types::Symbol;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOrigin {
    CacheHit,
    Fetched,
}

/// Runs once after every successful `get_or_fetch`, hit or miss.
pub trait FetchHook: Send + Sync {
    fn on_quote(&self, symbol: &Symbol, quote: &Arc<Quote>, origin: FetchOrigin);
}

impl<F> FetchHook for F
where
    F: Fn(&Symbol, &Arc<Quote>, FetchOrigin) + Send + Sync,
{
    fn on_quote(&self, symbol: &Symbol, quote: &Arc<Quote>, origin: FetchOrigin) {
        self(symbol, quote, origin)
    }
}

/// Runs after an eviction; its return value becomes the result of `evict`.
/// The entry is already gone when the hook runs.
pub trait EvictionHook: Send + Sync {
    fn on_evict(&self, symbol: &Symbol, removed: Option<&Arc<Quote>>) -> bool;
}

impl<F> EvictionHook for F
where
    F: Fn(&Symbol, Option<&Arc<Quote>>) -> bool + Send + Sync,
{
    fn on_evict(&self, symbol: &Symbol, removed: Option<&Arc<Quote>>) -> bool {
        self(symbol, removed)
    }
}
