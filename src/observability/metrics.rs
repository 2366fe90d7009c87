use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Once;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Cache metrics
    pub static ref QUOTE_CACHE_HITS: IntCounter = IntCounter::new(
        "quote_cache_hits_total",
        "Quote reads served from cache"
    ).unwrap();

    pub static ref QUOTE_CACHE_MISSES: IntCounter = IntCounter::new(
        "quote_cache_misses_total",
        "Quote reads that went to the transport"
    ).unwrap();

    pub static ref QUOTE_CACHE_EVICTIONS: IntCounter = IntCounter::new(
        "quote_cache_evictions_total",
        "Cached quotes removed by eviction"
    ).unwrap();

    // Transport metrics
    pub static ref QUOTE_FETCH_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("quote_fetch_failures_total", "Failed quote fetches by error kind"),
        &["kind"]
    ).unwrap();

    pub static ref QUOTE_FETCH_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "quote_fetch_latency_seconds",
            "Quote transport latency"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])
    ).unwrap();

    // Watch metrics
    pub static ref WATCH_REGISTRATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("watch_registrations_total", "Watch registrations by outcome"),
        &["outcome"]
    ).unwrap();
}

static REGISTER: Once = Once::new();

/// Registers every collector with [`REGISTRY`]. Safe to call more than once.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(QUOTE_CACHE_HITS.clone()),
            Box::new(QUOTE_CACHE_MISSES.clone()),
            Box::new(QUOTE_CACHE_EVICTIONS.clone()),
            Box::new(QUOTE_FETCH_FAILURES.clone()),
            Box::new(QUOTE_FETCH_LATENCY.clone()),
            Box::new(WATCH_REGISTRATIONS.clone()),
        ];
        for collector in collectors {
            if let Err(e) = REGISTRY.register(collector) {
                tracing::warn!("Metric registration failed: {}", e);
            }
        }
    });
}

/// Renders the registry in the prometheus text format.
pub fn gather_metrics() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!("Metric encoding failed: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
