pub mod error;
pub mod types;
pub mod record;
pub mod quote_infra;
pub mod watch;
pub mod aggregation;
pub mod config;
pub mod observability;
pub mod api;

pub use aggregation::{Aggregator, ComparisonResult, SnapshotResult, WatchOutcome};
pub use error::{Error, Result};
pub use quote_infra::{Quote, QuoteCache};
pub use watch::{WatchEntry, WatchRegistry};
