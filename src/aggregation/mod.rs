pub mod aggregator;
pub mod comparison;
pub mod snapshot;

pub use aggregator::{Aggregator, WatchOutcome};
pub use comparison::{Comparison, ComparisonResult};
pub use snapshot::{QuoteSet, SnapshotResult};
