pub mod entry;
pub mod registry;

pub use entry::WatchEntry;
pub use registry::{Registration, StockRef, WatchRegistry};
