pub mod cache;
pub mod connectors;
pub mod hooks;
pub mod quote;

pub use cache::QuoteCache;
pub use hooks::{EvictionHook, FetchHook, FetchOrigin};
pub use quote::Quote;
