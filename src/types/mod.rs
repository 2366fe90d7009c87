pub mod address;
pub mod symbol;

pub use address::WatcherAddress;
pub use symbol::Symbol;
