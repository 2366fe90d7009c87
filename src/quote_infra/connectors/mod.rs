pub mod fixture;
pub mod iex;

use async_trait::async_trait;
use crate::error::Result;
use crate::quote_infra::quote::Quote;
use crate::types::Symbol;

/// Outbound quote transport.
///
/// Implementations fail with `Error::NotFound` when the remote side does not know the
/// symbol and with `Error::Connection` when the call fails or the payload is unusable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteConnector: Send + Sync {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote>;
}
