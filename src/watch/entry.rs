use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use crate::quote_infra::quote::Quote;
use crate::record::{FieldKind, FieldSpec, Shape, ValidatedRecord, ValidationError};
use crate::types::{Symbol, WatcherAddress};

pub static WATCH_ENTRY_SHAPE: Shape = Shape {
    name: "WatchEntry",
    fields: &[FieldSpec::required("address", FieldKind::Address)],
    allow_unknown: false,
};

/// One address and the quotes it has watched, in watch order.
#[derive(Clone, Debug, Serialize)]
pub struct WatchEntry {
    address: WatcherAddress,
    stock: Vec<Arc<Quote>>,
}

impl WatchEntry {
    pub fn new(address: &str, quote: Arc<Quote>) -> Result<Self, ValidationError> {
        let mut bag = Map::new();
        bag.insert("address".to_string(), Value::String(address.to_string()));
        let record = ValidatedRecord::strict(bag, &WATCH_ENTRY_SHAPE)?;

        let address = record
            .get_str("address")
            .map(WatcherAddress::parse)
            .transpose()?
            .ok_or_else(|| ValidationError::single("WatchEntry", "address", "missing required field"))?;

        Ok(WatchEntry {
            address,
            stock: vec![quote],
        })
    }

    pub(crate) fn push(&mut self, quote: Arc<Quote>) {
        self.stock.push(quote);
    }

    pub fn address(&self) -> &WatcherAddress {
        &self.address
    }

    pub fn stock(&self) -> &[Arc<Quote>] {
        &self.stock
    }

    pub fn watches_symbol(&self, symbol: &Symbol) -> bool {
        self.stock.iter().any(|q| q.symbol() == symbol)
    }

    /// True if this exact quote instance is in the stock list.
    pub fn holds_quote(&self, quote: &Arc<Quote>) -> bool {
        self.stock.iter().any(|q| Arc::ptr_eq(q, quote))
    }
}
