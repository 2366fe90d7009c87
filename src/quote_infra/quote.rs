use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use crate::record::{FieldKind, FieldSpec, Shape, ValidatedRecord, ValidationError};
use crate::types::Symbol;

pub static QUOTE_SHAPE: Shape = Shape {
    name: "Quote",
    fields: &[
        FieldSpec::required("symbol", FieldKind::Symbol),
        FieldSpec::optional("latestPrice", FieldKind::NonNegativeNumber),
        FieldSpec::optional("open", FieldKind::NonNegativeNumber),
        FieldSpec::optional("high", FieldKind::NonNegativeNumber),
        FieldSpec::optional("low", FieldKind::NonNegativeNumber),
        FieldSpec::optional("close", FieldKind::NonNegativeNumber),
        FieldSpec::optional("previousClose", FieldKind::NonNegativeNumber),
        FieldSpec::optional("change", FieldKind::Number),
        FieldSpec::optional("changePercent", FieldKind::Number),
        FieldSpec::optional("volume", FieldKind::NonNegativeNumber),
        FieldSpec::optional("latestVolume", FieldKind::NonNegativeNumber),
        FieldSpec::optional("latestTime", FieldKind::Timestamp),
    ],
    allow_unknown: true,
};

/// Market data for one symbol, validated once at construction and never mutated.
///
/// Payload fields outside the declared shape are kept in `extra` and serialized
/// back alongside the known ones.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    symbol: Symbol,
    latest_price: Option<f64>,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    previous_close: Option<f64>,
    change: Option<f64>,
    change_percent: Option<f64>,
    volume: Option<f64>,
    latest_volume: Option<f64>,
    latest_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Quote {
    pub fn from_fields(bag: Map<String, Value>) -> Result<Self, ValidationError> {
        let record = ValidatedRecord::strict(bag, &QUOTE_SHAPE)?;

        let symbol = record
            .get_str("symbol")
            .map(Symbol::parse)
            .transpose()?
            .ok_or_else(|| ValidationError::single("Quote", "symbol", "missing required field"))?;

        let latest_time = match record.get_i64("latestTime") {
            Some(millis) => Some(DateTime::from_timestamp_millis(millis).ok_or_else(|| {
                ValidationError::single("Quote", "latestTime", format!("timestamp {} out of range", millis))
            })?),
            None => None,
        };

        let mut quote = Quote {
            symbol,
            latest_price: record.get_f64("latestPrice"),
            open: record.get_f64("open"),
            high: record.get_f64("high"),
            low: record.get_f64("low"),
            close: record.get_f64("close"),
            previous_close: record.get_f64("previousClose"),
            change: record.get_f64("change"),
            change_percent: record.get_f64("changePercent"),
            volume: record.get_f64("volume"),
            latest_volume: record.get_f64("latestVolume"),
            latest_time,
            extra: Map::new(),
        };

        quote.extra = record
            .into_fields()
            .into_iter()
            .filter(|(name, _)| QUOTE_SHAPE.field(name).is_none())
            .collect();

        Ok(quote)
    }

    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(bag) => Self::from_fields(bag),
            other => Err(ValidationError::single(
                "Quote",
                "$",
                format!("expected an object, got {}", json_type_name(&other)),
            )),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn latest_price(&self) -> Option<f64> {
        self.latest_price
    }

    pub fn open(&self) -> Option<f64> {
        self.open
    }

    pub fn high(&self) -> Option<f64> {
        self.high
    }

    pub fn low(&self) -> Option<f64> {
        self.low
    }

    pub fn close(&self) -> Option<f64> {
        self.close
    }

    pub fn previous_close(&self) -> Option<f64> {
        self.previous_close
    }

    pub fn change(&self) -> Option<f64> {
        self.change
    }

    pub fn change_percent(&self) -> Option<f64> {
        self.change_percent
    }

    pub fn volume(&self) -> Option<f64> {
        self.volume
    }

    pub fn latest_volume(&self) -> Option<f64> {
        self.latest_volume
    }

    pub fn latest_time(&self) -> Option<DateTime<Utc>> {
        self.latest_time
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Every numeric or temporal field that has a value, keyed by wire name.
    /// Timestamps are reported as epoch milliseconds.
    pub fn numeric_fields(&self) -> BTreeMap<String, f64> {
        let known = [
            ("latestPrice", self.latest_price),
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("previousClose", self.previous_close),
            ("change", self.change),
            ("changePercent", self.change_percent),
            ("volume", self.volume),
            ("latestVolume", self.latest_volume),
            ("latestTime", self.latest_time.map(|t| t.timestamp_millis() as f64)),
        ];

        let mut fields: BTreeMap<String, f64> = known
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
            .collect();

        for (name, value) in &self.extra {
            if let Some(v) = value.as_f64() {
                fields.insert(name.clone(), v);
            }
        }

        fields
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
