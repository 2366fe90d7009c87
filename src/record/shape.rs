use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use crate::record::{FieldViolation, ValidationError};
use crate::types::{Symbol, WatcherAddress};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Symbol,
    Address,
    /// Real number >= 0.
    NonNegativeNumber,
    /// Any real number.
    Number,
    /// Epoch milliseconds, RFC 3339, or "Month D, YYYY".
    Timestamp,
}

impl FieldKind {
    /// Checks `value` against this kind and returns its canonical form.
    pub fn check(&self, value: &Value) -> Result<Value, String> {
        match self {
            FieldKind::Symbol => {
                let raw = value.as_str().ok_or_else(|| "expected a string".to_string())?;
                Symbol::normalize(raw).map(Value::String)
            }
            FieldKind::Address => {
                let raw = value.as_str().ok_or_else(|| "expected a string".to_string())?;
                WatcherAddress::normalize(raw).map(Value::String)
            }
            FieldKind::NonNegativeNumber => {
                let number = value.as_f64().ok_or_else(|| "expected a number".to_string())?;
                if number < 0.0 {
                    return Err(format!("must be >= 0, got {}", number));
                }
                Ok(value.clone())
            }
            FieldKind::Number => {
                value.as_f64().ok_or_else(|| "expected a number".to_string())?;
                Ok(value.clone())
            }
            FieldKind::Timestamp => parse_timestamp_millis(value).map(Value::from),
        }
    }
}

fn parse_timestamp_millis(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| format!("timestamp {} out of range", n)),
        Value::String(s) => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
                return Ok(parsed.timestamp_millis());
            }
            NaiveDate::parse_from_str(s, "%B %d, %Y")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().timestamp_millis())
                .ok_or_else(|| format!("unrecognised timestamp '{}'", s))
        }
        _ => Err("expected a timestamp".to_string()),
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Required fields must be present and non-null; optional ones accept null.
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        FieldSpec { name, kind, required: true }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        FieldSpec { name, kind, required: false }
    }
}

#[derive(Debug)]
pub struct Shape {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
    pub allow_unknown: bool,
}

impl Shape {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validates `bag` and returns it in canonical form. Collects every violation
    /// rather than stopping at the first.
    pub fn validate(&self, mut bag: Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        let mut violations = Vec::new();
        let mut validated = Map::new();

        for spec in self.fields {
            match bag.remove(spec.name) {
                None | Some(Value::Null) if spec.required => violations.push(FieldViolation {
                    field: spec.name.to_string(),
                    reason: "missing required field".to_string(),
                }),
                None => {}
                Some(Value::Null) => {
                    validated.insert(spec.name.to_string(), Value::Null);
                }
                Some(value) => match spec.kind.check(&value) {
                    Ok(canonical) => {
                        validated.insert(spec.name.to_string(), canonical);
                    }
                    Err(reason) => violations.push(FieldViolation {
                        field: spec.name.to_string(),
                        reason,
                    }),
                },
            }
        }

        // Whatever is left was not declared
        for (name, value) in bag {
            if self.allow_unknown {
                validated.insert(name, value);
            } else {
                violations.push(FieldViolation {
                    field: name,
                    reason: "unknown field".to_string(),
                });
            }
        }

        if violations.is_empty() {
            Ok(validated)
        } else {
            Err(ValidationError { record: self.name, violations })
        }
    }
}
