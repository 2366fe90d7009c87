use serde_json::{Map, Value};
use crate::record::{Shape, ValidationError};

/// What construction does when the bag fails its shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Construction {
    /// Fail with `ValidationError`.
    #[default]
    Strict,
    /// Yield an unpopulated record.
    Lenient,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedRecord {
    shape: &'static str,
    fields: Map<String, Value>,
}

impl ValidatedRecord {
    pub fn new(
        bag: Map<String, Value>,
        shape: &'static Shape,
        construction: Construction,
    ) -> Result<Self, ValidationError> {
        match shape.validate(bag) {
            Ok(fields) => Ok(ValidatedRecord { shape: shape.name, fields }),
            Err(e) if construction == Construction::Lenient => {
                tracing::debug!("Discarding invalid {} record: {}", shape.name, e);
                Ok(Self::empty(shape))
            }
            Err(e) => Err(e),
        }
    }

    pub fn strict(bag: Map<String, Value>, shape: &'static Shape) -> Result<Self, ValidationError> {
        Self::new(bag, shape, Construction::Strict)
    }

    pub fn empty(shape: &'static Shape) -> Self {
        ValidatedRecord {
            shape: shape.name,
            fields: Map::new(),
        }
    }

    pub fn shape_name(&self) -> &'static str {
        self.shape
    }

    pub fn is_populated(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Raw field value. Explicit nulls are returned as `Some(Value::Null)`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(Value::as_i64)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldKind, FieldSpec};
    use serde_json::json;

    static OPEN_SHAPE: Shape = Shape {
        name: "Open",
        fields: &[
            FieldSpec::required("address", FieldKind::Address),
            FieldSpec::optional("volume", FieldKind::NonNegativeNumber),
        ],
        allow_unknown: true,
    };

    fn bag(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn strict_construction_exposes_validated_fields() {
        let record = ValidatedRecord::strict(
            bag(json!({"address": "10.0.0.1", "volume": 12, "note": "kept"})),
            &OPEN_SHAPE,
        )
        .unwrap();
        assert!(record.is_populated());
        assert_eq!(record.shape_name(), "Open");
        assert_eq!(record.get_str("address"), Some("10.0.0.1"));
        assert_eq!(record.get_f64("volume"), Some(12.0));
        assert_eq!(record.get_str("note"), Some("kept"));
    }

    #[test]
    fn strict_construction_fails_on_bad_field() {
        let err = ValidatedRecord::strict(bag(json!({"address": "not an address"})), &OPEN_SHAPE)
            .unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["address"]);
    }

    #[test]
    fn lenient_construction_yields_empty_record() {
        let record = ValidatedRecord::new(
            bag(json!({"volume": -3})),
            &OPEN_SHAPE,
            Construction::Lenient,
        )
        .unwrap();
        assert!(!record.is_populated());
        assert_eq!(record, ValidatedRecord::empty(&OPEN_SHAPE));
    }
}
