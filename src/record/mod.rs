//! Validated property bags.
//!
//! A [`ValidatedRecord`] is built from a JSON object and a declared [`Shape`]. Every
//! supplied field is checked against its [`FieldKind`] and stored in canonical form
//! (symbols uppercased, timestamps as epoch milliseconds). Concrete records such as
//! `Quote` and `WatchEntry` construct strictly; lenient construction yields an empty
//! record instead of an error.

pub mod shape;
pub mod validated;

pub use shape::{FieldKind, FieldSpec, Shape};
pub use validated::{Construction, ValidatedRecord};

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

/// Every field of a record that failed its constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    pub record: &'static str,
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn single(record: &'static str, field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError {
            record,
            violations: vec![FieldViolation {
                field: field.into(),
                reason: reason.into(),
            }],
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.field.as_str())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}", self.record)?;
        for (i, violation) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{} ({})", sep, violation.field, violation.reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
