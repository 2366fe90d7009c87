use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::record::ValidationError;

/// Ticker symbol: 1 to 6 characters, each an ASCII letter or a dot.
/// Stored uppercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub const MAX_LEN: usize = 6;

    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Self::normalize(value)
            .map(Symbol)
            .map_err(|reason| ValidationError::single("Symbol", "symbol", reason))
    }

    /// Returns the canonical form of `value`, or the reason it is rejected.
    pub(crate) fn normalize(value: &str) -> Result<String, String> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err("symbol cannot be empty".to_string());
        }

        let len = trimmed.chars().count();
        if len > Self::MAX_LEN {
            return Err(format!(
                "symbol '{}' is {} characters, max is {}",
                trimmed, len, Self::MAX_LEN
            ));
        }

        if !trimmed.chars().all(|c| c.is_ascii_alphabetic() || c == '.') {
            return Err(format!("symbol '{}' may only contain letters and dots", trimmed));
        }

        Ok(trimmed.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
