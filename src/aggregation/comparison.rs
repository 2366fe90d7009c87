use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use crate::aggregation::snapshot::SnapshotResult;
use crate::error::{Error, Result};
use crate::record::ValidationError;

/// Relative differences, per entry name, against the other entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Comparison {
    /// Other entry's watcher count minus this entry's.
    pub watchers: BTreeMap<String, i64>,
    /// Other entry's field value minus this entry's, for fields numeric on both sides.
    pub stocks: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Named snapshots in request order. Diffs are computed on demand.
#[derive(Clone, Debug)]
pub struct ComparisonResult {
    entries: Vec<(String, SnapshotResult)>,
}

impl ComparisonResult {
    pub fn new(entries: Vec<(String, SnapshotResult)>) -> Result<Self> {
        if entries.len() < 2 {
            return Err(ValidationError::single(
                "ComparisonResult",
                "entries",
                format!("needs at least 2 entries, got {}", entries.len()),
            )
            .into());
        }

        for (i, (name, _)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(seen, _)| seen == name) {
                return Err(Error::DuplicateSymbol(name.clone()));
            }
        }

        Ok(ComparisonResult { entries })
    }

    pub fn entries(&self) -> &[(String, SnapshotResult)] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&SnapshotResult> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Diffs each entry against its partner. Only two-entry comparisons have a
    /// defined pairing; anything else is rejected.
    pub fn comparison(&self) -> Result<Comparison> {
        let n = self.entries.len();
        if n != 2 {
            return Err(Error::UnsupportedComparison(n));
        }

        let mut watchers = BTreeMap::new();
        let mut stocks = BTreeMap::new();

        for (i, (name, snapshot)) in self.entries.iter().enumerate() {
            let (_, partner) = &self.entries[n - 1 - i];

            let delta = partner.watcher_count() as i64 - snapshot.watcher_count() as i64;
            watchers.insert(name.clone(), delta);

            let own = snapshot.quotes().numeric_fields();
            let other = partner.quotes().numeric_fields();
            let fields: BTreeMap<String, f64> = own
                .iter()
                .filter_map(|(field, value)| other.get(field).map(|o| (field.clone(), o - value)))
                .collect();
            stocks.insert(name.clone(), fields);
        }

        Ok(Comparison { watchers, stocks })
    }
}

impl Serialize for ComparisonResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, snapshot) in &self.entries {
            map.serialize_entry(name, snapshot)?;
        }
        map.end()
    }
}
