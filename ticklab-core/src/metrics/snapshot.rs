//! Flat key/value view of all metric outputs at the current tick.

use serde::Serialize;
use std::collections::HashMap;

/// A snapshot value: numeric, or the categorical session label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SnapshotValue {
    Num(f64),
    Label(&'static str),
}

impl SnapshotValue {
    /// Numeric view; labels read as NaN so predicates treat them as false.
    pub fn as_num(self) -> f64 {
        match self {
            SnapshotValue::Num(v) => v,
            SnapshotValue::Label(_) => f64::NAN,
        }
    }
}

/// The metric snapshot, rebuilt in place each tick.
///
/// Owned by the metrics manager; readers must treat it as valid only
/// between the current update and the next.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    values: HashMap<String, SnapshotValue>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a numeric field. Allocates the key only on first
    /// insertion; steady-state publishing updates in place.
    pub fn set_num(&mut self, key: &str, value: f64) {
        match self.values.get_mut(key) {
            Some(slot) => *slot = SnapshotValue::Num(value),
            None => {
                self.values.insert(key.to_string(), SnapshotValue::Num(value));
            }
        }
    }

    /// Insert or refresh a categorical field.
    pub fn set_label(&mut self, key: &str, value: &'static str) {
        match self.values.get_mut(key) {
            Some(slot) => *slot = SnapshotValue::Label(value),
            None => {
                self.values.insert(key.to_string(), SnapshotValue::Label(value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<SnapshotValue> {
        self.values.get(key).copied()
    }

    /// Numeric lookup: missing keys and labels read as NaN.
    pub fn num(&self, key: &str) -> f64 {
        self.get(key).map_or(f64::NAN, SnapshotValue::as_num)
    }

    /// Label lookup: `None` for missing or numeric keys.
    pub fn label(&self, key: &str) -> Option<&'static str> {
        match self.get(key) {
            Some(SnapshotValue::Label(label)) => Some(label),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
