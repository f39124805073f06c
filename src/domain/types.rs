//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - passed between the selector, the classifier and the exporters
//! - written to SQLite / CSV / JSON
//! - reloaded later for inspection

use std::path::PathBuf;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// An insertion-ordered map keyed by column name.
///
/// Iteration order is the order in which keys were first inserted. The
/// classifier depends on this: training columns are tried in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap<V> {
    entries: Vec<(String, V)>,
}

/// Training column → chosen ideal column.
pub type SelectionMap = ColumnMap<String>;

/// Training column → max absolute deviation from its chosen ideal column.
pub type MaxDeviationMap = ColumnMap<f64>;

impl<V> ColumnMap<V> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for ColumnMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for ColumnMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for ColumnMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Outcome for a single test observation.
///
/// `mapped_ideal`, `ideal_y` and `deviation` are all present or all absent.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassificationResult {
    pub x: f64,
    pub y_test: f64,
    pub mapped_ideal: Option<String>,
    pub ideal_y: Option<f64>,
    /// Signed residual `y_test - ideal_y`.
    pub deviation: Option<f64>,
}

impl ClassificationResult {
    pub fn matched(x: f64, y_test: f64, ideal: impl Into<String>, ideal_y: f64) -> Self {
        Self {
            x,
            y_test,
            mapped_ideal: Some(ideal.into()),
            ideal_y: Some(ideal_y),
            deviation: Some(y_test - ideal_y),
        }
    }

    pub fn unmatched(x: f64, y_test: f64) -> Self {
        Self {
            x,
            y_test,
            mapped_ideal: None,
            ideal_y: None,
            deviation: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.mapped_ideal.is_some()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus environment defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub train_path: PathBuf,
    pub ideal_path: PathBuf,
    pub test_path: PathBuf,
    /// SQLite database; `None` disables persistence.
    pub db_path: Option<PathBuf>,

    pub plot: bool,
    pub plot_dir: Option<PathBuf>,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_selection: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_map_keeps_insertion_order_on_replace() {
        let mut map: SelectionMap = ColumnMap::new();
        map.insert("y3", "y10".to_string());
        map.insert("y1", "y2".to_string());
        let old = map.insert("y3", "y7".to_string());

        assert_eq!(old.as_deref(), Some("y10"));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["y3", "y1"]);
        assert_eq!(map.get("y3").map(String::as_str), Some("y7"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn column_map_serializes_as_ordered_object() {
        let map: MaxDeviationMap = [("y2", 0.5), ("y1", 1.25)].into_iter().collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"y2":0.5,"y1":1.25}"#);
    }

    #[test]
    fn matched_result_carries_signed_deviation() {
        let r = ClassificationResult::matched(1.0, 10.0, "y1", 12.5);
        assert!(r.is_matched());
        assert_eq!(r.deviation, Some(-2.5));

        let u = ClassificationResult::unmatched(1.0, 10.0);
        assert!(!u.is_matched());
        assert_eq!(u.ideal_y, None);
    }
}
