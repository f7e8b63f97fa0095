//! Ordered map type for QSON objects.
//!
//! [`QsonMap`] wraps [`IndexMap`] so that object entries keep their insertion
//! order. Order matters here: QSON objects re-encode deterministically, and
//! the query-string layer spreads object keys over parameters in the order
//! they were inserted.
//!
//! ```rust
//! use qson::{QsonMap, Value};
//!
//! let mut map = QsonMap::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["name", "age"]);
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;

/// An insertion-ordered map of string keys to QSON values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QsonMap(IndexMap<String, crate::Value>);

impl QsonMap {
    /// Creates an empty `QsonMap`.
    #[must_use]
    pub fn new() -> Self {
        QsonMap(IndexMap::new())
    }

    /// Creates an empty `QsonMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        QsonMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, returning the previous value for the key if
    /// there was one. An existing key keeps its position.
    pub fn insert(&mut self, key: String, value: crate::Value) -> Option<crate::Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value for the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&crate::Value> {
        self.0.get(key)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, crate::Value> {
        self.0.keys()
    }

    /// Iterates over the values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, crate::Value> {
        self.0.values()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, crate::Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, crate::Value>> for QsonMap {
    fn from(map: HashMap<String, crate::Value>) -> Self {
        QsonMap(map.into_iter().collect())
    }
}

impl From<QsonMap> for HashMap<String, crate::Value> {
    fn from(map: QsonMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for QsonMap {
    type Item = (String, crate::Value);
    type IntoIter = indexmap::map::IntoIter<String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a QsonMap {
    type Item = (&'a String, &'a crate::Value);
    type IntoIter = indexmap::map::Iter<'a, String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, crate::Value)> for QsonMap {
    fn from_iter<T: IntoIterator<Item = (String, crate::Value)>>(iter: T) -> Self {
        QsonMap(IndexMap::from_iter(iter))
    }
}
