//! Ordered key → value-or-miss map returned by multi-key lookups.

use std::collections::HashMap;

/// Result of a multi-key lookup.
///
/// Every requested key is present, in request order; a miss is stored as
/// `None`, never dropped. A key requested twice keeps its first position and
/// the last slot's value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueMap<V = Vec<u8>> {
    entries: Vec<(String, Option<V>)>,
    index: HashMap<String, usize>,
}

impl<V> Default for ValueMap<V> {
    fn default() -> Self {
        ValueMap {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> ValueMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ValueMap {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Record the slot for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<V>) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// The cached value for `key`; `None` on a miss or if `key` was not requested.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.slot(key).and_then(Option::as_ref)
    }

    /// The raw slot for `key`: `Some(None)` is a miss.
    pub fn slot(&self, key: &str) -> Option<&Option<V>> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// True when `key` was requested, hit or miss.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// True when `key` was requested and missed.
    pub fn is_miss(&self, key: &str) -> bool {
        matches!(self.slot(key), Some(None))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of requested keys that were found.
    pub fn hits(&self) -> usize {
        self.entries.iter().filter(|(_, v)| v.is_some()).count()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&V>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Convert every hit, keeping keys, order and misses. Stops at the first error.
    pub fn try_map<U, E>(
        self,
        mut f: impl FnMut(&str, V) -> Result<U, E>,
    ) -> Result<ValueMap<U>, E> {
        let mut mapped = ValueMap::with_capacity(self.entries.len());
        for (key, value) in self.entries {
            let value = match value {
                Some(v) => Some(f(&key, v)?),
                None => None,
            };
            mapped.insert(key, value);
        }
        Ok(mapped)
    }
}

impl<V> IntoIterator for ValueMap<V> {
    type Item = (String, Option<V>);
    type IntoIter = std::vec::IntoIter<(String, Option<V>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V> FromIterator<(String, Option<V>)> for ValueMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, Option<V>)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misses_are_kept_in_order() {
        let mut map = ValueMap::new();
        map.insert("k1", Some(1));
        map.insert("k2", None);
        map.insert("k3", Some(3));

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["k1", "k2", "k3"]);
        assert_eq!(map.get("k1"), Some(&1));
        assert_eq!(map.get("k2"), None);
        assert!(map.is_miss("k2"));
        assert!(map.contains_key("k2"));
        assert!(!map.contains_key("k4"));
        assert!(!map.is_miss("k4"));
        assert_eq!(map.hits(), 2);
    }

    #[test]
    fn test_duplicate_key_keeps_first_position() {
        let map: ValueMap<u8> = vec![
            ("a".to_string(), Some(1)),
            ("b".to_string(), None),
            ("a".to_string(), Some(2)),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&2));
    }

    #[test]
    fn test_try_map() {
        let mut map = ValueMap::new();
        map.insert("n", Some("42".to_string()));
        map.insert("m", None);

        let parsed = map
            .clone()
            .try_map(|_, v| v.parse::<u32>())
            .expect("parse");
        assert_eq!(parsed.get("n"), Some(&42));
        assert!(parsed.is_miss("m"));

        map.insert("bad", Some("x".to_string()));
        assert!(map.try_map(|_, v| v.parse::<u32>()).is_err());
    }
}
