use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Maps string keys to ordered sequences of values.
///
/// Keys keep their first insertion order. A key is present exactly when its sequence is
/// non-empty: removing the last value of a key removes the key itself. Single-value reads
/// ([`get`](Self::get)) see the most recently stored value; [`get_all`](Self::get_all) sees the
/// whole history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMultiMap<V> {
    entries: IndexMap<String, Vec<V>>,
}

impl<V> Default for OrderedMultiMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> OrderedMultiMap<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of values stored under `key`; zero when absent.
    #[must_use]
    pub fn length(&self, key: &str) -> usize {
        self.entries.get(key).map_or(0, Vec::len)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All values, grouped by key in key insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[V])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Appends `value` to the sequence of `key`.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        self.entries.entry(key.into()).or_default().push(value);
    }

    /// Inserts `value` at `index` of the sequence of `key`, shifting later values.
    pub fn add_at(&mut self, key: impl Into<String>, value: V, index: usize) -> Result<()> {
        let key = key.into();
        let len = self.length(&key);
        if index > len {
            return Err(Error::out_of_range(&key, index, len));
        }

        self.entries.entry(key).or_default().insert(index, value);
        Ok(())
    }

    /// The most recently stored value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key).and_then(|values| values.last())
    }

    pub fn get_at(&self, key: &str, index: usize) -> Result<&V> {
        let values = self.entries.get(key).map_or(&[][..], Vec::as_slice);
        values
            .get(index)
            .ok_or_else(|| Error::out_of_range(key, index, values.len()))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key).and_then(|values| values.last_mut())
    }

    pub fn get_mut_at(&mut self, key: &str, index: usize) -> Result<&mut V> {
        let len = self.length(key);
        self.entries
            .get_mut(key)
            .and_then(|values| values.get_mut(index))
            .ok_or_else(|| Error::out_of_range(key, index, len))
    }

    /// Every value of `key` in insertion order; empty when absent.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[V] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }

    /// Replaces the last value of `key`, or adds it when `key` is absent.
    pub fn put(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.entries.get_mut(&key).and_then(|values| values.last_mut()) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.add(key, value);
                None
            }
        }
    }

    pub fn put_at(&mut self, key: &str, value: V, index: usize) -> Result<V> {
        let slot = self.get_mut_at(key, index)?;
        Ok(std::mem::replace(slot, value))
    }

    /// Replaces the whole sequence of `key`. An empty `values` removes the key.
    pub fn put_all(&mut self, key: impl Into<String>, values: Vec<V>) -> Option<Vec<V>> {
        let key = key.into();
        if values.is_empty() {
            return self.remove(&key);
        }

        match self.entries.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, values)),
            None => {
                self.entries.insert(key, values);
                None
            }
        }
    }

    /// Removes `key` together with all of its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<V>> {
        self.entries.shift_remove(key)
    }

    /// Removes the value at `index`; the key disappears with its last value.
    pub fn remove_at(&mut self, key: &str, index: usize) -> Result<V> {
        let len = self.length(key);
        let Some(values) = self.entries.get_mut(key).filter(|_| index < len) else {
            return Err(Error::out_of_range(key, index, len));
        };

        let value = values.remove(index);
        if values.is_empty() {
            _ = self.entries.shift_remove(key);
        }

        Ok(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMultiMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.add(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_last_value() {
        let mut map = OrderedMultiMap::new();
        map.add("key", 1);
        map.add("key", 2);

        assert_eq!(map.get("key"), Some(&2));
        assert_eq!(map.get_all("key"), &[1, 2]);
        assert_eq!(map.length("key"), 2);
    }

    #[test]
    fn keys_keep_insertion_order() {
        let map: OrderedMultiMap<i32> = [("b", 1), ("a", 2), ("b", 3), ("c", 4)]
            .into_iter()
            .collect();

        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(map.values().copied().collect::<Vec<_>>(), [1, 3, 2, 4]);
    }

    #[test]
    fn removing_last_value_removes_key() {
        let mut map = OrderedMultiMap::new();
        map.add("key", "a");
        map.add("key", "b");

        assert_eq!(map.remove_at("key", 1).expect("index 1 exists"), "b");
        assert!(map.contains_key("key"));
        assert_eq!(map.remove_at("key", 0).expect("index 0 exists"), "a");
        assert!(!map.contains_key("key"));
        assert_eq!(map.length("key"), 0);
        assert!(map.is_empty());
    }

    #[test]
    fn indexed_access_is_bounds_checked() {
        let mut map = OrderedMultiMap::new();
        map.add("key", 'x');

        assert!(matches!(
            map.get_at("key", 1),
            Err(Error::IndexOutOfRange { index: 1, len: 1, .. })
        ));
        assert!(map.put_at("key", 'y', 3).is_err());
        assert!(map.remove_at("missing", 0).is_err());
        assert!(map.add_at("key", 'z', 2).is_err());
        assert_eq!(map.get_all("key"), &['x']);
    }

    #[test]
    fn put_replaces_last_or_adds() {
        let mut map = OrderedMultiMap::new();
        assert_eq!(map.put("key", 1), None);
        map.add("key", 2);
        assert_eq!(map.put("key", 3), Some(2));
        assert_eq!(map.get_all("key"), &[1, 3]);

        assert_eq!(map.put_at("key", 0, 0).expect("index 0 exists"), 1);
        map.add_at("key", 9, 1).expect("index 1 is within bounds");
        assert_eq!(map.get_all("key"), &[0, 9, 3]);
    }

    #[test]
    fn put_all_with_no_values_removes_key() {
        let mut map = OrderedMultiMap::new();
        map.add("key", 1);
        map.add("other", 2);

        assert_eq!(map.put_all("key", vec![]), Some(vec![1]));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["other"]);
    }
}
