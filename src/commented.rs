use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use crate::error::Result;
use crate::multimap::OrderedMultiMap;

/// Kind of auxiliary text attached to a key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Comment,
    /// Original typed encoding of a registry value, e.g. `REG_DWORD`.
    Type,
    Other(String),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment => "comment".fmt(f),
            Self::Type => "type".fmt(f),
            Self::Other(name) => name.fmt(f),
        }
    }
}

/// An [`OrderedMultiMap`] with per-key metadata kept apart from the values.
///
/// Metadata lives in a side table keyed by `(key, category)`, so every category of a key sorts
/// next to the others and can be dropped in one range walk when the key goes away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentedMultiMap<V> {
    map: OrderedMultiMap<V>,
    meta: BTreeMap<(String, Category), String>,
}

impl<V> Default for CommentedMultiMap<V> {
    fn default() -> Self {
        Self {
            map: OrderedMultiMap::new(),
            meta: BTreeMap::new(),
        }
    }
}

impl<V> Deref for CommentedMultiMap<V> {
    type Target = OrderedMultiMap<V>;

    fn deref(&self) -> &Self::Target {
        &self.map
    }
}

impl<V> CommentedMultiMap<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: V) {
        self.map.add(key, value);
    }

    pub fn add_at(&mut self, key: impl Into<String>, value: V, index: usize) -> Result<()> {
        self.map.add_at(key, value, index)
    }

    pub fn put(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.map.put(key, value)
    }

    pub fn put_at(&mut self, key: &str, value: V, index: usize) -> Result<V> {
        self.map.put_at(key, value, index)
    }

    pub fn put_all(&mut self, key: impl Into<String>, values: Vec<V>) -> Option<Vec<V>> {
        let key = key.into();
        if values.is_empty() {
            return self.remove(&key);
        }
        self.map.put_all(key, values)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    pub fn get_mut_at(&mut self, key: &str, index: usize) -> Result<&mut V> {
        self.map.get_mut_at(key, index)
    }

    /// Removes `key`, its values and all of its metadata.
    pub fn remove(&mut self, key: &str) -> Option<Vec<V>> {
        let removed = self.map.remove(key);
        if removed.is_some() {
            self.remove_all_meta(key);
        }
        removed
    }

    pub fn remove_at(&mut self, key: &str, index: usize) -> Result<V> {
        let value = self.map.remove_at(key, index)?;
        if !self.map.contains_key(key) {
            self.remove_all_meta(key);
        }
        Ok(value)
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.meta.clear();
    }

    #[must_use]
    pub fn comment(&self, key: &str) -> Option<&str> {
        self.meta(key, &Category::Comment)
    }

    pub fn put_comment(
        &mut self,
        key: impl Into<String>,
        comment: impl Into<String>,
    ) -> Option<String> {
        self.put_meta(key, Category::Comment, comment)
    }

    pub fn remove_comment(&mut self, key: &str) -> Option<String> {
        self.remove_meta(key, Category::Comment)
    }

    #[must_use]
    pub fn meta(&self, key: &str, category: &Category) -> Option<&str> {
        self.meta
            .get(&(key.to_owned(), category.clone()))
            .map(String::as_str)
    }

    /// Attaches `text` to `key`. Metadata only lives alongside values, so an absent key
    /// stores nothing.
    pub fn put_meta(
        &mut self,
        key: impl Into<String>,
        category: Category,
        text: impl Into<String>,
    ) -> Option<String> {
        let key = key.into();
        if !self.map.contains_key(&key) {
            return None;
        }
        self.meta.insert((key, category), text.into())
    }

    pub fn remove_meta(&mut self, key: &str, category: Category) -> Option<String> {
        self.meta.remove(&(key.to_owned(), category))
    }

    fn remove_all_meta(&mut self, key: &str) {
        // `Comment` is the smallest category, so the range starts at the first entry of `key`.
        let doomed = self
            .meta
            .range((key.to_owned(), Category::Comment)..)
            .take_while(|((k, _), _)| k == key)
            .map(|(k, _)| k.clone())
            .collect::<Vec<_>>();

        for k in doomed {
            _ = self.meta.remove(&k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_independent_of_values() {
        let mut map = CommentedMultiMap::new();
        map.add("key", 1);
        map.put_comment("key", "about key");
        map.put_meta("key", Category::Type, "REG_DWORD");

        assert_eq!(map.comment("key"), Some("about key"));
        assert_eq!(map.meta("key", &Category::Type), Some("REG_DWORD"));
        assert_eq!(map.get("key"), Some(&1));

        map.put("key", 2);
        assert_eq!(map.comment("key"), Some("about key"));
    }

    #[test]
    fn removing_key_drops_every_category() {
        let mut map = CommentedMultiMap::new();
        map.add("a", 1);
        map.add("ab", 2);
        map.put_comment("a", "first");
        map.put_meta("a", Category::Type, "REG_SZ");
        map.put_meta("a", Category::Other("note".to_owned()), "x");
        map.put_comment("ab", "second");

        map.remove("a");

        assert_eq!(map.comment("a"), None);
        assert_eq!(map.meta("a", &Category::Type), None);
        assert_eq!(map.comment("ab"), Some("second"));
    }

    #[test]
    fn removing_last_value_drops_comment() {
        let mut map = CommentedMultiMap::new();
        map.add("key", 'a');
        map.add("key", 'b');
        map.put_comment("key", "kept while values remain");

        map.remove_at("key", 0).expect("index 0 exists");
        assert!(map.comment("key").is_some());

        map.remove_at("key", 0).expect("index 0 exists");
        assert_eq!(map.comment("key"), None);
    }

    #[test]
    fn metadata_needs_a_key() {
        let mut map = CommentedMultiMap::<u8>::new();
        map.put_meta("ghost", Category::Type, "REG_MULTI_SZ");
        map.put_comment("ghost", "nothing to attach to");

        assert_eq!(map.meta("ghost", &Category::Type), None);
        assert_eq!(map.comment("ghost"), None);

        map.add("ghost", 1);
        assert_eq!(map.meta("ghost", &Category::Type), None);
    }
}
