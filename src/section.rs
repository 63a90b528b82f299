use std::ops::{Deref, DerefMut};

use regex::Regex;

use crate::error::{Error, Result};
use crate::option_map::OptionMap;

/// A named group of options and a node of the profile tree.
///
/// The tree is implied by the name: `"a/b"` is a child of `"a"` when `/` is the path separator.
/// A section stores no links to its parent or children; [`crate::Profile`] and
/// [`crate::SectionRef`] compute them from section names on demand.
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    separator: char,
    /// Matches the names of immediate children only.
    child_pattern: Regex,
    options: OptionMap,
}

impl Section {
    pub(crate) fn new(name: impl Into<String>, separator: char) -> Result<Self> {
        let name = name.into();
        let pattern = format!(
            "^{}{}[^{}]+$",
            regex::escape(&name),
            regex::escape(&separator.to_string()),
            regex::escape(&separator.to_string()),
        );
        let child_pattern = Regex::new(&pattern)
            .map_err(|e| Error::InvalidArgument(format!("section name {name:?}: {e}")))?;

        Ok(Self {
            name,
            separator,
            child_pattern,
            options: OptionMap::new(),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The last path segment of the name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit_once(self.separator)
            .map_or(self.name.as_str(), |(_, simple)| simple)
    }

    /// The name with its last path segment removed; `None` for a top-level section.
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        self.name
            .rsplit_once(self.separator)
            .map(|(parent, _)| parent)
            .filter(|parent| !parent.is_empty())
    }

    /// Full name of the child called `key`.
    #[must_use]
    pub fn child_name(&self, key: &str) -> String {
        format!("{}{}{key}", self.name, self.separator)
    }

    /// Whether `name` is an immediate child of this section.
    #[must_use]
    pub fn is_child(&self, name: &str) -> bool {
        self.child_pattern.is_match(name)
    }

    #[must_use]
    pub fn separator(&self) -> char {
        self.separator
    }

    #[must_use]
    pub fn options(&self) -> &OptionMap {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionMap {
        &mut self.options
    }
}

impl Deref for Section {
    type Target = OptionMap;

    fn deref(&self) -> &Self::Target {
        &self.options
    }
}

impl DerefMut for Section {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.options
    }
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.separator == other.separator
            && self.options == other.options
    }
}

impl Eq for Section {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        let section = Section::new("a/b/c", '/').expect("valid name");
        assert_eq!(section.simple_name(), "c");
        assert_eq!(section.parent_name(), Some("a/b"));
        assert_eq!(section.child_name("d"), "a/b/c/d");

        let top = Section::new("top", '/').expect("valid name");
        assert_eq!(top.simple_name(), "top");
        assert_eq!(top.parent_name(), None);
    }

    #[test]
    fn child_pattern_matches_one_level() {
        let section = Section::new("a.b", '/').expect("valid name");
        assert!(section.is_child("a.b/c"));
        assert!(!section.is_child("a.b/c/d"));
        assert!(!section.is_child("axb/c"));
        assert!(!section.is_child("a.b"));
        assert!(!section.is_child("a.b/"));
    }

    #[test]
    fn backslash_separator() {
        let section = Section::new(r"HKEY_CURRENT_USER\Software", '\\').expect("valid name");
        assert!(section.is_child(r"HKEY_CURRENT_USER\Software\X"));
        assert!(!section.is_child(r"HKEY_CURRENT_USER\Software\X\Y"));
        assert_eq!(section.parent_name(), Some("HKEY_CURRENT_USER"));
        assert_eq!(section.simple_name(), "Software");
    }

    #[test]
    fn options_through_deref() {
        let mut section = Section::new("server", '/').expect("valid name");
        section.add("host", "localhost");
        assert_eq!(section.get("host"), Some("localhost"));
        assert_eq!(section.options().len(), 1);
    }
}
