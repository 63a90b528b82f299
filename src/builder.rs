//! Handlers that turn parser events into documents.

use log::trace;

use crate::commented::Category;
use crate::error::{Error, Result};
use crate::option_map::OptionMap;
use crate::parser::Handler;
use crate::profile::Profile;
use crate::reg::{RegType, TypeValuesPair};

/// Decides where comment blocks end up.
///
/// A block followed by a blank line before anything else in the document is the header
/// comment. Any other block belongs to the section or option right after it.
#[derive(Debug, Default)]
struct CommentSlot {
    pending: Option<String>,
    header: bool,
}

impl CommentSlot {
    fn start(&mut self) {
        self.pending = None;
        self.header = true;
    }

    fn comment(&mut self, comment: &str) {
        self.pending = Some(comment.to_owned());
    }

    /// Returns the header comment once it is complete.
    fn blank_line(&mut self) -> Option<String> {
        if !self.header || self.pending.is_none() {
            return None;
        }
        self.header = false;
        self.pending.take()
    }

    /// Returns the comment for the element that follows.
    fn element(&mut self) -> Option<String> {
        self.header = false;
        self.pending.take()
    }

    /// A document made of a comment alone has it as its header comment.
    fn end(&mut self) -> Option<String> {
        if self.header { self.pending.take() } else { None }
    }
}

/// Builds a [`Profile`] from parser events, merging into what it already holds.
pub(crate) struct ProfileBuilder<'a> {
    profile: &'a mut Profile,
    current: Option<(String, usize)>,
    comments: CommentSlot,
}

impl<'a> ProfileBuilder<'a> {
    pub fn new(profile: &'a mut Profile) -> Self {
        Self {
            profile,
            current: None,
            comments: CommentSlot::default(),
        }
    }

    fn set_header_comment(&mut self, comment: String) {
        if self.profile.config().header_comment {
            self.profile.set_comment(Some(comment));
        }
    }

    fn current_section(&mut self, name: &str) -> Result<&mut crate::section::Section> {
        let Some((section, index)) = &self.current else {
            return Err(Error::InvalidArgument(format!("option {name:?} outside of any section")));
        };
        self.profile.get_mut_at(section, *index)
    }

    fn store(&mut self, name: &str, value: Option<String>) -> Result<()> {
        let multi_option = self.profile.config().multi_option;
        let comment = self.comments.element();
        let section = self.current_section(name)?;

        if multi_option {
            section.add_raw(name, value);
        } else {
            _ = section.put_raw(name, value);
        }
        if let Some(comment) = comment {
            _ = section.put_comment(name, comment);
        }
        Ok(())
    }
}

impl Handler for ProfileBuilder<'_> {
    fn start_document(&mut self) {
        self.comments.start();
    }

    fn end_document(&mut self) {
        if let Some(comment) = self.comments.end() {
            self.set_header_comment(comment);
        }
    }

    fn handle_comment(&mut self, comment: &str) {
        self.comments.comment(comment);
    }

    fn handle_blank_line(&mut self) {
        if let Some(comment) = self.comments.blank_line() {
            self.set_header_comment(comment);
        }
    }

    fn start_section(&mut self, name: &str) -> Result<()> {
        trace!("section {name:?}");
        if self.profile.config().multi_section {
            self.profile.add(name)?;
        } else {
            self.profile.entry(name)?;
        }

        // The global section has no header line, so a pending comment belongs to its first option.
        if !self.profile.config().is_global_section(name) {
            if let Some(comment) = self.comments.element() {
                _ = self.profile.put_section_comment(name, comment);
            }
        }

        let index = self.profile.length(name).saturating_sub(1);
        self.current = Some((name.to_owned(), index));
        Ok(())
    }

    /// Drops the section just read when it would not be written back out, unless other
    /// sections hang below it.
    fn end_section(&mut self) {
        let Some((name, index)) = self.current.take() else {
            return;
        };
        let Some(section) = self.profile.get_at(&name, index).ok() else {
            return;
        };
        if self.profile.is_kept(&section) || !section.children_names().is_empty() {
            return;
        }

        trace!("dropping empty section {name:?}");
        _ = self.profile.remove_at(&name, index);
    }

    fn handle_option(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        self.store(name, value.map(str::to_owned))
    }

    fn handle_typed_option(&mut self, name: &str, pair: TypeValuesPair) -> Result<()> {
        let comment = self.comments.element();
        let multi_option = self.profile.config().multi_option;
        let section = self.current_section(name)?;

        if pair.values.is_empty() {
            // An empty `REG_MULTI_SZ` keeps its key with no value.
            if multi_option {
                section.add_empty(name);
            } else {
                _ = section.put_empty(name);
            }
        }
        for value in pair.values {
            if multi_option {
                section.add(name, value);
            } else {
                _ = section.put(name, value);
            }
        }
        if pair.ty != RegType::Sz {
            _ = section.put_meta(name, Category::Type, pair.ty.name());
        }
        if let Some(comment) = comment {
            _ = section.put_comment(name, comment);
        }
        Ok(())
    }
}

/// Builds a sectionless option map together with its header comment.
pub(crate) struct OptionsBuilder<'a> {
    options: &'a mut OptionMap,
    comment: &'a mut Option<String>,
    multi_option: bool,
    header_comment: bool,
    comments: CommentSlot,
}

impl<'a> OptionsBuilder<'a> {
    pub fn new(
        options: &'a mut OptionMap,
        comment: &'a mut Option<String>,
        multi_option: bool,
        header_comment: bool,
    ) -> Self {
        Self {
            options,
            comment,
            multi_option,
            header_comment,
            comments: CommentSlot::default(),
        }
    }

    fn set_header_comment(&mut self, comment: String) {
        if self.header_comment {
            *self.comment = Some(comment);
        }
    }
}

impl Handler for OptionsBuilder<'_> {
    fn start_document(&mut self) {
        self.comments.start();
    }

    fn end_document(&mut self) {
        if let Some(comment) = self.comments.end() {
            self.set_header_comment(comment);
        }
    }

    fn handle_comment(&mut self, comment: &str) {
        self.comments.comment(comment);
    }

    fn handle_blank_line(&mut self) {
        if let Some(comment) = self.comments.blank_line() {
            self.set_header_comment(comment);
        }
    }

    fn start_section(&mut self, name: &str) -> Result<()> {
        Err(Error::InvalidArgument(format!(
            "options documents have no sections, found {name:?}"
        )))
    }

    fn handle_option(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let value = value.map(str::to_owned);
        if self.multi_option {
            self.options.add_raw(name, value);
        } else {
            _ = self.options.put_raw(name, value);
        }
        if let Some(comment) = self.comments.element() {
            _ = self.options.put_comment(name, comment);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::Config;
    use crate::dialect::Dialect;

    fn ini(text: &str) -> Profile {
        Profile::parse(Dialect::Ini, text).expect("valid document")
    }

    #[test]
    fn first_block_before_blank_line_is_the_header() {
        let profile = ini("; header\n;  second line\n\n[s]\na = 1\n");
        assert_eq!(profile.comment(), Some(" header\n  second line"));
        assert_eq!(profile.section_comment("s"), None);
    }

    #[test]
    fn attached_first_block_belongs_to_the_section() {
        let profile = ini("; about s\n[s]\na = 1\n");
        assert_eq!(profile.comment(), None);
        assert_eq!(profile.section_comment("s"), Some(" about s"));
    }

    #[test]
    fn comment_only_document() {
        assert_eq!(ini("; just this").comment(), Some(" just this"));
    }

    #[test]
    fn header_comments_can_be_discarded() {
        let config = Config {
            header_comment: false,
            ..Dialect::Ini.config()
        };
        let mut profile = Profile::with_config(Dialect::Ini, config);
        profile.load_str("; header\n\n[s]\na = 1\n").expect("valid document");
        assert_eq!(profile.comment(), None);
    }

    #[test]
    fn comment_above_a_global_option_belongs_to_the_option() {
        let profile = Profile::parse(Dialect::Wini, "; about verbose\nverbose = 1\n[s]\na = 1\n")
            .expect("valid document");
        let global = profile.get("?").expect("global section");

        assert_eq!(profile.section_comment("?"), None);
        assert_eq!(global.comment("verbose"), Some(" about verbose"));
    }

    #[test]
    fn single_valued_options_keep_the_last_value() {
        let mut profile = Profile::wini();
        profile.load_str("[s]\na = 1\na = 2\n").expect("valid document");
        assert_eq!(profile.get("s").expect("section exists").get_all("a"), &[Some("2".to_owned())]);
    }

    #[test]
    fn empty_sections_are_dropped_unless_they_have_children() {
        let profile = ini("[lonely]\n[a/b]\nk = v\n[a]\n[c]\n; note\n[d]\n");
        assert_eq!(profile.keys().collect::<Vec<_>>(), vec!["a", "a/b", "d"]);
        assert_eq!(profile.section_comment("d"), Some(" note"));

        let config = Config {
            empty_section: true,
            ..Dialect::Ini.config()
        };
        let mut profile = Profile::with_config(Dialect::Ini, config);
        profile.load_str("[lonely]\n").expect("valid document");
        assert!(profile.contains("lonely"));
    }

    #[test]
    fn options_builder_collects_values() {
        let mut options = OptionMap::new();
        let mut comment = None;
        let mut builder = OptionsBuilder::new(&mut options, &mut comment, true, true);
        builder.start_document();
        builder.handle_comment("top");
        builder.handle_blank_line();
        builder.handle_comment("about a");
        builder.handle_option("a", Some("1")).expect("options are accepted");
        builder.handle_option("a", Some("2")).expect("options are accepted");
        assert!(builder.start_section("s").is_err());
        builder.end_document();

        assert_eq!(comment.as_deref(), Some("top"));
        assert_eq!(options.get_all("a").len(), 2);
        assert_eq!(options.comment("a"), Some("about a"));
    }
}
