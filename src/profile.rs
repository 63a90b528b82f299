use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::ops::Deref;
use std::path::Path;

use log::{debug, warn};
use url::Url;

use crate::bind::{Record, RecordReader};
use crate::builder::ProfileBuilder;
use crate::commented::{Category, CommentedMultiMap};
use crate::config::Config;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::interpolate::{self, Grammar};
use crate::option_map::{Fetch, convert};
use crate::parser::Handler;
use crate::reg::{RegType, TypeValuesPair};
use crate::section::Section;
use crate::source::{self, LineSource};
use crate::value::IniValue;

/// An ordered collection of named [`Section`]s: the in-memory form of a whole document.
///
/// Section names may repeat when [`Config::multi_section`] is set; lookups by name then see the
/// last section of that name, and `*_at` variants address the others. Names containing
/// [`Config::path_separator`] describe a tree, which is navigated through [`SectionRef`].
///
/// A profile does no locking of its own. Callers that share one across threads must
/// synchronize access themselves; the only internal lock guards the [`crate::props`] table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    dialect: Dialect,
    config: Config,
    comment: Option<String>,
    sections: CommentedMultiMap<Section>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(Dialect::Ini)
    }
}

impl Profile {
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self::with_config(dialect, dialect.config())
    }

    #[must_use]
    pub fn with_config(dialect: Dialect, config: Config) -> Self {
        Self {
            dialect,
            config,
            comment: None,
            sections: CommentedMultiMap::new(),
        }
    }

    #[must_use]
    pub fn ini() -> Self {
        Self::new(Dialect::Ini)
    }

    #[must_use]
    pub fn wini() -> Self {
        Self::new(Dialect::Wini)
    }

    #[must_use]
    pub fn reg() -> Self {
        Self::new(Dialect::Reg)
    }

    pub fn parse(dialect: Dialect, text: &str) -> Result<Self> {
        let mut profile = Self::new(dialect);
        profile.load_str(text)?;
        Ok(profile)
    }

    pub fn from_path(dialect: Dialect, path: impl AsRef<Path>) -> Result<Self> {
        let mut profile = Self::new(dialect);
        profile.load_path(path)?;
        Ok(profile)
    }

    pub fn from_reader(dialect: Dialect, reader: impl Read) -> Result<Self> {
        let mut profile = Self::new(dialect);
        profile.load_reader(reader)?;
        Ok(profile)
    }

    pub fn from_url(dialect: Dialect, url: &Url) -> Result<Self> {
        let mut profile = Self::new(dialect);
        profile.load_url(url)?;
        Ok(profile)
    }

    /// Merges the document in `text` into this profile.
    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let comment_chars = self.dialect.syntax().comment_chars;
        let source = LineSource::from_text(text, None, comment_chars, &self.config);
        self.load_source(source)
    }

    /// Reads the whole stream, honouring a leading Byte Order Mark over [`Config::file_encoding`].
    pub fn load_reader(&mut self, mut reader: impl Read) -> Result<()> {
        let mut buffer = Vec::with_capacity(4096);
        reader.read_to_end(&mut buffer)?;
        let text = self.config.file_encoding.decode_with_bom(&buffer);
        self.load_str(&text)
    }

    /// Loads a file; relative includes resolve against its directory.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let url = source::path_url(path.as_ref())?;
        self.load_url(&url)
    }

    pub fn load_url(&mut self, url: &Url) -> Result<()> {
        debug!("loading {} document from {url}", self.dialect);
        let source = LineSource::open(url, self.dialect.syntax().comment_chars, &self.config)?;
        self.load_source(source)
    }

    fn load_source(&mut self, mut source: LineSource) -> Result<()> {
        let dialect = self.dialect;
        let config = self.config.clone();
        let mut builder = ProfileBuilder::new(self);
        dialect.parse_source(&mut source, &config, &mut builder)
    }

    /// Renders the document in its dialect.
    pub fn to_text(&self) -> Result<String> {
        let mut formatter = self.dialect.formatter(&self.config);
        self.emit(formatter.as_handler())?;
        Ok(formatter.finish())
    }

    /// Writes the document in [`Config::file_encoding`], with a Byte Order Mark for UTF-16/32.
    pub fn store_writer(&self, mut writer: impl Write) -> Result<()> {
        let text = self.to_text()?;
        let encoding = self.config.file_encoding;
        if encoding.writes_bom() {
            writer.write_all(encoding.bom())?;
        }
        writer.write_all(&encoding.encode(&text))?;
        writer.flush()?;
        Ok(())
    }

    pub fn store_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!("storing {} document to {}", self.dialect, path.display());
        self.store_writer(BufWriter::new(File::create(path)?))
    }

    /// Replays the document as handler events: the header comment, then every kept section.
    ///
    /// The global section, when the dialect has one, comes first.
    pub fn emit(&self, handler: &mut dyn Handler) -> Result<()> {
        handler.start_document();

        if let Some(comment) = self.comment.as_deref().filter(|_| self.config.header_comment) {
            handler.handle_comment(comment);
            handler.handle_blank_line();
        }

        let (global, rest): (Vec<_>, Vec<_>) = self
            .sections
            .iter()
            .partition(|(name, _)| self.config.is_global_section(name));

        for (_, sections) in global.into_iter().chain(rest) {
            for section in sections {
                if self.is_kept(section) {
                    self.emit_section(section, handler)?;
                }
            }
        }

        handler.end_document();
        Ok(())
    }

    fn emit_section(&self, section: &Section, handler: &mut dyn Handler) -> Result<()> {
        if let Some(comment) = self.sections.comment(section.name()) {
            handler.handle_comment(comment);
        }
        handler.start_section(section.name())?;

        for (key, values) in section.iter() {
            if let Some(comment) = section.comment(key) {
                handler.handle_comment(comment);
            }

            if self.dialect == Dialect::Reg {
                let ty = option_type(section, key);
                let values = values.iter().flatten().cloned().collect();
                handler.handle_typed_option(key, TypeValuesPair::new(ty, values))?;
            } else {
                for value in values {
                    handler.handle_option(key, value.as_deref())?;
                }
            }
        }

        handler.end_section();
        Ok(())
    }

    /// Whether `section` survives a store and load: it holds options, carries a comment, or
    /// the configuration keeps empty sections.
    pub(crate) fn is_kept(&self, section: &Section) -> bool {
        self.config.empty_section
            || !section.is_empty()
            || self.sections.comment(section.name()).is_some()
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The header comment of the document.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// Number of distinct section names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Number of sections called `name`.
    #[must_use]
    pub fn length(&self, name: &str) -> usize {
        self.sections.length(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.keys()
    }

    /// Every section in document order, repeated names included.
    pub fn iter(&self) -> impl Iterator<Item = SectionRef<'_>> {
        self.sections
            .values()
            .map(move |section| SectionRef::new(self, section))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<SectionRef<'_>> {
        self.sections
            .get(name)
            .map(|section| SectionRef::new(self, section))
    }

    pub fn get_at(&self, name: &str, index: usize) -> Result<SectionRef<'_>> {
        let section = self.sections.get_at(name, index)?;
        Ok(SectionRef::new(self, section))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.get_mut(name)
    }

    pub fn get_mut_at(&mut self, name: &str, index: usize) -> Result<&mut Section> {
        self.sections.get_mut_at(name, index)
    }

    /// Creates a section called `name`.
    ///
    /// In tree mode missing ancestors are created first. An existing name is an error unless
    /// [`Config::multi_section`] allows siblings of the same name.
    pub fn add(&mut self, name: &str) -> Result<&mut Section> {
        if self.contains(name) && !self.config.multi_section {
            return Err(Error::DuplicateSection(name.to_owned()));
        }

        if self.config.tree {
            let separator = self.config.path_separator;
            let ancestors = name
                .match_indices(separator)
                .map(|(i, _)| &name[..i])
                .filter(|ancestor| !ancestor.is_empty())
                .collect::<Vec<_>>();
            for ancestor in ancestors {
                if !self.contains(ancestor) {
                    self.sections.add(ancestor, Section::new(ancestor, separator)?);
                }
            }
        }

        self.sections
            .add(name, Section::new(name, self.config.path_separator)?);
        let index = self.length(name) - 1;
        self.sections.get_mut_at(name, index)
    }

    /// The last section called `name`, created when missing.
    pub fn entry(&mut self, name: &str) -> Result<&mut Section> {
        if !self.contains(name) {
            return self.add(name);
        }
        self.sections
            .get_mut(name)
            .ok_or_else(|| Error::NoSection(name.to_owned()))
    }

    /// Removes every section called `name`.
    pub fn remove(&mut self, name: &str) -> Option<Vec<Section>> {
        self.sections.remove(name)
    }

    pub fn remove_at(&mut self, name: &str, index: usize) -> Result<Section> {
        self.sections.remove_at(name, index)
    }

    pub fn clear(&mut self) {
        self.sections.clear();
        self.comment = None;
    }

    #[must_use]
    pub fn section_comment(&self, name: &str) -> Option<&str> {
        self.sections.comment(name)
    }

    pub fn put_section_comment(
        &mut self,
        name: impl Into<String>,
        comment: impl Into<String>,
    ) -> Option<String> {
        self.sections.put_comment(name, comment)
    }

    pub fn remove_section_comment(&mut self, name: &str) -> Option<String> {
        self.sections.remove_comment(name)
    }

    /// The raw last value of `option` in the last section called `section`.
    #[must_use]
    pub fn get_value(&self, section: &str, option: &str) -> Option<&str> {
        self.sections.get(section)?.get(option)
    }

    /// Sets `option`, creating the section when needed.
    pub fn put_value(
        &mut self,
        section: &str,
        option: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>> {
        Ok(self.entry(section)?.put(option, value))
    }

    pub fn remove_value(&mut self, section: &str, option: &str) -> Option<Vec<Option<String>>> {
        self.sections.get_mut(section)?.remove(option)
    }

    /// Like [`get_value`](Self::get_value), with placeholders expanded.
    #[must_use]
    pub fn fetch_value(&self, section: &str, option: &str) -> Option<String> {
        self.get(section)?.fetch(option)
    }

    pub fn fetch_as<T: IniValue>(&self, section: &str, option: &str) -> Result<Option<T>> {
        self.fetch_value(section, option)
            .map(|raw| convert(option, &raw))
            .transpose()
    }

    /// Registry type of a value; plain strings carry no type metadata.
    #[must_use]
    pub fn option_type(&self, section: &str, option: &str) -> RegType {
        self.sections
            .get(section)
            .map_or(RegType::Sz, |section| option_type(section, option))
    }

    /// Records the registry type of an existing option.
    pub fn set_option_type(&mut self, section: &str, option: &str, ty: RegType) -> Result<()> {
        let missing = || Error::NoOption {
            section: section.to_owned(),
            option: option.to_owned(),
        };
        let section = self.sections.get_mut(section).ok_or_else(missing)?;
        if !section.contains_key(option) {
            return Err(missing());
        }
        if ty == RegType::Sz {
            _ = section.remove_meta(option, Category::Type);
        } else {
            _ = section.put_meta(option, Category::Type, ty.name());
        }
        Ok(())
    }

    #[must_use]
    pub fn parent(&self, name: &str) -> Option<SectionRef<'_>> {
        self.get(name)?.parent()
    }

    #[must_use]
    pub fn children_names(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|section| section.children_names())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn child(&self, name: &str, key: &str) -> Option<SectionRef<'_>> {
        self.get(name)?.child(key)
    }

    pub fn add_child(&mut self, name: &str, key: &str) -> Result<&mut Section> {
        let child = self.section_path(name, &[key])?;
        self.add(&child)
    }

    pub fn remove_child(&mut self, name: &str, key: &str) -> Option<Vec<Section>> {
        let child = self.section_path(name, &[key]).ok()?;
        self.remove(&child)
    }

    /// Descends from `name` through `path`, one segment per level.
    #[must_use]
    pub fn lookup(&self, name: &str, path: &[&str]) -> Option<SectionRef<'_>> {
        self.get(name)?.lookup(path)
    }

    fn section_path(&self, name: &str, path: &[&str]) -> Result<String> {
        if !self.contains(name) {
            return Err(Error::NoSection(name.to_owned()));
        }
        let separator = self.config.path_separator.to_string();
        Ok(std::iter::once(name)
            .chain(path.iter().copied())
            .collect::<Vec<_>>()
            .join(&separator))
    }

    /// Expands `${...}` placeholders of a value stored in `owner`.
    ///
    /// `stack` holds the `(section, option, index)` values being expanded; meeting one of them
    /// again means a cycle and leaves that placeholder unresolved.
    fn expand(
        &self,
        owner: &Section,
        raw: &str,
        stack: &mut Vec<(String, String, usize)>,
    ) -> String {
        interpolate::resolve(raw, Grammar::Profile, |reference| {
            if reference.is_external() {
                return reference.external();
            }

            let section = match (reference.section, reference.section_index) {
                (None, _) => owner,
                (Some(name), None) => self.sections.get(name)?,
                (Some(name), Some(index)) => self.sections.get_at(name, index).ok()?,
            };

            let len = section.length(reference.option);
            let index = reference.index.unwrap_or(len.checked_sub(1)?);
            if index >= len {
                return None;
            }

            let frame = (section.name().to_owned(), reference.option.to_owned(), index);
            if stack.contains(&frame) {
                warn!(
                    "cyclic reference to {:?}/{:?}[{index}] left unresolved",
                    frame.0, frame.1
                );
                return None;
            }

            stack.push(frame);
            let value = section
                .get_at(reference.option, index)
                .ok()
                .flatten()
                .map(|raw| self.expand(section, raw, stack));
            stack.pop();
            value
        })
    }
}

fn option_type(section: &Section, option: &str) -> RegType {
    section
        .meta(option, &Category::Type)
        .and_then(|name| name.parse().ok())
        .unwrap_or(RegType::Sz)
}

/// A section seen through its profile.
///
/// Dereferences to the [`Section`]; on top of that it knows its place in the tree and expands
/// profile-wide `${section/option}` placeholders in [`Fetch`] lookups.
#[derive(Debug, Clone, Copy)]
pub struct SectionRef<'a> {
    profile: &'a Profile,
    section: &'a Section,
}

impl<'a> SectionRef<'a> {
    fn new(profile: &'a Profile, section: &'a Section) -> Self {
        Self { profile, section }
    }

    #[must_use]
    pub fn section(&self) -> &'a Section {
        self.section
    }

    #[must_use]
    pub fn profile(&self) -> &'a Profile {
        self.profile
    }

    /// Comment attached to the section header.
    #[must_use]
    pub fn section_comment(&self) -> Option<&'a str> {
        self.profile.section_comment(self.section.name())
    }

    #[must_use]
    pub fn parent(&self) -> Option<SectionRef<'a>> {
        self.profile.get(self.section.parent_name()?)
    }

    /// Names of the immediate children, in document order.
    #[must_use]
    pub fn children_names(&self) -> Vec<&'a str> {
        self.profile
            .sections
            .keys()
            .filter(|name| self.section.is_child(name))
            .collect()
    }

    #[must_use]
    pub fn children(&self) -> Vec<SectionRef<'a>> {
        self.children_names()
            .into_iter()
            .filter_map(|name| self.profile.get(name))
            .collect()
    }

    #[must_use]
    pub fn child(&self, key: &str) -> Option<SectionRef<'a>> {
        self.profile.get(&self.section.child_name(key))
    }

    /// The descendant reached by appending every segment of `path` to this section's name.
    #[must_use]
    pub fn lookup(&self, path: &[&str]) -> Option<SectionRef<'a>> {
        let separator = self.section.separator().to_string();
        let name = std::iter::once(self.section.name())
            .chain(path.iter().copied())
            .collect::<Vec<_>>()
            .join(&separator);
        self.profile.get(&name)
    }

    /// Copies matching, interpolated options into `record`.
    pub fn to_record<R: Record>(&self, record: &mut R) -> Result<()> {
        self.to_record_prefixed("", record)
    }

    pub fn to_record_prefixed<R: Record>(&self, prefix: &str, record: &mut R) -> Result<()> {
        record.read_from(&mut RecordReader::new(self, prefix))
    }
}

impl Deref for SectionRef<'_> {
    type Target = Section;

    fn deref(&self) -> &Self::Target {
        self.section
    }
}

impl Fetch for SectionRef<'_> {
    fn length(&self, key: &str) -> usize {
        self.section.length(key)
    }

    fn fetch_at(&self, key: &str, index: usize) -> Result<Option<String>> {
        let Some(raw) = self.section.get_at(key, index)? else {
            return Ok(None);
        };
        let mut stack = vec![(self.section.name().to_owned(), key.to_owned(), index)];
        Ok(Some(self.profile.expand(self.section, raw, &mut stack)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn profile(text: &str) -> Profile {
        Profile::parse(Dialect::Ini, text).expect("valid document")
    }

    #[test]
    fn server_section() {
        let profile = profile("[server]\nhost = localhost\nport = 8080\n");

        assert_eq!(profile.keys().collect::<Vec<_>>(), vec!["server"]);
        assert_eq!(profile.get_value("server", "host"), Some("localhost"));
        assert_eq!(profile.fetch_as::<u16>("server", "port").expect("valid port"), Some(8080));
    }

    #[test]
    fn tree_navigation() {
        let mut profile = Profile::ini();
        profile.add("a/b/c").expect("new section");

        assert_eq!(profile.keys().collect::<Vec<_>>(), vec!["a", "a/b", "a/b/c"]);
        assert_eq!(profile.children_names("a"), vec!["a/b"]);
        assert_eq!(profile.parent("a/b/c").map(|s| s.name().to_owned()), Some("a/b".to_owned()));
        assert!(profile.parent("a").is_none());
        assert_eq!(
            profile.lookup("a", &["b", "c"]).map(|s| s.simple_name().to_owned()),
            Some("c".to_owned())
        );
        assert_eq!(profile.child("a", "b").map(|s| s.name().to_owned()), Some("a/b".to_owned()));

        profile.add_child("a", "d").expect("new child");
        assert_eq!(profile.children_names("a"), vec!["a/b", "a/d"]);
        profile.remove_child("a", "d");
        assert_eq!(profile.children_names("a"), vec!["a/b"]);
    }

    #[test]
    fn duplicate_sections() {
        let mut profile = Profile::ini();
        profile.add("s").expect("new section");
        assert!(matches!(profile.add("s"), Err(Error::DuplicateSection(ref name)) if name == "s"));

        let config = Config {
            multi_section: true,
            ..Dialect::Ini.config()
        };
        let mut profile = Profile::with_config(Dialect::Ini, config);
        profile.load_str("[s]\na = 1\n[s]\na = 2\n").expect("valid document");
        assert_eq!(profile.length("s"), 2);
        assert_eq!(profile.get_at("s", 0).expect("first section").get("a"), Some("1"));
        assert_eq!(profile.get_value("s", "a"), Some("2"));
    }

    #[test]
    fn repeated_headers_merge() {
        let profile = profile("[s]\na = 1\n[t]\nx = 0\n[s]\na = 2\nb = 3\n");
        assert_eq!(profile.length("s"), 1);
        let section = profile.get("s").expect("section exists");
        assert_eq!(section.get_all("a"), &[Some("1".to_owned()), Some("2".to_owned())]);
        assert_eq!(section.get("b"), Some("3"));
    }

    #[test]
    fn cross_section_references() {
        let profile = profile(
            "[paths]\nroot = /srv\nlog = ${root}/log\n\
             [app]\ndir = ${paths/log}/app\nfirst = ${paths/root[0]}\n\
             home = ${@prop/no.such.property}\n",
        );

        assert_eq!(profile.fetch_value("paths", "log").as_deref(), Some("/srv/log"));
        assert_eq!(profile.fetch_value("app", "dir").as_deref(), Some("/srv/log/app"));
        assert_eq!(profile.fetch_value("app", "first").as_deref(), Some("/srv"));
        assert_eq!(
            profile.fetch_value("app", "home").as_deref(),
            Some("${@prop/no.such.property}")
        );
    }

    #[test]
    fn indexed_section_references() {
        let config = Config {
            multi_section: true,
            ..Dialect::Ini.config()
        };
        let mut profile = Profile::with_config(Dialect::Ini, config);
        profile
            .load_str(
                "[host]\nname = a\n[host]\nname = b\n\
                 [pick]\nfirst = ${host[0]/name}\nlast = ${host/name}\n",
            )
            .expect("valid document");

        assert_eq!(profile.fetch_value("pick", "first").as_deref(), Some("a"));
        assert_eq!(profile.fetch_value("pick", "last").as_deref(), Some("b"));
    }

    #[test]
    fn cross_section_cycles_terminate() {
        let profile = profile("[a]\nx = ${b/y}\n[b]\ny = <${a/x}>\n");
        assert_eq!(profile.fetch_value("a", "x").as_deref(), Some("<${a/x}>"));
    }

    #[test]
    fn comments_are_attached() {
        let profile = profile("; header\n\n; about s\n[s]\n; about a\na = 1\n");

        assert_eq!(profile.comment(), Some(" header"));
        assert_eq!(profile.section_comment("s"), Some(" about s"));
        assert_eq!(profile.get("s").expect("section exists").comment("a"), Some(" about a"));
    }

    #[test]
    fn registry_types() {
        let mut profile = Profile::reg();
        profile
            .load_str(
                "Windows Registry Editor Version 5.00\r\n\r\n[HKEY_CURRENT_USER\\App]\r\n\
                 \"Count\"=dword:0000002a\r\n\"Name\"=\"x\"\r\n",
            )
            .expect("valid export");

        assert_eq!(profile.get_value(r"HKEY_CURRENT_USER\App", "Count"), Some("42"));
        assert_eq!(profile.option_type(r"HKEY_CURRENT_USER\App", "Count"), RegType::Dword);
        assert_eq!(profile.option_type(r"HKEY_CURRENT_USER\App", "Name"), RegType::Sz);
        assert!(profile.contains("HKEY_CURRENT_USER"));

        profile
            .set_option_type(r"HKEY_CURRENT_USER\App", "Name", RegType::ExpandSz)
            .expect("option exists");
        assert_eq!(profile.option_type(r"HKEY_CURRENT_USER\App", "Name"), RegType::ExpandSz);

        assert!(matches!(
            profile.set_option_type(r"HKEY_CURRENT_USER\App", "Missing", RegType::Dword),
            Err(Error::NoOption { .. })
        ));
        assert_eq!(profile.option_type(r"HKEY_CURRENT_USER\App", "Missing"), RegType::Sz);
    }

    #[test]
    fn record_binding_through_section() {
        #[derive(Default)]
        struct Server {
            url: String,
            port: u16,
        }

        impl Record for Server {
            fn read_from(&mut self, reader: &mut RecordReader<'_>) -> Result<()> {
                reader.field("url", &mut self.url)?;
                reader.field("port", &mut self.port)
            }

            fn write_to(&self, writer: &mut crate::bind::RecordWriter<'_>) {
                writer.field("url", &self.url);
                writer.field("port", &self.port);
            }
        }

        let profile = profile(
            "[net]\nhost = example.org\n[server]\nport = 80\nurl = http://${net/host}:${port}/\n",
        );
        let mut server = Server::default();
        profile
            .get("server")
            .expect("section exists")
            .to_record(&mut server)
            .expect("valid record");

        assert_eq!(server.url, "http://example.org:80/");
        assert_eq!(server.port, 80);
    }
}
