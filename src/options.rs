use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::ops::{Deref, DerefMut};
use std::path::Path;

use log::debug;
use url::Url;

use crate::builder::OptionsBuilder;
use crate::config::Config;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::option_map::OptionMap;
use crate::parser::Handler;
use crate::source::{self, LineSource};

/// A sectionless document of `key = value` lines, like a Java properties file.
///
/// Dereferences to its [`OptionMap`], so every option operation and [`crate::Fetch`] lookup
/// is available directly.
///
/// Like [`crate::Profile`], it does no locking: shared use across threads needs external
/// synchronization, and only the [`crate::props`] table locks internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    config: Config,
    comment: Option<String>,
    options: OptionMap,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Dialect::Options.config())
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            comment: None,
            options: OptionMap::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut options = Self::new();
        options.load_str(text)?;
        Ok(options)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut options = Self::new();
        options.load_path(path)?;
        Ok(options)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut options = Self::new();
        options.load_reader(reader)?;
        Ok(options)
    }

    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let comment_chars = Dialect::Options.syntax().comment_chars;
        let source = LineSource::from_text(text, None, comment_chars, &self.config);
        self.load_source(source)
    }

    pub fn load_reader(&mut self, mut reader: impl Read) -> Result<()> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let text = self.config.file_encoding.decode_with_bom(&buffer);
        self.load_str(&text)
    }

    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let url = source::path_url(path.as_ref())?;
        self.load_url(&url)
    }

    pub fn load_url(&mut self, url: &Url) -> Result<()> {
        debug!("loading options from {url}");
        let source = LineSource::open(url, Dialect::Options.syntax().comment_chars, &self.config)?;
        self.load_source(source)
    }

    fn load_source(&mut self, mut source: LineSource) -> Result<()> {
        let config = self.config.clone();
        let mut builder = OptionsBuilder::new(
            &mut self.options,
            &mut self.comment,
            config.multi_option,
            config.header_comment,
        );
        Dialect::Options.parse_source(&mut source, &config, &mut builder)
    }

    pub fn to_text(&self) -> Result<String> {
        let mut formatter = Dialect::Options.formatter(&self.config);
        self.emit(formatter.as_handler())?;
        Ok(formatter.finish())
    }

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
        self.store_writer(BufWriter::new(File::create(path)?))
    }

    /// Replays the options as handler events, header comment first.
    pub fn emit(&self, handler: &mut dyn Handler) -> Result<()> {
        handler.start_document();

        if let Some(comment) = self.comment.as_deref().filter(|_| self.config.header_comment) {
            handler.handle_comment(comment);
            handler.handle_blank_line();
        }

        for (key, values) in self.options.iter() {
            if let Some(comment) = self.options.comment(key) {
                handler.handle_comment(comment);
            }
            for value in values {
                handler.handle_option(key, value.as_deref())?;
            }
        }

        handler.end_document();
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The comment at the top of the document.
    #[must_use]
    pub fn header_comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_header_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }
}

impl Deref for Options {
    type Target = OptionMap;

    fn deref(&self) -> &Self::Target {
        &self.options
    }
}

impl DerefMut for Options {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.options
    }
}
