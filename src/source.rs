use std::fs;
use std::io;
use std::path::Path;

use log::{trace, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::escape::count_ending_escapes;
use crate::parser::Handler;

const INCLUDE_BEGIN: char = '<';
const INCLUDE_END: char = '>';
const INCLUDE_OPTIONAL: char = '?';

/// Logical lines of a document.
///
/// Blank lines are skipped and comment lines are gathered into blocks that are handed to the
/// [`Handler`] right before the next content line (or blank line). Continuation lines are
/// joined, and `<location>` lines splice in another document when includes are enabled.
pub(crate) struct LineSource {
    lines: std::vec::IntoIter<String>,
    line_number: usize,
    location: Option<Url>,
    comment_chars: &'static str,
    keep_comments: bool,
    escape_newline: bool,
    include: bool,
    line_separator: String,
    file_encoding: crate::encoding::Encoding,
    chain: Option<Box<LineSource>>,
}

impl LineSource {
    pub fn from_text(
        text: &str,
        location: Option<Url>,
        comment_chars: &'static str,
        config: &Config,
    ) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect::<Vec<_>>().into_iter(),
            line_number: 0,
            location,
            comment_chars,
            keep_comments: config.comment,
            escape_newline: config.escape_newline,
            include: config.include,
            line_separator: config.line_separator.clone(),
            file_encoding: config.file_encoding,
            chain: None,
        }
    }

    pub fn open(location: &Url, comment_chars: &'static str, config: &Config) -> io::Result<Self> {
        let data = read_location(location)?;
        let text = config.file_encoding.decode_with_bom(&data);
        Ok(Self::from_text(&text, Some(location.clone()), comment_chars, config))
    }

    /// Line number of the most recently returned line, within the innermost active include.
    pub fn line_number(&self) -> usize {
        self.chain
            .as_ref()
            .map_or(self.line_number, |chain| chain.line_number())
    }

    pub fn read_line(&mut self, handler: &mut dyn Handler) -> Result<Option<String>> {
        if let Some(chain) = self.chain.as_mut() {
            if let Some(line) = chain.read_line(handler)? {
                return Ok(Some(line));
            }
            self.chain = None;
        }

        let line = self.read_line_skip_comments(handler);
        match line {
            Some(line) if self.include && is_include(&line) => self.handle_include(&line, handler),
            line => Ok(line),
        }
    }

    fn read_line_skip_comments(&mut self, handler: &mut dyn Handler) -> Option<String> {
        let mut comment = String::new();
        let mut buffer = String::new();

        for raw in self.lines.by_ref() {
            self.line_number += 1;
            let line = raw.trim();

            if line.is_empty() {
                flush_comment(&mut comment, self.keep_comments, &self.line_separator, handler);
                handler.handle_blank_line();
                continue;
            }

            if buffer.is_empty() {
                let marker = line
                    .chars()
                    .next()
                    .filter(|&c| self.comment_chars.contains(c));
                if let Some(marker) = marker {
                    comment.push_str(&line[marker.len_utf8()..]);
                    comment.push_str(&self.line_separator);
                    continue;
                }
            }

            flush_comment(&mut comment, self.keep_comments, &self.line_separator, handler);
            if self.escape_newline && count_ending_escapes(line) % 2 == 1 {
                buffer.push_str(&line[..line.len() - 1]);
                continue;
            }

            buffer.push_str(line);
            return Some(buffer);
        }

        flush_comment(&mut comment, self.keep_comments, &self.line_separator, handler);
        (!buffer.is_empty()).then_some(buffer)
    }

    fn handle_include(&mut self, line: &str, handler: &mut dyn Handler) -> Result<Option<String>> {
        let inner = line[1..line.len() - 1].trim();
        let (optional, target) = match inner.strip_prefix(INCLUDE_OPTIONAL) {
            Some(rest) => (true, rest.trim()),
            None => (false, inner),
        };

        let opened = self
            .resolve(target)
            .and_then(|location| {
                trace!("including {location}");
                Self::open(&location, self.comment_chars, &self.config())
            });

        match opened {
            Ok(source) => self.chain = Some(Box::new(source)),
            Err(e) if optional => warn!("skipping optional include {target:?}: {e}"),
            Err(source) => {
                return Err(Error::Include {
                    location: target.to_owned(),
                    source,
                });
            }
        }

        self.read_line(handler)
    }

    /// Resolves an include target against the location of this document.
    fn resolve(&self, target: &str) -> io::Result<Url> {
        let joined = match &self.location {
            Some(base) => base.join(target),
            None => Url::parse(target),
        };

        joined.or_else(|_| path_url(Path::new(target)))
    }

    fn config(&self) -> Config {
        Config {
            comment: self.keep_comments,
            escape_newline: self.escape_newline,
            include: self.include,
            line_separator: self.line_separator.clone(),
            file_encoding: self.file_encoding,
            ..Config::default()
        }
    }
}

fn is_include(line: &str) -> bool {
    line.len() > 2 && line.starts_with(INCLUDE_BEGIN) && line.ends_with(INCLUDE_END)
}

fn flush_comment(comment: &mut String, keep: bool, separator: &str, handler: &mut dyn Handler) {
    if comment.is_empty() {
        return;
    }
    if !keep {
        comment.clear();
        return;
    }

    let text = comment.strip_suffix(separator).unwrap_or(comment.as_str());
    handler.handle_comment(text);
    comment.clear();
}

/// A `file:` URL for `path`, made absolute against the working directory.
pub(crate) fn path_url(path: &Path) -> io::Result<Url> {
    let absolute = std::path::absolute(path)?;
    Url::from_file_path(&absolute).map_err(|()| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} cannot be expressed as a URL", absolute.display()),
        )
    })
}

/// Reads the bytes behind `location`. Only `file:` URLs are supported.
pub(crate) fn read_location(location: &Url) -> io::Result<Vec<u8>> {
    if location.scheme() != "file" {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("unsupported URL scheme {:?}", location.scheme()),
        ));
    }

    let path = location.to_file_path().map_err(|()| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{location} does not name a local file"),
        )
    })?;
    fs::read(path)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Handler for Recorder {
        fn handle_comment(&mut self, comment: &str) {
            self.events.push(format!("comment {comment:?}"));
        }

        fn handle_blank_line(&mut self) {
            self.events.push("blank".to_owned());
        }

        fn start_section(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }

        fn handle_option(&mut self, _name: &str, _value: Option<&str>) -> Result<()> {
            Ok(())
        }
    }

    fn config() -> Config {
        Config {
            line_separator: "\n".to_owned(),
            ..Config::default()
        }
    }

    fn read_all(source: &mut LineSource, recorder: &mut Recorder) -> Vec<(usize, String)> {
        let mut lines = Vec::new();
        while let Some(line) = source.read_line(recorder).expect("source is readable") {
            recorder.events.push(format!("line {line:?}"));
            lines.push((source.line_number(), line));
        }
        lines
    }

    #[test]
    fn comments_are_grouped_and_flushed() {
        let text = "; one\n;two\n\n# three\nkey = value\n; trailing";
        let mut source = LineSource::from_text(text, None, ";#", &config());
        let mut recorder = Recorder::default();

        let lines = read_all(&mut source, &mut recorder);

        assert_eq!(lines, vec![(5, "key = value".to_owned())]);
        assert_eq!(
            recorder.events,
            vec![
                r#"comment " one\ntwo""#.to_owned(),
                "blank".to_owned(),
                r#"comment " three""#.to_owned(),
                r#"line "key = value""#.to_owned(),
                r#"comment " trailing""#.to_owned(),
            ]
        );
    }

    #[test]
    fn continuation_lines() {
        let text = "key = a\\\n   b\\\\\nnext = c\\";
        let mut source = LineSource::from_text(text, None, ";", &config());
        let lines = read_all(&mut source, &mut Recorder::default());

        assert_eq!(
            lines,
            vec![(2, "key = ab\\\\".to_owned()), (3, "next = c".to_owned())]
        );
    }

    #[test]
    fn continuation_disabled() {
        let config = Config {
            escape_newline: false,
            ..config()
        };
        let mut source = LineSource::from_text("a\\\nb", None, ";", &config);
        let lines = read_all(&mut source, &mut Recorder::default());

        assert_eq!(lines, vec![(1, "a\\".to_owned()), (2, "b".to_owned())]);
    }

    #[test]
    fn includes_are_spliced_relative_to_the_document() {
        let dir = tempfile::tempdir().expect("temporary directory");
        fs::write(dir.path().join("inner.ini"), "inner = 1\n").expect("write include");
        fs::write(
            dir.path().join("outer.ini"),
            "before = 0\n<inner.ini>\n<?missing.ini>\nafter = 2\n",
        )
        .expect("write document");

        let config = Config {
            include: true,
            ..config()
        };
        let location = path_url(&dir.path().join("outer.ini")).expect("absolute path");
        let mut source = LineSource::open(&location, ";", &config).expect("document exists");
        let lines = read_all(&mut source, &mut Recorder::default());

        assert_eq!(
            lines,
            vec![
                (1, "before = 0".to_owned()),
                (1, "inner = 1".to_owned()),
                (4, "after = 2".to_owned()),
            ]
        );
    }

    #[test]
    fn missing_required_include_fails() {
        let dir = tempfile::tempdir().expect("temporary directory");
        fs::write(dir.path().join("outer.ini"), "<nowhere.ini>\n").expect("write document");

        let config = Config {
            include: true,
            ..config()
        };
        let location = path_url(&dir.path().join("outer.ini")).expect("absolute path");
        let mut source = LineSource::open(&location, ";", &config).expect("document exists");
        let result = source.read_line(&mut Recorder::default());

        assert!(matches!(
            result,
            Err(Error::Include { ref location, .. }) if location == "nowhere.ini"
        ));
    }

    #[test]
    fn only_file_urls_are_readable() {
        let url = Url::parse("https://example.com/a.ini").expect("valid url");
        let error = read_location(&url).expect_err("http is not supported");
        assert_eq!(error.kind(), io::ErrorKind::Unsupported);
    }
}
