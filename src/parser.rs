use crate::config::Config;
use crate::error::{Error, Result};
use crate::escape;
use crate::reg::{self, TypeValuesPair};
use crate::source::LineSource;

const SECTION_BEGIN: char = '[';
const SECTION_END: char = ']';

/// Receives the events of a document, in document order.
///
/// Parsers drive a handler while reading text, and documents drive one while being written out,
/// so the same trait sits between text and the in-memory model in both directions.
pub trait Handler {
    fn start_document(&mut self) {}

    fn end_document(&mut self) {}

    /// A block of consecutive comment lines, markers removed, joined with the line separator.
    fn handle_comment(&mut self, _comment: &str) {}

    fn handle_blank_line(&mut self) {}

    fn start_section(&mut self, name: &str) -> Result<()>;

    fn end_section(&mut self) {}

    /// `value` is `None` for a bare key.
    fn handle_option(&mut self, name: &str, value: Option<&str>) -> Result<()>;

    /// A registry value with its type; handlers that ignore types get one option per value.
    fn handle_typed_option(&mut self, name: &str, pair: TypeValuesPair) -> Result<()> {
        for value in &pair.values {
            self.handle_option(name, Some(value))?;
        }
        Ok(())
    }
}

/// Lexical details of a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Syntax {
    pub comment_chars: &'static str,
    pub operators: &'static str,
}

impl Syntax {
    /// Character used when writing comments.
    pub fn comment_char(self) -> char {
        self.comment_chars.chars().next().unwrap_or(';')
    }

    /// Character used when writing options.
    pub fn operator(self) -> char {
        self.operators.chars().next().unwrap_or('=')
    }
}

pub(crate) trait Parse: Sync {
    fn parse(
        &self,
        source: &mut LineSource,
        config: &Config,
        syntax: Syntax,
        handler: &mut dyn Handler,
    ) -> Result<()>;
}

/// Sectioned documents: `[name]` headers followed by `name <op> value` lines.
pub(crate) struct IniParser;

impl Parse for IniParser {
    fn parse(
        &self,
        source: &mut LineSource,
        config: &Config,
        syntax: Syntax,
        handler: &mut dyn Handler,
    ) -> Result<()> {
        handler.start_document();
        let mut in_section = false;

        while let Some(line) = source.read_line(handler)? {
            let number = source.line_number();

            if line.starts_with(SECTION_BEGIN) {
                if in_section {
                    handler.end_section();
                }
                let name = section_name(&line, number, config)?;
                handler.start_section(&name)?;
                in_section = true;
                continue;
            }

            if !in_section {
                if !config.global_section {
                    return Err(Error::invalid_format(
                        &line,
                        number,
                        "option outside of any section",
                    ));
                }
                handler.start_section(&config.global_section_name)?;
                in_section = true;
            }

            let (name, value) = option(&line, number, config, syntax)?;
            handler.handle_option(&name, value.as_deref())?;
        }

        if in_section {
            handler.end_section();
        }
        handler.end_document();
        Ok(())
    }
}

/// Sectionless documents: every line is an option.
pub(crate) struct OptionsParser;

impl Parse for OptionsParser {
    fn parse(
        &self,
        source: &mut LineSource,
        config: &Config,
        syntax: Syntax,
        handler: &mut dyn Handler,
    ) -> Result<()> {
        handler.start_document();
        while let Some(line) = source.read_line(handler)? {
            let (name, value) = option(&line, source.line_number(), config, syntax)?;
            handler.handle_option(&name, value.as_deref())?;
        }
        handler.end_document();
        Ok(())
    }
}

/// Registry export files. Value names are quoted, values carry a type prefix.
pub(crate) struct RegParser;

impl Parse for RegParser {
    fn parse(
        &self,
        source: &mut LineSource,
        config: &Config,
        _syntax: Syntax,
        handler: &mut dyn Handler,
    ) -> Result<()> {
        let version = source.read_line(handler)?.unwrap_or_default();
        if version != reg::VERSION {
            return Err(Error::invalid_format(
                &version,
                source.line_number(),
                format!("expected {:?}", reg::VERSION),
            ));
        }

        handler.start_document();
        let mut in_section = false;

        while let Some(line) = source.read_line(handler)? {
            let number = source.line_number();

            if line.starts_with(SECTION_BEGIN) {
                if in_section {
                    handler.end_section();
                }
                let name = section_name(&line, number, config)?;
                handler.start_section(&name)?;
                in_section = true;
                continue;
            }

            if !in_section {
                return Err(Error::invalid_format(&line, number, "value outside of any key"));
            }

            let (name, raw) = split_value_line(&line).ok_or_else(|| {
                Error::invalid_format(&line, number, "missing '=' after value name")
            })?;
            let pair = reg::decode(raw)
                .map_err(|reason| Error::invalid_format(&line, number, reason))?;
            handler.handle_typed_option(&reg::decode_name(name), pair)?;
        }

        if in_section {
            handler.end_section();
        }
        handler.end_document();
        Ok(())
    }
}

fn section_name(line: &str, number: usize, config: &Config) -> Result<String> {
    let Some(inner) = line
        .strip_prefix(SECTION_BEGIN)
        .and_then(|rest| rest.strip_suffix(SECTION_END))
    else {
        return Err(Error::invalid_format(line, number, "unterminated section header"));
    };

    let mut name = unescape(inner.trim(), line, number, config)?;
    if name.is_empty() && !config.unnamed_section {
        return Err(Error::invalid_format(line, number, "empty section name"));
    }
    if config.lower_case_section {
        name = name.to_lowercase();
    }
    Ok(name)
}

fn option(
    line: &str,
    number: usize,
    config: &Config,
    syntax: Syntax,
) -> Result<(String, Option<String>)> {
    let (name, value) = match line.find(|c: char| syntax.operators.contains(c)) {
        Some(index) => {
            let operator_len = line[index..].chars().next().map_or(1, char::len_utf8);
            let value = unescape(line[index + operator_len..].trim(), line, number, config)?;
            (&line[..index], Some(value))
        }
        None if config.empty_option => (line, None),
        None => return Err(Error::invalid_format(line, number, "missing operator")),
    };

    let mut name = unescape(name.trim(), line, number, config)?;
    if name.is_empty() {
        return Err(Error::invalid_format(line, number, "empty option name"));
    }
    if config.lower_case_option {
        name = name.to_lowercase();
    }
    Ok((name, value))
}

fn unescape(text: &str, line: &str, number: usize, config: &Config) -> Result<String> {
    if !config.escape {
        return Ok(text.to_owned());
    }
    escape::unescape(text).map_err(|e| Error::invalid_format(line, number, e.to_string()))
}

/// Splits `"name"=value` (or `@=value`) at the first `=` outside the quoted name.
fn split_value_line(line: &str) -> Option<(&str, &str)> {
    let name_end = if line.starts_with('"') {
        let mut escaped = false;
        let close = line[1..].char_indices().find_map(|(i, c)| match c {
            '\\' if !escaped => {
                escaped = true;
                None
            }
            '"' if !escaped => Some(i + 1),
            _ => {
                escaped = false;
                None
            }
        })?;
        close + 1
    } else {
        0
    };

    let operator = name_end + line[name_end..].find('=')?;
    Some((&line[..operator], line[operator + 1..].trim()))
}
