use std::borrow::Cow;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::escape;
use crate::parser::{Handler, Syntax};
use crate::reg::{self, RegType, TypeValuesPair};

const SECTION_BEGIN: char = '[';
const SECTION_END: char = ']';
const INCLUDE_BEGIN: char = '<';
const ESCAPE_CHAR: char = '\\';

/// A [`Handler`] that renders the events it receives as text.
pub(crate) trait Format: Handler {
    fn as_handler(&mut self) -> &mut dyn Handler;

    fn finish(self: Box<Self>) -> String;
}

pub(crate) struct IniFormatter<'a> {
    config: &'a Config,
    syntax: Syntax,
    out: String,
}

impl<'a> IniFormatter<'a> {
    pub fn new(config: &'a Config, syntax: Syntax) -> Self {
        Self {
            config,
            syntax,
            out: String::with_capacity(4096),
        }
    }

    fn newline(&mut self) {
        self.out.push_str(&self.config.line_separator);
    }

    fn escaped<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.config.escape {
            Cow::Owned(escape::escape(text))
        } else {
            Cow::Borrowed(text)
        }
    }

    /// An escaped option name that cannot be read back as a comment, header or include.
    fn option_name(&self, name: &str) -> String {
        let mut escaped = self.escaped(name).into_owned();
        let ambiguous = escaped.chars().next().is_some_and(|first| {
            self.syntax.comment_chars.contains(first)
                || first == SECTION_BEGIN
                || (self.config.include && first == INCLUDE_BEGIN)
        });
        if self.config.escape && ambiguous {
            escaped.insert(0, ESCAPE_CHAR);
        }
        escaped
    }

    fn write_line(&mut self, line: &str) {
        self.out.push_str(line);
        self.newline();
    }

    fn write_option(&mut self, name: &str, value: &str) {
        let operator = self.syntax.operator();
        let line = if self.config.strict_operator {
            format!("{name}{operator}{value}")
        } else {
            format!("{name} {operator} {value}")
        };
        self.write_line(&line);
    }
}

impl Handler for IniFormatter<'_> {
    fn handle_comment(&mut self, comment: &str) {
        if !self.config.comment {
            return;
        }

        let marker = self.syntax.comment_char();
        for line in comment.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.out.push(marker);
            self.write_line(line);
        }
    }

    fn handle_blank_line(&mut self) {
        self.newline();
    }

    fn start_section(&mut self, name: &str) -> Result<()> {
        if !self.config.is_global_section(name) {
            let header = format!("{SECTION_BEGIN}{}{SECTION_END}", self.escaped(name));
            self.write_line(&header);
        }
        Ok(())
    }

    fn end_section(&mut self) {
        self.newline();
    }

    fn handle_option(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let name = self.option_name(name);
        match value {
            Some(value) => {
                let value = self.escaped(value).into_owned();
                self.write_option(&name, &value);
            }
            None if self.config.empty_option => self.write_line(&name),
            None => {}
        }
        Ok(())
    }
}

impl Format for IniFormatter<'_> {
    fn as_handler(&mut self) -> &mut dyn Handler {
        self
    }

    fn finish(self: Box<Self>) -> String {
        self.out
    }
}

/// Writes the version header, then typed `"name"=value` lines.
pub(crate) struct RegFormatter<'a> {
    inner: IniFormatter<'a>,
}

impl<'a> RegFormatter<'a> {
    pub fn new(inner: IniFormatter<'a>) -> Self {
        Self { inner }
    }
}

impl Handler for RegFormatter<'_> {
    fn start_document(&mut self) {
        self.inner.write_line(reg::VERSION);
        self.inner.newline();
    }

    fn handle_comment(&mut self, comment: &str) {
        self.inner.handle_comment(comment);
    }

    fn handle_blank_line(&mut self) {
        self.inner.handle_blank_line();
    }

    fn start_section(&mut self, name: &str) -> Result<()> {
        self.inner.start_section(name)
    }

    fn end_section(&mut self) {
        self.inner.end_section();
    }

    fn handle_option(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let values = value.map(str::to_owned).into_iter().collect();
        self.handle_typed_option(name, TypeValuesPair::new(RegType::Sz, values))
    }

    fn handle_typed_option(&mut self, name: &str, pair: TypeValuesPair) -> Result<()> {
        let value = reg::encode(&pair)
            .map_err(|reason| Error::InvalidArgument(format!("value {name:?}: {reason}")))?;
        let line = format!("{}={value}", reg::encode_name(name));
        self.inner.write_line(&line);
        Ok(())
    }
}

impl Format for RegFormatter<'_> {
    fn as_handler(&mut self) -> &mut dyn Handler {
        self
    }

    fn finish(self: Box<Self>) -> String {
        self.inner.out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const INI: Syntax = Syntax {
        comment_chars: ";#",
        operators: "=:",
    };

    fn config() -> Config {
        Config {
            line_separator: "\n".to_owned(),
            ..Config::default()
        }
    }

    fn render(format: &mut dyn Format) {
        format.start_document();
        format.handle_comment("header");
        format.handle_blank_line();
        format.handle_comment("about\nserver");
        format.start_section("server").expect("formatting never fails");
        format.handle_option("host", Some("local\thost")).expect("formatting never fails");
        format.handle_option("flag", None).expect("formatting never fails");
        format.end_section();
        format.end_document();
    }

    #[test]
    fn ini_output() {
        let config = config();
        let mut formatter = Box::new(IniFormatter::new(&config, INI));
        render(formatter.as_mut());

        assert_eq!(
            formatter.finish(),
            ";header\n\n;about\n;server\n[server]\nhost = local\\thost\n\n"
        );
    }

    #[test]
    fn strict_operator_and_empty_options() {
        let config = Config {
            strict_operator: true,
            empty_option: true,
            escape: false,
            comment: false,
            ..config()
        };
        let mut formatter = Box::new(IniFormatter::new(&config, INI));
        render(formatter.as_mut());

        assert_eq!(formatter.finish(), "\n[server]\nhost=local\thost\nflag\n\n");
    }

    #[test]
    fn names_that_look_like_markup_are_escaped() {
        let config = Config {
            include: true,
            ..config()
        };
        let mut formatter = IniFormatter::new(&config, INI);
        formatter.start_section("s").expect("formatting never fails");
        for name in [";key", "#key", "[key]", "<key>", "k;ey"] {
            formatter.handle_option(name, Some("v")).expect("formatting never fails");
        }

        assert_eq!(
            formatter.out,
            "[s]\n\\;key = v\n\\#key = v\n\\[key] = v\n\\<key> = v\nk;ey = v\n"
        );
    }

    #[test]
    fn global_section_has_no_header() {
        let config = Config {
            global_section: true,
            ..config()
        };
        let mut formatter = IniFormatter::new(&config, INI);
        formatter.start_section("?").expect("formatting never fails");
        formatter.handle_option("a", Some("1")).expect("formatting never fails");
        formatter.end_section();

        assert_eq!(formatter.out, "a = 1\n\n");
    }

    #[test]
    fn reg_output() {
        let config = Config {
            escape: false,
            strict_operator: true,
            line_separator: "\r\n".to_owned(),
            ..Config::default()
        };
        let syntax = Syntax {
            comment_chars: ";",
            operators: "=",
        };
        let mut formatter = Box::new(RegFormatter::new(IniFormatter::new(&config, syntax)));
        formatter.start_document();
        formatter.start_section(r"HKEY_CURRENT_USER\App").expect("formatting never fails");
        formatter
            .handle_typed_option(
                "Count",
                TypeValuesPair::new(RegType::Dword, vec!["42".to_owned()]),
            )
            .expect("valid dword");
        formatter.handle_option("@", Some("x")).expect("plain string");
        formatter.end_section();

        assert_eq!(
            formatter.finish(),
            "Windows Registry Editor Version 5.00\r\n\r\n\
             [HKEY_CURRENT_USER\\App]\r\n\"Count\"=dword:0000002a\r\n@=\"x\"\r\n\r\n"
        );
    }

    #[test]
    fn reg_rejects_unencodable_values() {
        let config = Config::default();
        let syntax = Syntax {
            comment_chars: ";",
            operators: "=",
        };
        let mut formatter = RegFormatter::new(IniFormatter::new(&config, syntax));
        let pair = TypeValuesPair::new(RegType::Dword, vec!["many".to_owned()]);

        assert!(matches!(
            formatter.handle_typed_option("Count", pair),
            Err(Error::InvalidArgument(_))
        ));
    }
}
