use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::format::{Format, IniFormatter, RegFormatter};
use crate::parser::{Handler, IniParser, OptionsParser, Parse, RegParser, Syntax};
use crate::source::LineSource;

/// The document flavours this crate reads and writes.
///
/// A dialect bundles a default [`Config`], its comment and operator characters, a parser and a
/// formatter. Documents remember their dialect so that loading and storing stay symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// Sectioned documents with nested `a/b/c` sections and escapes.
    #[default]
    Ini,
    /// Windows `.ini` files: no escapes, a global section, single-valued options.
    Wini,
    /// `Windows Registry Editor Version 5.00` export files.
    Reg,
    /// Sectionless `key = value` property files.
    Options,
}

const NAMES: &[(Dialect, &str)] = &[
    (Dialect::Ini, "ini"),
    (Dialect::Wini, "wini"),
    (Dialect::Reg, "reg"),
    (Dialect::Options, "options"),
];

impl Dialect {
    /// The configuration documents of this dialect start from.
    #[must_use]
    pub fn config(self) -> Config {
        let global = Config::global().clone();
        match self {
            Self::Ini => global,
            Self::Wini => Config {
                escape: false,
                escape_newline: false,
                global_section: true,
                empty_option: true,
                multi_option: false,
                path_separator: '\\',
                ..global
            },
            Self::Reg => Config {
                escape: false,
                escape_newline: true,
                empty_option: true,
                empty_section: true,
                global_section: false,
                multi_option: true,
                strict_operator: true,
                path_separator: '\\',
                file_encoding: Encoding::Utf16Le,
                line_separator: "\r\n".to_owned(),
                ..global
            },
            Self::Options => Config {
                global_section: false,
                multi_section: false,
                ..global
            },
        }
    }

    pub(crate) fn syntax(self) -> Syntax {
        match self {
            Self::Ini | Self::Wini => Syntax {
                comment_chars: ";#",
                operators: "=:",
            },
            Self::Reg => Syntax {
                comment_chars: ";",
                operators: "=",
            },
            Self::Options => Syntax {
                comment_chars: "#!",
                operators: "=:",
            },
        }
    }

    pub(crate) fn parser(self) -> &'static dyn Parse {
        match self {
            Self::Ini | Self::Wini => &IniParser,
            Self::Reg => &RegParser,
            Self::Options => &OptionsParser,
        }
    }

    pub(crate) fn formatter(self, config: &Config) -> Box<dyn Format + '_> {
        let inner = IniFormatter::new(config, self.syntax());
        match self {
            Self::Reg => Box::new(RegFormatter::new(inner)),
            _ => Box::new(inner),
        }
    }

    /// Parses `text` and streams its events into `handler`.
    ///
    /// This is the lower-level entry point behind [`crate::Profile::load_str`]; it lets callers
    /// consume a document without building one.
    pub fn parse(self, text: &str, config: &Config, handler: &mut dyn Handler) -> Result<()> {
        let syntax = self.syntax();
        let mut source = LineSource::from_text(text, None, syntax.comment_chars, config);
        self.parser().parse(&mut source, config, syntax, handler)
    }

    pub(crate) fn parse_source(
        self,
        source: &mut LineSource,
        config: &Config,
        handler: &mut dyn Handler,
    ) -> Result<()> {
        self.parser().parse(source, config, self.syntax(), handler)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|&&(dialect, _)| dialect == self)
            .map_or("ini", |&(_, name)| name)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s))
            .map(|&(dialect, _)| dialect)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown dialect {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_configs() {
        let ini = Dialect::Ini.config();
        assert!(ini.escape && ini.multi_option && ini.tree);
        assert_eq!(ini.path_separator, '/');

        let wini = Dialect::Wini.config();
        assert!(!wini.escape && wini.global_section && wini.empty_option && !wini.multi_option);
        assert_eq!(wini.path_separator, '\\');

        let reg = Dialect::Reg.config();
        assert!(reg.strict_operator && reg.empty_section && !reg.global_section);
        assert_eq!(reg.file_encoding, Encoding::Utf16Le);
        assert_eq!(reg.line_separator, "\r\n");
    }

    #[test]
    fn names() {
        assert_eq!("WINI".parse::<Dialect>().expect("known dialect"), Dialect::Wini);
        assert_eq!(Dialect::Options.to_string(), "options");
        assert!("toml".parse::<Dialect>().is_err());
    }
}
