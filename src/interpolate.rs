//! The `${...}` placeholder grammar.
//!
//! Option-level placeholders are `${name}`, `${name[index]}`, `${@env/NAME}` and
//! `${@prop/NAME}`. Profile-level placeholders add a section part: `${section/name}`,
//! `${section[index]/name[index]}`, with `@env` and `@prop` acting as reserved section names.
//! A placeholder preceded by a backslash is left alone.
//!
//! After each substitution the value is scanned again from the start, so substituted text may
//! itself contain placeholders. References that cannot be resolved stay in the text verbatim.

use std::sync::LazyLock;

use fancy_regex::{Captures, Regex};
use log::warn;

pub(crate) const ENVIRONMENT: &str = "@env";
pub(crate) const PROPERTIES: &str = "@prop";

/// Substitutions allowed while expanding one value.
///
/// Reference chains are cut at the first repeated option; this bound only stops text that
/// keeps re-introducing itself, such as an environment variable whose value names itself.
const MAX_SUBSTITUTIONS: usize = 1024;

static OPTION_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?<!\\)\$\{(?:(@env|@prop)/)?([^\[\}]+)(?:\[([0-9]+)\])?\}")
        .unwrap_or_else(|e| unreachable!("option placeholder pattern is valid: {e}"))
});

static PROFILE_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?<!\\)\$\{(?:([^\[\}]+)(?:\[([0-9]+)\])?/)?([^\[/\}]+)(?:\[([0-9]+)\])?\}")
        .unwrap_or_else(|e| unreachable!("profile placeholder pattern is valid: {e}"))
});

/// One parsed `${...}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reference<'a> {
    pub section: Option<&'a str>,
    pub section_index: Option<usize>,
    pub option: &'a str,
    pub index: Option<usize>,
}

impl Reference<'_> {
    /// The `@env` / `@prop` namespaces, when the reference names one.
    pub fn external(&self) -> Option<String> {
        match self.section {
            Some(ENVIRONMENT) => crate::props::environment(self.option),
            Some(PROPERTIES) => crate::props::property(self.option),
            _ => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.section, Some(ENVIRONMENT | PROPERTIES))
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Grammar {
    Option,
    Profile,
}

impl Grammar {
    fn expression(self) -> &'static Regex {
        match self {
            Self::Option => &OPTION_EXPRESSION,
            Self::Profile => &PROFILE_EXPRESSION,
        }
    }

    fn reference<'t>(self, caps: &Captures<'t>) -> Reference<'t> {
        let index = |i: usize| caps.get(i).and_then(|m| m.as_str().parse().ok());
        match self {
            Self::Option => Reference {
                section: caps.get(1).map(|m| m.as_str()),
                section_index: None,
                option: caps.get(2).map_or("", |m| m.as_str()),
                index: index(3),
            },
            Self::Profile => Reference {
                section: caps.get(1).map(|m| m.as_str()),
                section_index: index(2),
                option: caps.get(3).map_or("", |m| m.as_str()),
                index: index(4),
            },
        }
    }
}

/// Expands every resolvable placeholder in `value`.
///
/// `lookup` returns the (already expanded) replacement for a reference, or `None` to leave the
/// placeholder in place.
pub(crate) fn resolve<F>(value: &str, grammar: Grammar, mut lookup: F) -> String
where
    F: FnMut(&Reference<'_>) -> Option<String>,
{
    if !value.contains("${") {
        return value.to_owned();
    }

    let expression = grammar.expression();
    let mut buffer = value.to_owned();
    let mut position = 0;
    let mut substitutions = 0;

    loop {
        let (range, replacement) = match expression.captures_from_pos(&buffer, position) {
            Ok(Some(caps)) => {
                let Some(whole) = caps.get(0) else { break };
                (whole.range(), lookup(&grammar.reference(&caps)))
            }
            Ok(None) => break,
            Err(e) => {
                warn!("placeholder scan of {value:?} stopped: {e}");
                break;
            }
        };

        match replacement {
            Some(replacement) => {
                if substitutions == MAX_SUBSTITUTIONS {
                    warn!("expansion of {value:?} stopped after {MAX_SUBSTITUTIONS} substitutions");
                    break;
                }
                substitutions += 1;
                buffer.replace_range(range, &replacement);
                position = 0;
            }
            None => position = range.end,
        }
    }

    buffer
}
