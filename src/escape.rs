use std::fmt;

const ESCAPE_CHAR: char = '\\';
const DOUBLE_QUOTE: char = '"';

/// Characters with a one-letter escape, paired with that letter.
const ESCAPES: &[(char, char)] = &[
    ('\\', '\\'),
    ('\t', 't'),
    ('\n', 'n'),
    ('\u{000C}', 'f'),
    ('\u{0008}', 'b'),
    ('\r', 'r'),
];

/// A `\uXXXX` sequence that is cut short or not hexadecimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEscape {
    pub sequence: String,
}

impl std::error::Error for InvalidEscape {}

impl fmt::Display for InvalidEscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed escape sequence {:?}", self.sequence)
    }
}

/// Replaces backslash, control characters and line breaks with escape sequences.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if let Some(&(_, letter)) = ESCAPES.iter().find(|&&(special, _)| special == c) {
            escaped.push(ESCAPE_CHAR);
            escaped.push(letter);
        } else if c.is_control() {
            escaped.push_str(&format!("\\u{:04x}", u32::from(c)));
        } else {
            escaped.push(c);
        }
    }

    escaped
}

/// Reverses [`escape`]. A backslash before any other character yields that character.
pub fn unescape(text: &str) -> Result<String, InvalidEscape> {
    let mut unescaped = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != ESCAPE_CHAR {
            unescaped.push(c);
            continue;
        }

        match chars.next() {
            Some('u') => {
                let digits = chars.by_ref().take(4).collect::<String>();
                let decoded = (digits.len() == 4)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| InvalidEscape {
                        sequence: format!("\\u{digits}"),
                    })?;
                unescaped.push(decoded);
            }
            Some(letter) => {
                let decoded = ESCAPES
                    .iter()
                    .find(|&&(_, l)| l == letter)
                    .map_or(letter, |&(special, _)| special);
                unescaped.push(decoded);
            }
            None => unescaped.push(ESCAPE_CHAR),
        }
    }

    Ok(unescaped)
}

/// Wraps `text` in double quotes, escaping embedded quotes and backslashes.
#[must_use]
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(DOUBLE_QUOTE);
    for c in text.chars() {
        if c == ESCAPE_CHAR || c == DOUBLE_QUOTE {
            quoted.push(ESCAPE_CHAR);
        }
        quoted.push(c);
    }
    quoted.push(DOUBLE_QUOTE);
    quoted
}

/// Reverses [`quote`]. Text that is not wrapped in double quotes is returned unchanged.
#[must_use]
pub fn unquote(text: &str) -> String {
    let Some(inner) = text
        .strip_prefix(DOUBLE_QUOTE)
        .and_then(|rest| rest.strip_suffix(DOUBLE_QUOTE))
    else {
        return text.to_owned();
    };

    let mut unquoted = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE_CHAR {
            if let Some(next) = chars.next() {
                unquoted.push(next);
                continue;
            }
        }
        unquoted.push(c);
    }
    unquoted
}

/// Number of consecutive backslashes at the end of `line`.
pub(crate) fn count_ending_escapes(line: &str) -> usize {
    line.chars().rev().take_while(|&c| c == ESCAPE_CHAR).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_special_characters() {
        assert_eq!(escape("a\tb\nc\\d"), r"a\tb\nc\\d");
        assert_eq!(escape("bell\u{7}"), r"bell\u0007");
        assert_eq!(escape("plain é"), "plain é");
    }

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape(r"a\tb\nc\\d").expect("valid escapes"), "a\tb\nc\\d");
        assert_eq!(unescape(r"\u0041\u00e9").expect("valid escapes"), "Aé");
        assert_eq!(unescape(r"\;not a comment").expect("valid escapes"), ";not a comment");
        assert_eq!(unescape("trailing\\").expect("valid escapes"), "trailing\\");
    }

    #[test]
    fn malformed_unicode_escape() {
        assert_eq!(
            unescape(r"\u12"),
            Err(InvalidEscape {
                sequence: r"\u12".to_owned()
            })
        );
        assert!(unescape(r"\uzzzz").is_err());
    }

    #[test]
    fn quoting() {
        assert_eq!(quote(r#"C:\dir "x""#), r#""C:\\dir \"x\"""#);
        assert_eq!(unquote(r#""C:\\dir \"x\"""#), r#"C:\dir "x""#);
        assert_eq!(unquote("bare"), "bare");
    }

    #[test]
    fn ending_escapes() {
        assert_eq!(count_ending_escapes(r"value\"), 1);
        assert_eq!(count_ending_escapes(r"value\\"), 2);
        assert_eq!(count_ending_escapes("value"), 0);
    }
}
