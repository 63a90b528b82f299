//! Value encoding of Windows Registry Editor export files.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::escape;

/// First line of every export this crate reads or writes.
pub const VERSION: &str = "Windows Registry Editor Version 5.00";

/// Name under which the unnamed (default) value of a key is stored.
pub const DEFAULT_VALUE_NAME: &str = "@";

const TYPE_SEPARATOR: char = ':';

/// Registry value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegType {
    None,
    Sz,
    ExpandSz,
    Binary,
    Dword,
    DwordBigEndian,
    Link,
    MultiSz,
    ResourceList,
    FullResourceDescriptor,
    ResourceRequirementsList,
    Qword,
}

const TYPES: &[(RegType, &str, &str)] = &[
    (RegType::None, "REG_NONE", "hex(0)"),
    (RegType::Sz, "REG_SZ", ""),
    (RegType::ExpandSz, "REG_EXPAND_SZ", "hex(2)"),
    (RegType::Binary, "REG_BINARY", "hex"),
    (RegType::Dword, "REG_DWORD", "dword"),
    (RegType::DwordBigEndian, "REG_DWORD_BIG_ENDIAN", "hex(5)"),
    (RegType::Link, "REG_LINK", "hex(6)"),
    (RegType::MultiSz, "REG_MULTI_SZ", "hex(7)"),
    (RegType::ResourceList, "REG_RESOURCE_LIST", "hex(8)"),
    (
        RegType::FullResourceDescriptor,
        "REG_FULL_RESOURCE_DESCRIPTOR",
        "hex(9)",
    ),
    (
        RegType::ResourceRequirementsList,
        "REG_RESOURCE_REQUIREMENTS_LIST",
        "hex(a)",
    ),
    (RegType::Qword, "REG_QWORD", "hex(b)"),
];

impl RegType {
    /// Symbolic name, e.g. `REG_DWORD`; this is what gets stored as type metadata.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Prefix in front of the `:` of an encoded value; empty for `REG_SZ`.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        self.entry().2
    }

    fn entry(self) -> &'static (RegType, &'static str, &'static str) {
        TYPES
            .iter()
            .find(|(ty, _, _)| *ty == self)
            .unwrap_or(&TYPES[1])
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        TYPES
            .iter()
            .find(|(_, _, p)| p.eq_ignore_ascii_case(prefix))
            .map(|&(ty, _, _)| ty)
    }
}

impl fmt::Display for RegType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl FromStr for RegType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TYPES
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|&(ty, _, _)| ty)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown registry type {s:?}")))
    }
}

/// A decoded registry value: its type and one value, or several for `REG_MULTI_SZ`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeValuesPair {
    pub ty: RegType,
    pub values: Vec<String>,
}

impl TypeValuesPair {
    #[must_use]
    pub fn new(ty: RegType, values: Vec<String>) -> Self {
        Self { ty, values }
    }
}

/// Decodes the right-hand side of a value line, e.g. `dword:0000002a` or `"text"`.
///
/// The error is a short reason suitable for a malformed-input report.
pub fn decode(raw: &str) -> Result<TypeValuesPair, String> {
    if raw.starts_with('"') {
        return Ok(TypeValuesPair::new(RegType::Sz, vec![escape::unquote(raw)]));
    }

    let Some((prefix, data)) = raw.split_once(TYPE_SEPARATOR) else {
        return Ok(TypeValuesPair::new(RegType::Sz, vec![raw.to_owned()]));
    };
    let ty = RegType::from_prefix(prefix.trim())
        .ok_or_else(|| format!("unknown registry value type {prefix:?}"))?;
    let data = data.trim();

    let values = match ty {
        RegType::Dword => {
            let number = u32::from_str_radix(data, 16)
                .map_err(|_| format!("invalid dword {data:?}"))?;
            vec![number.to_string()]
        }
        RegType::ExpandSz => vec![utf16_string(&binary(data)?)],
        RegType::MultiSz => split_multi(&utf16_string(&binary(data)?)),
        _ => vec![data.to_owned()],
    };

    Ok(TypeValuesPair::new(ty, values))
}

/// Encodes a value back into its textual form; the inverse of [`decode`].
pub fn encode(pair: &TypeValuesPair) -> Result<String, String> {
    let first = pair.values.first().map_or("", String::as_str);
    let data = match pair.ty {
        RegType::Sz => return Ok(escape::quote(first)),
        RegType::Dword => {
            let number = first
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid dword {first:?}"))?;
            format!("{number:08x}")
        }
        RegType::ExpandSz => hexadecimal(first),
        RegType::MultiSz => {
            let mut data = pair
                .values
                .iter()
                .map(|value| format!("{},", hexadecimal(value)))
                .collect::<String>();
            data.push_str("00,00");
            data
        }
        _ => first.to_owned(),
    };

    Ok(format!("{}{TYPE_SEPARATOR}{data}", pair.ty.prefix()))
}

/// Parses comma separated hex bytes, e.g. `41,00,00,00`.
fn binary(data: &str) -> Result<Vec<u8>, String> {
    data.split(',')
        .map(str::trim)
        .filter(|byte| !byte.is_empty())
        .map(|byte| u8::from_str_radix(byte, 16).map_err(|_| format!("invalid hex byte {byte:?}")))
        .collect()
}

/// UTF-16 LE text with its terminating NUL removed.
fn utf16_string(bytes: &[u8]) -> String {
    let text = crate::encoding::Encoding::Utf16Le.decode(bytes);
    match text.strip_suffix('\0') {
        Some(stripped) => stripped.to_owned(),
        None => text,
    }
}

/// NUL delimited strings; the empty string after the final NUL is not a value.
fn split_multi(text: &str) -> Vec<String> {
    let mut values = text.split('\0').map(str::to_owned).collect::<Vec<_>>();
    if values.last().is_some_and(String::is_empty) {
        values.pop();
    }
    values
}

/// `value` as NUL terminated UTF-16 LE hex bytes.
fn hexadecimal(value: &str) -> String {
    value
        .encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Unquotes a value name; `@` (the default value) is kept as is.
#[must_use]
pub fn decode_name(raw: &str) -> String {
    escape::unquote(raw.trim())
}

#[must_use]
pub fn encode_name(name: &str) -> String {
    if name == DEFAULT_VALUE_NAME {
        name.to_owned()
    } else {
        escape::quote(name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn dword() {
        let pair = decode("dword:0000002a").expect("valid dword");
        assert_eq!(pair, TypeValuesPair::new(RegType::Dword, vec!["42".to_owned()]));
        assert_eq!(encode(&pair).expect("valid dword"), "dword:0000002a");
    }

    #[test]
    fn quoted_string() {
        let pair = decode(r#""C:\\Program Files\\\"x\"""#).expect("valid string");
        assert_eq!(pair.ty, RegType::Sz);
        assert_eq!(pair.values, vec![r#"C:\Program Files\"x""#.to_owned()]);
        assert_eq!(encode(&pair).expect("valid string"), r#""C:\\Program Files\\\"x\"""#);
    }

    #[test]
    fn expandable_string() {
        let raw = "hex(2):25,00,50,00,41,00,54,00,48,00,25,00,00,00";
        let pair = decode(raw).expect("valid expand string");
        assert_eq!(pair, TypeValuesPair::new(RegType::ExpandSz, vec!["%PATH%".to_owned()]));
        assert_eq!(encode(&pair).expect("valid expand string"), raw);
    }

    #[test]
    fn multi_string_fans_out() {
        let raw = "hex(7):61,00,00,00,62,00,63,00,00,00,00,00";
        let pair = decode(raw).expect("valid multi string");
        assert_eq!(pair.ty, RegType::MultiSz);
        assert_eq!(pair.values, vec!["a".to_owned(), "bc".to_owned()]);
        assert_eq!(encode(&pair).expect("valid multi string"), raw);
    }

    #[test]
    fn empty_multi_string() {
        let pair = decode("hex(7):00,00").expect("valid multi string");
        assert_eq!(pair, TypeValuesPair::new(RegType::MultiSz, Vec::new()));
        assert_eq!(encode(&pair).expect("valid multi string"), "hex(7):00,00");
    }

    #[test]
    fn binary_is_kept_verbatim() {
        let pair = decode("hex:01,ff,10").expect("valid binary");
        assert_eq!(pair, TypeValuesPair::new(RegType::Binary, vec!["01,ff,10".to_owned()]));
        assert_eq!(encode(&pair).expect("valid binary"), "hex:01,ff,10");

        let qword = decode("hex(b):01,00,00,00,00,00,00,00").expect("valid qword");
        assert_eq!(qword.ty, RegType::Qword);
    }

    #[test]
    fn malformed_values() {
        assert!(decode("dword:xyz").is_err());
        assert!(decode("hex(2):zz").is_err());
        assert!(decode("bogus:00").is_err());
    }

    #[test]
    fn type_names() {
        assert_eq!(RegType::Dword.to_string(), "REG_DWORD");
        assert_eq!("REG_MULTI_SZ".parse::<RegType>().expect("known type"), RegType::MultiSz);
        assert!("REG_WHATEVER".parse::<RegType>().is_err());
    }

    #[test]
    fn value_names() {
        assert_eq!(decode_name(r#""Count""#), "Count");
        assert_eq!(decode_name("@"), "@");
        assert_eq!(encode_name("@"), "@");
        assert_eq!(encode_name("Count"), r#""Count""#);
    }
}
