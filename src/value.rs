use std::path::PathBuf;

use chrono::FixedOffset;
use thiserror::Error;
use url::Url;

/// A stored string could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {value:?} to {type_name}: {message}")]
pub struct ConversionError {
    pub type_name: &'static str,
    pub value: String,
    pub message: String,
}

impl ConversionError {
    pub fn new(type_name: &'static str, value: &str, message: impl ToString) -> Self {
        Self {
            type_name,
            value: value.to_owned(),
            message: message.to_string(),
        }
    }
}

/// Scalar types that can be stored in an option value.
///
/// Implemented for the primitives, `String`, `char`, `bool`, file paths, URLs and time zone
/// offsets. Any other `FromStr + Display` type can opt in through [`ini_value_from_str!`].
///
/// [`ini_value_from_str!`]: crate::ini_value_from_str
pub trait IniValue: Sized {
    fn parse_value(raw: &str) -> Result<Self, ConversionError>;
    fn format_value(&self) -> String;
}

/// Implements [`IniValue`] for types that already round-trip through `FromStr` and `Display`.
///
/// ```
/// use std::net::Ipv4Addr;
///
/// #[derive(Debug, PartialEq)]
/// struct Host(Ipv4Addr);
///
/// impl std::str::FromStr for Host {
///     type Err = std::net::AddrParseError;
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(Host)
///     }
/// }
///
/// impl std::fmt::Display for Host {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         self.0.fmt(f)
///     }
/// }
///
/// inikit::ini_value_from_str!(Host);
///
/// use inikit::IniValue;
/// assert_eq!(Host::parse_value("10.0.0.1").unwrap(), Host(Ipv4Addr::new(10, 0, 0, 1)));
/// ```
#[macro_export]
macro_rules! ini_value_from_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::IniValue for $ty {
                fn parse_value(raw: &str) -> ::std::result::Result<Self, $crate::ConversionError> {
                    raw.trim().parse::<$ty>().map_err(|e| {
                        $crate::ConversionError::new(::std::any::type_name::<$ty>(), raw, e)
                    })
                }

                fn format_value(&self) -> ::std::string::String {
                    ::std::string::ToString::to_string(self)
                }
            }
        )+
    };
}

ini_value_from_str!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, Url, FixedOffset
);

impl IniValue for String {
    fn parse_value(raw: &str) -> Result<Self, ConversionError> {
        Ok(raw.to_owned())
    }

    fn format_value(&self) -> String {
        self.clone()
    }
}

impl IniValue for bool {
    fn parse_value(raw: &str) -> Result<Self, ConversionError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(ConversionError::new(
                "bool",
                raw,
                "expected true/false, yes/no, on/off or 1/0",
            )),
        }
    }

    fn format_value(&self) -> String {
        self.to_string()
    }
}

impl IniValue for char {
    fn parse_value(raw: &str) -> Result<Self, ConversionError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::new("char", raw, "expected exactly one character")),
        }
    }

    fn format_value(&self) -> String {
        self.to_string()
    }
}

impl IniValue for PathBuf {
    fn parse_value(raw: &str) -> Result<Self, ConversionError> {
        if raw.is_empty() {
            return Err(ConversionError::new("path", raw, "empty path"));
        }
        Ok(PathBuf::from(raw))
    }

    fn format_value(&self) -> String {
        self.to_string_lossy().into_owned()
    }
}
