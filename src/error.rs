use std::io;

use thiserror::Error;

use crate::value::ConversionError;

/// Every failure the document engine can report.
#[derive(Debug, Error)]
pub enum Error {
    /// The input text does not follow the grammar of its dialect.
    #[error("line {line_number}: {reason}: {line:?}")]
    InvalidFormat {
        line: String,
        line_number: usize,
        reason: String,
    },

    #[error("failed to read or write document")]
    Io {
        #[from]
        source: io::Error,
    },

    /// A non-optional `<include>` could not be opened.
    #[error("failed to include {location:?}")]
    Include {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid value {value:?} for {key:?}")]
    Conversion {
        key: String,
        value: String,
        #[source]
        source: ConversionError,
    },

    #[error("index {index} out of range for {key:?} ({len} values)")]
    IndexOutOfRange {
        key: String,
        index: usize,
        len: usize,
    },

    #[error("no section {0:?}")]
    NoSection(String),

    #[error("no option {option:?} in section {section:?}")]
    NoOption { section: String, option: String },

    #[error("section {0:?} already exists")]
    DuplicateSection(String),

    /// A strict interpolation referenced an option that does not exist.
    #[error("{section:?}/{option:?} references missing option {reference:?}")]
    MissingOption {
        section: String,
        option: String,
        reference: String,
    },

    #[error("interpolation of {section:?}/{option:?} is nested too deeply")]
    InterpolationDepth { section: String, option: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn invalid_format(
        line: &str,
        line_number: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFormat {
            line: line.to_owned(),
            line_number,
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(key: &str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange {
            key: key.to_owned(),
            index,
            len,
        }
    }

    /// Line number of a malformed-input failure.
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        match *self {
            Self::InvalidFormat { line_number, .. } => Some(line_number),
            _ => None,
        }
    }

    /// The offending line of a malformed-input failure.
    #[must_use]
    pub fn line(&self) -> Option<&str> {
        match self {
            Self::InvalidFormat { line, .. } => Some(line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
