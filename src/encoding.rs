use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Byte Order Marks, longest first so UTF-32 LE is not mistaken for UTF-16 LE.
///
/// <https://en.wikipedia.org/wiki/Byte_order_mark>
const BOMS: &[(&[u8], Encoding)] = &[
    (&[0x00, 0x00, 0xFE, 0xFF], Encoding::Utf32Be),
    (&[0xFF, 0xFE, 0x00, 0x00], Encoding::Utf32Le),
    (&[0xEF, 0xBB, 0xBF], Encoding::Utf8),
    (&[0xFE, 0xFF], Encoding::Utf16Be),
    (&[0xFF, 0xFE], Encoding::Utf16Le),
];

/// Text encodings a document can be read from or written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    /// ISO-8859-1.
    Latin1,
}

impl Encoding {
    /// Probes the first (up to) four bytes for a Byte Order Mark.
    ///
    /// Returns the encoding together with the number of BOM bytes to skip.
    #[must_use]
    pub fn detect(data: &[u8]) -> Option<(Self, usize)> {
        BOMS.iter()
            .find(|(bom, _)| data.starts_with(bom))
            .map(|&(bom, encoding)| (encoding, bom.len()))
    }

    #[must_use]
    pub fn bom(self) -> &'static [u8] {
        BOMS.iter()
            .find(|&&(_, encoding)| encoding == self)
            .map_or(&[][..], |&(bom, _)| bom)
    }

    /// Decodes `data`, honouring a leading BOM before falling back to `self`.
    #[must_use]
    pub fn decode_with_bom(self, data: &[u8]) -> String {
        match Self::detect(data) {
            Some((detected, skip)) => detected.decode(&data[skip..]),
            None => self.decode(data),
        }
    }

    /// Decodes `data` without looking for a BOM. Malformed sequences become U+FFFD.
    #[must_use]
    pub fn decode(self, data: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(data).into_owned(),
            Self::Utf16Le => decode_utf16(data, u16::from_le_bytes),
            Self::Utf16Be => decode_utf16(data, u16::from_be_bytes),
            Self::Utf32Le => decode_utf32(data, u32::from_le_bytes),
            Self::Utf32Be => decode_utf32(data, u32::from_be_bytes),
            Self::Latin1 => data.iter().map(|&b| char::from(b)).collect(),
        }
    }

    /// Encodes `text`. Characters outside ISO-8859-1 are written as `?` in [`Self::Latin1`].
    #[must_use]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            Self::Utf32Le => text.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect(),
            Self::Utf32Be => text.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect(),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }

    /// Whether a written document should start with a BOM.
    #[must_use]
    pub fn writes_bom(self) -> bool {
        !matches!(self, Self::Utf8 | Self::Latin1)
    }
}

fn decode_utf16(data: &[u8], from_bytes: fn([u8; 2]) -> u16) -> String {
    let units = data
        .chunks_exact(2)
        .map(|chunk| from_bytes([chunk[0], chunk[1]]))
        .collect::<Vec<u16>>();

    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn decode_utf32(data: &[u8], from_bytes: fn([u8; 4]) -> u32) -> String {
    data.chunks_exact(4)
        .map(|chunk| from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .map(|unit| char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Utf8 => "UTF-8".fmt(f),
            Self::Utf16Le => "UTF-16LE".fmt(f),
            Self::Utf16Be => "UTF-16BE".fmt(f),
            Self::Utf32Le => "UTF-32LE".fmt(f),
            Self::Utf32Be => "UTF-32BE".fmt(f),
            Self::Latin1 => "ISO-8859-1".fmt(f),
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_uppercase().replace('_', "-");
        match normalized.as_str() {
            "UTF-8" | "UTF8" => Ok(Self::Utf8),
            "UTF-16LE" | "UTF-16" => Ok(Self::Utf16Le),
            "UTF-16BE" => Ok(Self::Utf16Be),
            "UTF-32LE" | "UTF-32" => Ok(Self::Utf32Le),
            "UTF-32BE" => Ok(Self::Utf32Be),
            "ISO-8859-1" | "LATIN1" | "LATIN-1" => Ok(Self::Latin1),
            _ => Err(Error::InvalidArgument(format!("unsupported encoding {s:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_every_bom() {
        assert_eq!(Encoding::detect(&[0, 0, 0xFE, 0xFF, 0]), Some((Encoding::Utf32Be, 4)));
        assert_eq!(Encoding::detect(&[0xFF, 0xFE, 0, 0]), Some((Encoding::Utf32Le, 4)));
        assert_eq!(Encoding::detect(&[0xEF, 0xBB, 0xBF, b'a']), Some((Encoding::Utf8, 3)));
        assert_eq!(Encoding::detect(&[0xFE, 0xFF, 0, b'a']), Some((Encoding::Utf16Be, 2)));
        assert_eq!(Encoding::detect(&[0xFF, 0xFE, b'a', 0]), Some((Encoding::Utf16Le, 2)));
        assert_eq!(Encoding::detect(b"[a]"), None);
    }

    #[test]
    fn unmarked_data_uses_fallback() {
        let data = [b'[', 0xE9, b']'];
        assert_eq!(Encoding::Latin1.decode_with_bom(&data), "[é]");
    }

    #[test]
    fn utf16_with_bom() {
        let mut data = Encoding::Utf16Le.bom().to_vec();
        data.extend(Encoding::Utf16Le.encode("[sé]"));

        assert_eq!(Encoding::Utf8.decode_with_bom(&data), "[sé]");
    }

    #[test]
    fn utf32_big_endian() {
        let data = Encoding::Utf32Be.encode("k=v");
        assert_eq!(Encoding::Utf32Be.decode(&data), "k=v");
    }

    #[test]
    fn names() {
        assert_eq!("utf-16le".parse::<Encoding>().expect("known name"), Encoding::Utf16Le);
        assert_eq!(Encoding::Latin1.to_string(), "ISO-8859-1");
        assert!("EBCDIC".parse::<Encoding>().is_err());
    }
}
