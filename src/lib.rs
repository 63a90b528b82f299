#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Reading, editing and writing INI-style configuration documents.
//!
//! Four dialects share one event pipeline ([`Handler`]): nested INI files ([`Profile::ini`]),
//! Windows `.ini` files ([`Profile::wini`]), registry exports ([`Profile::reg`]) and sectionless
//! option files ([`Options`]). Documents keep their comments, their order and repeated keys, and
//! expand `${section/option}` placeholders on demand through [`Fetch`].
//!
//! Documents are plain values without internal locking; sharing one between threads is up to
//! the caller. The [`props`] table behind `${@prop/NAME}` is the only state guarded by a lock.
//!
//! ```
//! use inikit::{Dialect, Fetch, Profile};
//!
//! let text = "[server]\nhost = localhost\nurl = http://${host}/\n";
//! let profile = Profile::parse(Dialect::Ini, text)?;
//! let server = profile.get("server").expect("section exists");
//!
//! assert_eq!(server.get("url"), Some("http://${host}/"));
//! assert_eq!(server.fetch("url").as_deref(), Some("http://localhost/"));
//! # Ok::<(), inikit::Error>(())
//! ```

mod bind;
mod builder;
mod commented;
mod config;
mod config_parser;
mod dialect;
mod encoding;
mod error;
pub mod escape;
mod format;
mod interpolate;
mod multimap;
mod option_map;
mod options;
mod parser;
mod profile;
pub mod props;
pub mod reg;
mod section;
mod source;
mod value;

pub use bind::{MultiProperty, Property, Record, RecordReader, RecordWriter};
pub use commented::{Category, CommentedMultiMap};
pub use config::{Config, DEFAULT_GLOBAL_SECTION_NAME};
pub use config_parser::{ConfigParser, DEFAULT_SECTION};
pub use dialect::Dialect;
pub use encoding::Encoding;
pub use error::{Error, Result};
pub use multimap::OrderedMultiMap;
pub use option_map::{Fetch, OptionMap};
pub use options::Options;
pub use parser::Handler;
pub use profile::{Profile, SectionRef};
pub use reg::{RegType, TypeValuesPair};
pub use section::Section;
pub use value::{ConversionError, IniValue};

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn utf16_with_byte_order_mark() {
        let text = "[Section]\nkey = välue\n";
        let mut buffer = vec![0xFF, 0xFE];
        buffer.extend(text.encode_utf16().flat_map(u16::to_le_bytes));

        let profile =
            Profile::from_reader(Dialect::Ini, buffer.as_slice()).expect("valid UTF-16 document");

        assert_eq!(profile.get_value("Section", "key"), Some("välue"));
    }

    #[test]
    fn utf8_without_byte_order_mark() {
        let buffer = b"\n; This is a comment\n\n[Section]\nkey1 = value1\nkey2 = value2\n";

        let profile =
            Profile::from_reader(Dialect::Ini, &buffer[..]).expect("valid UTF-8 document");

        assert_eq!(profile.comment(), Some(" This is a comment"));
        assert_eq!(
            profile.get("Section").expect("section exists").keys().collect::<Vec<_>>(),
            vec!["key1", "key2"]
        );
    }

    #[test]
    fn registry_store_writes_utf16_with_byte_order_mark() {
        let mut profile = Profile::reg();
        profile.put_value(r"HKEY_CURRENT_USER\App", "Name", "x").expect("new section");

        let mut written = Vec::new();
        profile.store_writer(&mut written).expect("writes to memory");

        assert!(written.starts_with(&[0xFF, 0xFE]));
        let reread = Profile::from_reader(Dialect::Reg, written.as_slice()).expect("valid export");
        assert_eq!(reread, profile);
    }
}
