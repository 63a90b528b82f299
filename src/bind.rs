//! Binding between option maps and typed records.
//!
//! A record lists its fields once, by name, in [`Record::read_from`] and
//! [`Record::write_to`]; the same names are used as option keys (optionally under a prefix).
//! For live access without copying, [`Property`] and [`MultiProperty`] describe a single typed
//! key that is parsed on every read and formatted on every write.
//!
//! ```
//! use inikit::{MultiProperty, OptionMap, Property, Record, RecordReader, RecordWriter, Result};
//!
//! #[derive(Default)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     aliases: Vec<String>,
//! }
//!
//! impl Record for Server {
//!     fn read_from(&mut self, reader: &mut RecordReader<'_>) -> Result<()> {
//!         reader.field("host", &mut self.host)?;
//!         reader.field("port", &mut self.port)?;
//!         reader.multi("alias", &mut self.aliases)
//!     }
//!
//!     fn write_to(&self, writer: &mut RecordWriter<'_>) {
//!         writer.field("host", &self.host);
//!         writer.field("port", &self.port);
//!         writer.multi("alias", &self.aliases);
//!     }
//! }
//!
//! let mut map = OptionMap::new();
//! map.add("host", "localhost");
//! map.add("port", "8080");
//!
//! let mut server = Server::default();
//! map.to_record(&mut server)?;
//! assert_eq!(server.port, 8080);
//!
//! const PORT: Property<u16> = Property::new("port");
//! PORT.set(&mut map, &9090);
//! assert_eq!(PORT.get(&map)?, Some(9090));
//!
//! const ALIAS: MultiProperty<String> = MultiProperty::new("alias");
//! ALIAS.add(&mut map, &"www".to_owned());
//! assert_eq!(ALIAS.get(&map)?, vec!["www".to_owned()]);
//! # Ok::<(), inikit::Error>(())
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::error::Result;
use crate::option_map::{Fetch, OptionMap, convert};
use crate::value::IniValue;

/// A type whose fields can be copied to and from an option map.
pub trait Record {
    /// Overwrites each field whose key is present; absent keys leave fields untouched.
    fn read_from(&mut self, reader: &mut RecordReader<'_>) -> Result<()>;

    fn write_to(&self, writer: &mut RecordWriter<'_>);
}

pub struct RecordReader<'a> {
    source: &'a dyn Fetch,
    prefix: &'a str,
}

impl<'a> RecordReader<'a> {
    #[must_use]
    pub fn new(source: &'a dyn Fetch, prefix: &'a str) -> Self {
        Self { source, prefix }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    pub fn field<T: IniValue>(&mut self, name: &str, field: &mut T) -> Result<()> {
        let key = self.key(name);
        if let Some(raw) = self.source.fetch(&key) {
            *field = convert(&key, &raw)?;
        }
        Ok(())
    }

    pub fn optional<T: IniValue>(&mut self, name: &str, field: &mut Option<T>) -> Result<()> {
        let key = self.key(name);
        if let Some(raw) = self.source.fetch(&key) {
            *field = Some(convert(&key, &raw)?);
        }
        Ok(())
    }

    /// Replaces `field` with every value of the key, when the key is present.
    pub fn multi<T: IniValue>(&mut self, name: &str, field: &mut Vec<T>) -> Result<()> {
        let key = self.key(name);
        if self.source.length(&key) == 0 {
            return Ok(());
        }

        *field = self
            .source
            .fetch_all(&key)
            .into_iter()
            .flatten()
            .map(|raw| convert(&key, &raw))
            .collect::<Result<_>>()?;
        Ok(())
    }
}

pub struct RecordWriter<'a> {
    map: &'a mut OptionMap,
    prefix: &'a str,
}

impl<'a> RecordWriter<'a> {
    #[must_use]
    pub fn new(map: &'a mut OptionMap, prefix: &'a str) -> Self {
        Self { map, prefix }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    pub fn field<T: IniValue>(&mut self, name: &str, value: &T) {
        let key = self.key(name);
        _ = self.map.put_value(key, value);
    }

    /// `None` removes the key.
    pub fn optional<T: IniValue>(&mut self, name: &str, value: Option<&T>) {
        let key = self.key(name);
        match value {
            Some(value) => {
                self.map.put_value(key, value);
            }
            None => {
                self.map.remove(&key);
            }
        }
    }

    pub fn multi<T: IniValue>(&mut self, name: &str, values: &[T]) {
        let key = self.key(name);
        self.map.put_values(key, values);
    }
}

/// A typed, single-valued option key.
pub struct Property<T> {
    key: &'static str,
    marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    #[must_use]
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub fn is_set(&self, source: &dyn Fetch) -> bool {
        source.length(self.key) > 0
    }

    pub fn remove(&self, map: &mut OptionMap) {
        _ = map.remove(self.key);
    }
}

impl<T: IniValue> Property<T> {
    pub fn get(&self, source: &dyn Fetch) -> Result<Option<T>> {
        source
            .fetch(self.key)
            .map(|raw| convert(self.key, &raw))
            .transpose()
    }

    pub fn get_or(&self, source: &dyn Fetch, default: T) -> Result<T> {
        Ok(self.get(source)?.unwrap_or(default))
    }

    pub fn set(&self, map: &mut OptionMap, value: &T) {
        _ = map.put_value(self.key, value);
    }
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Property<T> {}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.key).finish()
    }
}

/// A typed option key holding any number of values.
pub struct MultiProperty<T> {
    key: &'static str,
    marker: PhantomData<fn() -> T>,
}

impl<T> MultiProperty<T> {
    #[must_use]
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub fn len(&self, source: &dyn Fetch) -> usize {
        source.length(self.key)
    }
}

impl<T: IniValue> MultiProperty<T> {
    pub fn get(&self, source: &dyn Fetch) -> Result<Vec<T>> {
        source
            .fetch_all(self.key)
            .into_iter()
            .flatten()
            .map(|raw| convert(self.key, &raw))
            .collect()
    }

    pub fn get_at(&self, source: &dyn Fetch, index: usize) -> Result<Option<T>> {
        source
            .fetch_at(self.key, index)?
            .map(|raw| convert(self.key, &raw))
            .transpose()
    }

    pub fn set(&self, map: &mut OptionMap, values: &[T]) {
        map.put_values(self.key, values);
    }

    pub fn add(&self, map: &mut OptionMap, value: &T) {
        map.add_value(self.key, value);
    }
}

impl<T> Clone for MultiProperty<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MultiProperty<T> {}

impl<T> fmt::Debug for MultiProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MultiProperty").field(&self.key).finish()
    }
}
