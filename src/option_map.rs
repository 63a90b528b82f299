use log::warn;

use crate::bind::{Record, RecordReader, RecordWriter};
use crate::commented::{Category, CommentedMultiMap};
use crate::error::{Error, Result};
use crate::interpolate::{self, Grammar};
use crate::value::IniValue;

/// Read access to interpolated option values.
///
/// `fetch*` methods return values with their `${...}` placeholders expanded, as opposed to
/// the raw stored text returned by `get*` methods on the concrete types.
pub trait Fetch {
    /// Number of values stored under `key`.
    fn length(&self, key: &str) -> usize;

    /// The value at `index` after interpolation; `Ok(None)` for an option without a value.
    fn fetch_at(&self, key: &str, index: usize) -> Result<Option<String>>;

    /// The last value of `key` after interpolation.
    fn fetch(&self, key: &str) -> Option<String> {
        match self.length(key) {
            0 => None,
            len => self.fetch_at(key, len - 1).ok().flatten(),
        }
    }

    fn fetch_all(&self, key: &str) -> Vec<Option<String>> {
        (0..self.length(key))
            .map(|index| self.fetch_at(key, index).ok().flatten())
            .collect()
    }

    fn fetch_as<T: IniValue>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        self.fetch(key).map(|raw| convert(key, &raw)).transpose()
    }

    fn fetch_as_at<T: IniValue>(&self, key: &str, index: usize) -> Result<Option<T>>
    where
        Self: Sized,
    {
        self.fetch_at(key, index)?
            .map(|raw| convert(key, &raw))
            .transpose()
    }

    /// Like [`fetch_as`](Self::fetch_as), with `default` standing in for a missing key.
    fn fetch_or<T: IniValue>(&self, key: &str, default: T) -> Result<T>
    where
        Self: Sized,
    {
        Ok(self.fetch_as(key)?.unwrap_or(default))
    }

    /// Every value of `key` converted to `T`. Options without a value are skipped.
    fn fetch_all_as<T: IniValue>(&self, key: &str) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        self.fetch_all(key)
            .into_iter()
            .flatten()
            .map(|raw| convert(key, &raw))
            .collect()
    }
}

pub(crate) fn convert<T: IniValue>(key: &str, raw: &str) -> Result<T> {
    T::parse_value(raw).map_err(|source| Error::Conversion {
        key: key.to_owned(),
        value: raw.to_owned(),
        source,
    })
}

/// Ordered, commented, multi-valued `string -> string` options.
///
/// An option may exist without a value (a bare key in dialects that allow empty options);
/// such entries are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    options: CommentedMultiMap<Option<String>>,
}

impl OptionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    #[must_use]
    pub fn length(&self, key: &str) -> usize {
        self.options.length(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.options.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.options.iter()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.add(key, Some(value.into()));
    }

    /// Adds `key` without a value.
    pub fn add_empty(&mut self, key: impl Into<String>) {
        self.options.add(key, None);
    }

    pub fn add_raw(&mut self, key: impl Into<String>, value: Option<String>) {
        self.options.add(key, value);
    }

    pub fn add_at(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
        index: usize,
    ) -> Result<()> {
        self.options.add_at(key, Some(value.into()), index)
    }

    /// The raw last value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Option::as_deref)
    }

    pub fn get_at(&self, key: &str, index: usize) -> Result<Option<&str>> {
        self.options.get_at(key, index).map(Option::as_deref)
    }

    #[must_use]
    pub fn get_all(&self, key: &str) -> &[Option<String>] {
        self.options.get_all(key)
    }

    /// Replaces the last value of `key`, returning the previous one.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.options.put(key, Some(value.into())).flatten()
    }

    pub fn put_empty(&mut self, key: impl Into<String>) -> Option<String> {
        self.options.put(key, None).flatten()
    }

    pub fn put_raw(&mut self, key: impl Into<String>, value: Option<String>) -> Option<String> {
        self.options.put(key, value).flatten()
    }

    pub fn put_at(
        &mut self,
        key: &str,
        value: impl Into<String>,
        index: usize,
    ) -> Result<Option<String>> {
        self.options.put_at(key, Some(value.into()), index)
    }

    /// Replaces every value of `key`; no values removes the key.
    pub fn put_all<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(|v| Some(v.into())).collect();
        _ = self.options.put_all(key, values);
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<Option<String>>> {
        self.options.remove(key)
    }

    pub fn remove_at(&mut self, key: &str, index: usize) -> Result<Option<String>> {
        self.options.remove_at(key, index)
    }

    pub fn clear(&mut self) {
        self.options.clear();
    }

    #[must_use]
    pub fn comment(&self, key: &str) -> Option<&str> {
        self.options.comment(key)
    }

    pub fn put_comment(
        &mut self,
        key: impl Into<String>,
        comment: impl Into<String>,
    ) -> Option<String> {
        self.options.put_comment(key, comment)
    }

    pub fn remove_comment(&mut self, key: &str) -> Option<String> {
        self.options.remove_comment(key)
    }

    #[must_use]
    pub fn meta(&self, key: &str, category: &Category) -> Option<&str> {
        self.options.meta(key, category)
    }

    pub fn put_meta(
        &mut self,
        key: impl Into<String>,
        category: Category,
        text: impl Into<String>,
    ) -> Option<String> {
        self.options.put_meta(key, category, text)
    }

    pub fn remove_meta(&mut self, key: &str, category: Category) -> Option<String> {
        self.options.remove_meta(key, category)
    }

    /// The raw last value of `key` converted to `T`.
    pub fn get_as<T: IniValue>(&self, key: &str) -> Result<Option<T>> {
        self.get(key).map(|raw| convert(key, raw)).transpose()
    }

    pub fn get_as_at<T: IniValue>(&self, key: &str, index: usize) -> Result<Option<T>> {
        self.get_at(key, index)?
            .map(|raw| convert(key, raw))
            .transpose()
    }

    /// A missing key yields `default`; a present but unparseable value is still an error.
    pub fn get_or<T: IniValue>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get_as(key)?.unwrap_or(default))
    }

    pub fn get_all_as<T: IniValue>(&self, key: &str) -> Result<Vec<T>> {
        self.get_all(key)
            .iter()
            .flatten()
            .map(|raw| convert(key, raw))
            .collect()
    }

    pub fn put_value<T: IniValue>(&mut self, key: impl Into<String>, value: &T) -> Option<String> {
        self.put(key, value.format_value())
    }

    pub fn add_value<T: IniValue>(&mut self, key: impl Into<String>, value: &T) {
        self.add(key, value.format_value());
    }

    pub fn put_values<T: IniValue>(&mut self, key: impl Into<String>, values: &[T]) {
        self.put_all(key, values.iter().map(IniValue::format_value));
    }

    /// Copies matching options into `record`.
    pub fn to_record<R: Record>(&self, record: &mut R) -> Result<()> {
        self.to_record_prefixed("", record)
    }

    /// Copies options named `prefix` + field name into `record`.
    pub fn to_record_prefixed<R: Record>(&self, prefix: &str, record: &mut R) -> Result<()> {
        record.read_from(&mut RecordReader::new(self, prefix))
    }

    /// Copies the fields of `record` into this map.
    pub fn from_record<R: Record>(&mut self, record: &R) {
        self.from_record_prefixed("", record);
    }

    pub fn from_record_prefixed<R: Record>(&mut self, prefix: &str, record: &R) {
        record.write_to(&mut RecordWriter::new(self, prefix));
    }

    fn expand(&self, raw: &str, stack: &mut Vec<(String, usize)>) -> String {
        interpolate::resolve(raw, Grammar::Option, |reference| {
            if reference.is_external() {
                return reference.external();
            }

            let len = self.length(reference.option);
            let index = reference.index.unwrap_or(len.checked_sub(1)?);
            if index >= len {
                return None;
            }

            let frame = (reference.option.to_owned(), index);
            if stack.contains(&frame) {
                warn!("cyclic reference to {:?}[{index}] left unresolved", reference.option);
                return None;
            }

            stack.push(frame);
            let value = self
                .get_at(reference.option, index)
                .ok()
                .flatten()
                .map(|raw| self.expand(raw, stack));
            stack.pop();
            value
        })
    }
}

impl Fetch for OptionMap {
    fn length(&self, key: &str) -> usize {
        self.options.length(key)
    }

    fn fetch_at(&self, key: &str, index: usize) -> Result<Option<String>> {
        let Some(raw) = self.get_at(key, index)? else {
            return Ok(None);
        };
        let mut stack = vec![(key.to_owned(), index)];
        Ok(Some(self.expand(raw, &mut stack)))
    }
}
