//! A strict, Python `ConfigParser` style view of a sectioned document.
//!
//! Differences from [`Profile`]:
//! * option names are case-insensitive (stored lower-cased);
//! * a `DEFAULT` section supplies values to every other section;
//! * values use `%(name)s` interpolation, and a reference that cannot be resolved is an error;
//! * operations on missing sections or options fail instead of returning nothing.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use crate::config::Config;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::option_map::convert;
use crate::profile::Profile;
use crate::value::IniValue;

/// Name of the section whose options every other section inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Nesting of `%(name)s` references before giving up.
const MAX_INTERPOLATION_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigParser {
    profile: Profile,
}

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser {
    #[must_use]
    pub fn new() -> Self {
        let config = Config {
            empty_section: true,
            escape: false,
            escape_newline: false,
            lower_case_option: true,
            multi_option: false,
            multi_section: false,
            tree: false,
            ..Dialect::Ini.config()
        };
        Self {
            profile: Profile::with_config(Dialect::Ini, config),
        }
    }

    /// Reads more sections and options; later values override earlier ones.
    pub fn read_str(&mut self, text: &str) -> Result<()> {
        self.profile.load_str(text)
    }

    pub fn read_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.profile.load_path(path)
    }

    pub fn read_reader(&mut self, reader: impl Read) -> Result<()> {
        self.profile.load_reader(reader)
    }

    pub fn write(&self, writer: impl Write) -> Result<()> {
        self.profile.store_writer(writer)
    }

    pub fn to_text(&self) -> Result<String> {
        self.profile.to_text()
    }

    /// The underlying document.
    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Options of the `DEFAULT` section, raw.
    #[must_use]
    pub fn defaults(&self) -> Vec<(&str, &str)> {
        self.profile
            .get(DEFAULT_SECTION)
            .map(|defaults| {
                let section = defaults.section();
                section
                    .keys()
                    .filter_map(|key| Some((key, section.get(key)?)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Section names, `DEFAULT` excluded.
    #[must_use]
    pub fn sections(&self) -> Vec<&str> {
        self.profile
            .keys()
            .filter(|&name| name != DEFAULT_SECTION)
            .collect()
    }

    pub fn add_section(&mut self, name: &str) -> Result<()> {
        if name.eq_ignore_ascii_case(DEFAULT_SECTION) {
            return Err(Error::InvalidArgument(format!("invalid section name {name:?}")));
        }
        self.profile.add(name).map(|_| ())
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        name != DEFAULT_SECTION && self.profile.contains(name)
    }

    pub fn remove_section(&mut self, name: &str) -> bool {
        self.profile.remove(name).is_some()
    }

    /// Option names of `section` followed by inherited defaults it does not override.
    pub fn options(&self, section: &str) -> Result<Vec<String>> {
        let own = self.section(section)?;
        let mut names = own.keys().map(str::to_owned).collect::<Vec<_>>();
        for (name, _) in self.defaults() {
            if !own.contains_key(name) {
                names.push(name.to_owned());
            }
        }
        Ok(names)
    }

    #[must_use]
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        let option = option.to_lowercase();
        let in_defaults = || {
            self.profile
                .get(DEFAULT_SECTION)
                .is_some_and(|defaults| defaults.contains_key(&option))
        };

        if section.is_empty() || section == DEFAULT_SECTION {
            return in_defaults();
        }
        self.profile
            .get(section)
            .is_some_and(|own| own.contains_key(&option) || in_defaults())
    }

    /// The value of `option` without interpolation.
    pub fn get_raw(&self, section: &str, option: &str) -> Result<String> {
        let option = option.to_lowercase();
        let own = self.section(section)?;
        own.get(&option)
            .or_else(|| self.profile.get_value(DEFAULT_SECTION, &option))
            .map(str::to_owned)
            .ok_or_else(|| Error::NoOption {
                section: section.to_owned(),
                option,
            })
    }

    /// The value of `option` with `%(name)s` references resolved.
    pub fn get(&self, section: &str, option: &str) -> Result<String> {
        self.get_with_vars(section, option, &HashMap::new())
    }

    /// Like [`get`](Self::get); `vars` take precedence over the section and its defaults.
    pub fn get_with_vars(
        &self,
        section: &str,
        option: &str,
        vars: &HashMap<String, String>,
    ) -> Result<String> {
        let option = option.to_lowercase();
        let raw = match vars.get(&option) {
            Some(value) => value.clone(),
            None => self.get_raw(section, &option)?,
        };
        self.interpolate(section, &option, &raw, vars)
    }

    pub fn get_int(&self, section: &str, option: &str) -> Result<i64> {
        self.get_as(section, option)
    }

    pub fn get_float(&self, section: &str, option: &str) -> Result<f64> {
        self.get_as(section, option)
    }

    /// Accepts `1`/`yes`/`true`/`on` and `0`/`no`/`false`/`off`, ignoring case.
    pub fn get_boolean(&self, section: &str, option: &str) -> Result<bool> {
        self.get_as(section, option)
    }

    pub fn get_as<T: IniValue>(&self, section: &str, option: &str) -> Result<T> {
        let value = self.get(section, option)?;
        convert(option, &value)
    }

    /// Every option of `section`, defaults included, interpolated.
    pub fn items(&self, section: &str) -> Result<Vec<(String, String)>> {
        self.options(section)?
            .into_iter()
            .map(|name| {
                let value = self.get(section, &name)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Sets an option in an existing section, or in `DEFAULT`.
    pub fn set(&mut self, section: &str, option: &str, value: impl Into<String>) -> Result<()> {
        let option = option.to_lowercase();
        let target = if section.is_empty() { DEFAULT_SECTION } else { section };

        if target == DEFAULT_SECTION {
            _ = self.profile.put_value(DEFAULT_SECTION, &option, value)?;
            return Ok(());
        }

        let own = self
            .profile
            .get_mut(target)
            .ok_or_else(|| Error::NoSection(target.to_owned()))?;
        _ = own.put(option, value);
        Ok(())
    }

    /// Returns whether the option existed.
    pub fn remove_option(&mut self, section: &str, option: &str) -> Result<bool> {
        let option = option.to_lowercase();
        let target = if section.is_empty() { DEFAULT_SECTION } else { section };
        match self.profile.get_mut(target) {
            Some(own) => Ok(own.remove(&option).is_some()),
            None if target == DEFAULT_SECTION => Ok(false),
            None => Err(Error::NoSection(target.to_owned())),
        }
    }

    fn section(&self, name: &str) -> Result<crate::profile::SectionRef<'_>> {
        if name == DEFAULT_SECTION {
            return Err(Error::NoSection(name.to_owned()));
        }
        self.profile
            .get(name)
            .ok_or_else(|| Error::NoSection(name.to_owned()))
    }

    /// Looks `name` up in `vars`, the section, then the defaults.
    fn lookup(&self, section: &str, name: &str, vars: &HashMap<String, String>) -> Option<String> {
        vars.get(name)
            .map(String::as_str)
            .or_else(|| self.profile.get_value(section, name))
            .or_else(|| self.profile.get_value(DEFAULT_SECTION, name))
            .map(str::to_owned)
    }

    /// Substitutes `%(name)s` references, expanding referenced values in turn; `%%` stands for `%`.
    fn interpolate(
        &self,
        section: &str,
        option: &str,
        raw: &str,
        vars: &HashMap<String, String>,
    ) -> Result<String> {
        self.substitute(section, option, raw, vars, 1)
    }

    fn substitute(
        &self,
        section: &str,
        option: &str,
        value: &str,
        vars: &HashMap<String, String>,
        depth: usize,
    ) -> Result<String> {
        if depth > MAX_INTERPOLATION_DEPTH {
            return Err(Error::InterpolationDepth {
                section: section.to_owned(),
                option: option.to_owned(),
            });
        }

        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(position) = rest.find('%') {
            out.push_str(&rest[..position]);
            let tail = &rest[position..];

            if let Some(after) = tail.strip_prefix("%%") {
                out.push('%');
                rest = after;
            } else if let Some((name, after)) = tail
                .strip_prefix("%(")
                .and_then(|t| t.split_once(")s"))
            {
                let name = name.to_lowercase();
                let replacement = self.lookup(section, &name, vars).ok_or_else(|| {
                    Error::MissingOption {
                        section: section.to_owned(),
                        option: option.to_owned(),
                        reference: name.clone(),
                    }
                })?;
                out.push_str(&self.substitute(section, option, &replacement, vars, depth + 1)?);
                rest = after;
            } else {
                out.push('%');
                rest = &tail[1..];
            }
        }

        out.push_str(rest);
        Ok(out)
    }
}
