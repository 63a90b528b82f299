use std::sync::LazyLock;

use crate::encoding::Encoding;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Name of the pseudo-section collecting options that precede the first header.
pub const DEFAULT_GLOBAL_SECTION_NAME: &str = "?";

static GLOBAL: LazyLock<Config> = LazyLock::new(Config::default);

/// Dialect toggles shared by parsing, formatting and navigation.
///
/// Each dialect clones [`Config::global`] and overrides a few fields, so a `Config` is usually
/// built with struct update syntax:
///
/// ```
/// use inikit::Config;
///
/// let config = Config {
///     multi_option: false,
///     ..Config::global().clone()
/// };
/// assert!(!config.multi_option);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Keep comments while parsing and write them back out.
    pub comment: bool,
    /// Accept option lines without an operator; such options hold no value.
    pub empty_option: bool,
    /// Write sections that contain no options.
    pub empty_section: bool,
    /// Process backslash escapes in names and values.
    pub escape: bool,
    /// A line ending in an odd number of backslashes continues on the next line.
    pub escape_newline: bool,
    /// Options before the first header go to [`Self::global_section_name`].
    pub global_section: bool,
    pub global_section_name: String,
    /// Resolve `<location>` and `<?location>` lines as nested documents.
    pub include: bool,
    pub lower_case_option: bool,
    pub lower_case_section: bool,
    /// Repeated option keys accumulate values instead of replacing the last one.
    pub multi_option: bool,
    /// Repeated section headers create sibling sections instead of merging.
    pub multi_section: bool,
    /// Write `key=value` instead of `key = value`.
    pub strict_operator: bool,
    /// Section names containing [`Self::path_separator`] form a tree.
    pub tree: bool,
    /// Accept `[]` as a section header.
    pub unnamed_section: bool,
    /// The first comment block of a document belongs to the document.
    pub header_comment: bool,
    /// Encoding used when no Byte Order Mark is present, and for writing.
    pub file_encoding: Encoding,
    pub line_separator: String,
    pub path_separator: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            comment: true,
            empty_option: false,
            empty_section: false,
            escape: true,
            escape_newline: true,
            global_section: false,
            global_section_name: DEFAULT_GLOBAL_SECTION_NAME.to_owned(),
            include: false,
            lower_case_option: false,
            lower_case_section: false,
            multi_option: true,
            multi_section: false,
            strict_operator: false,
            tree: true,
            unnamed_section: false,
            header_comment: true,
            file_encoding: Encoding::Utf8,
            line_separator: LINE_ENDING.to_owned(),
            path_separator: '/',
        }
    }
}

impl Config {
    /// The process-wide defaults every dialect starts from.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub(crate) fn is_global_section(&self, name: &str) -> bool {
        self.global_section && name == self.global_section_name
    }
}
