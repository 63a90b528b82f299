//! Process-wide named properties, the namespace behind `${@prop/NAME}` placeholders.
//!
//! The table is seeded with a few platform facts (`os.name`, `os.arch`, `file.separator`,
//! `path.separator`, `line.separator`, `user.dir`) and can be extended at runtime. The process
//! environment, behind `${@env/NAME}`, is read through [`environment`].

use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::RwLock;

static PROPERTIES: LazyLock<RwLock<HashMap<String, String>>> = LazyLock::new(|| {
    let mut seed = HashMap::new();
    seed.insert("os.name".to_owned(), std::env::consts::OS.to_owned());
    seed.insert("os.arch".to_owned(), std::env::consts::ARCH.to_owned());
    seed.insert(
        "file.separator".to_owned(),
        std::path::MAIN_SEPARATOR.to_string(),
    );
    seed.insert(
        "path.separator".to_owned(),
        if cfg!(windows) { ";" } else { ":" }.to_owned(),
    );
    seed.insert(
        "line.separator".to_owned(),
        if cfg!(windows) { "\r\n" } else { "\n" }.to_owned(),
    );
    if let Ok(dir) = std::env::current_dir() {
        seed.insert("user.dir".to_owned(), dir.to_string_lossy().into_owned());
    }
    RwLock::new(seed)
});

#[must_use]
pub fn property(name: &str) -> Option<String> {
    PROPERTIES.read().get(name).cloned()
}

/// Sets `name`, returning its previous value.
pub fn set_property(name: impl Into<String>, value: impl Into<String>) -> Option<String> {
    PROPERTIES.write().insert(name.into(), value.into())
}

pub fn remove_property(name: &str) -> Option<String> {
    PROPERTIES.write().remove(name)
}

#[must_use]
pub fn environment(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_properties() {
        assert_eq!(property("os.name").as_deref(), Some(std::env::consts::OS));
        assert!(property("file.separator").is_some());
    }

    #[test]
    fn set_and_remove() {
        assert_eq!(set_property("props.test.key", "one"), None);
        assert_eq!(set_property("props.test.key", "two").as_deref(), Some("one"));
        assert_eq!(property("props.test.key").as_deref(), Some("two"));
        assert_eq!(remove_property("props.test.key").as_deref(), Some("two"));
        assert_eq!(property("props.test.key"), None);
    }
}
