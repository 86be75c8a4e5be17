use serde::Serialize;
use std::collections::BTreeMap;

/// String key/value entries attached to a compressed attribute. The ordered
/// map keeps serialized output stable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn add_entry(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    pub fn get_entry(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether the entry under `key` equals `value`.
    pub fn entry_matches(&self, key: &str, value: &str) -> bool {
        self.get_entry(key) == Some(value)
    }
}
