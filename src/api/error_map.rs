use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of an errorMap: `{ "type": "error", "message": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ErrorEntry {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Dotted error key (`lists.create.name`) to structured message.
///
/// Every JSON response carries one of these; an empty map means success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, ErrorEntry>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map holding a single error
    pub fn single(key: impl Into<String>, message: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.add_error(key, message);
        map
    }

    /// Record an error; a later error under the same key replaces the earlier one
    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), ErrorEntry::error(message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&ErrorEntry> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
