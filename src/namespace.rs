//! Store key naming and the index entry format.
//!
//! The index key is the namespace itself; a record key is
//! `namespace + "-" + id`. The index entry joins member ids with `,` and does
//! no escaping, so an id containing a comma corrupts the index.

use std::fmt;

use crate::error::Error;

pub const RECORD_KEY_SEPARATOR: char = '-';
pub const INDEX_DELIMITER: char = ',';

/// The caller-supplied string scoping every key of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Validate and wrap a namespace. Empty namespaces are rejected.
    pub fn new(namespace: impl Into<String>) -> Result<Self, Error> {
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(Error::Config("`store_id` must be defined".into()));
        }
        Ok(Self(namespace))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key holding the index entry.
    pub fn index_key(&self) -> &str {
        &self.0
    }

    /// Key holding the persisted value of record `id`.
    pub fn record_key(&self, id: &str) -> String {
        format!("{}{}{}", self.0, RECORD_KEY_SEPARATOR, id)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of member ids as stored at the index key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexEntry {
    ids: Vec<String>,
}

impl IndexEntry {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a stored index value. Absent or empty means no members.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) if !raw.is_empty() => Self::new(raw.split(INDEX_DELIMITER)),
            _ => Self::default(),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<String> {
        self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// The stored string form.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                out.push(INDEX_DELIMITER);
            }
            out.push_str(id);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys() {
        let ns = Namespace::new("todos").unwrap();
        assert_eq!(ns.index_key(), "todos");
        assert_eq!(ns.record_key("42"), "todos-42");
    }

    #[test]
    fn empty_namespace_is_a_config_error() {
        let err = Namespace::new("").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn index_entry_encodes_in_order() {
        let index = IndexEntry::new(["b", "a", "c"]);
        assert_eq!(index.encode(), "b,a,c");
        assert_eq!(IndexEntry::new(Vec::<String>::new()).encode(), "");
    }

    #[test]
    fn index_entry_parses_absent_and_empty_as_no_members() {
        assert!(IndexEntry::parse(None).is_empty());
        assert!(IndexEntry::parse(Some("")).is_empty());
    }

    #[test]
    fn index_entry_parse_splits_on_delimiter() {
        let index = IndexEntry::parse(Some("x,y"));
        assert_eq!(index.ids(), ["x".to_string(), "y".to_string()]);
        assert!(index.contains("y"));
        assert!(!index.contains("z"));
    }
}
