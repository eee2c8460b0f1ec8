//! Namespace bindings of the elements currently open.
//!
//! Bindings are kept in a flat list in declaration order. Each open element
//! remembers how long the list was when its start tag was finished, so leaving
//! an element shortens the list back to the length its parent saw.

use crate::name::fast_hash;
use crate::utils::ensure_room;

/// URI bound to the `xml` prefix by definition.
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// URI bound to the `xmlns` prefix by definition.
pub const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";

#[derive(Debug, Clone)]
struct NamespaceEntry {
    /// Declared prefix, `""` for the default namespace
    prefix: String,
    hash: u32,
    uri: String,
}

/// Flat table of `(prefix, URI)` declarations of all open elements.
#[derive(Debug, Clone, Default)]
pub(crate) struct NamespaceTable {
    entries: Vec<NamespaceEntry>,
}

impl NamespaceTable {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops all declarations made after the table had `len` entries.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Appends a declaration. The empty prefix declares the default namespace.
    pub fn push(&mut self, prefix: &str, uri: String) {
        ensure_room(&mut self.entries, "namespace");
        self.entries.push(NamespaceEntry {
            prefix: prefix.to_string(),
            hash: fast_hash(prefix),
            uri,
        });
    }

    /// Checks whether `prefix` was declared by one of the entries from
    /// `start` onwards, that is, in the scope of the element being parsed.
    pub fn is_declared_since(&self, start: usize, prefix: &str) -> bool {
        let hash = fast_hash(prefix);
        self.entries
            .get(start..)
            .unwrap_or_default()
            .iter()
            .any(|e| e.hash == hash && e.prefix == prefix)
    }

    /// Finds the URI bound to `prefix` by the nearest enclosing declaration.
    ///
    /// The reserved `xml` and `xmlns` prefixes resolve to [`XML_URI`] and
    /// [`XMLNS_URI`] when they were not declared explicitly. `None` is returned
    /// for an unbound prefix; for the empty prefix that means no default
    /// namespace is in scope.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        let hash = fast_hash(prefix);
        if let Some(e) = self
            .entries
            .iter()
            .rev()
            .find(|e| e.hash == hash && e.prefix == prefix)
        {
            return Some(&e.uri);
        }
        match prefix {
            "xml" => Some(XML_URI),
            "xmlns" => Some(XMLNS_URI),
            _ => None,
        }
    }

    /// Prefix of the declaration at `pos`, `""` for a default namespace.
    pub fn prefix(&self, pos: usize) -> Option<&str> {
        self.entries.get(pos).map(|e| e.prefix.as_str())
    }

    /// URI of the declaration at `pos`.
    pub fn uri(&self, pos: usize) -> Option<&str> {
        self.entries.get(pos).map(|e| e.uri.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nearest_scope_wins() {
        let mut table = NamespaceTable::default();
        table.push("a", "urn:outer".into());
        table.push("", "urn:default".into());
        let outer = table.len();
        table.push("a", "urn:inner".into());

        assert_eq!(table.resolve("a"), Some("urn:inner"));
        assert_eq!(table.resolve(""), Some("urn:default"));

        table.truncate(outer);
        assert_eq!(table.resolve("a"), Some("urn:outer"));
        assert_eq!(table.resolve("b"), None);
    }

    #[test]
    fn reserved_prefixes() {
        let table = NamespaceTable::default();
        assert_eq!(table.resolve("xml"), Some(XML_URI));
        assert_eq!(table.resolve("xmlns"), Some(XMLNS_URI));
        assert_eq!(table.resolve(""), None);
    }

    #[test]
    fn scope_of_current_element() {
        let mut table = NamespaceTable::default();
        table.push("p", "urn:parent".into());
        let start = table.len();
        table.push("", "urn:child".into());

        assert!(!table.is_declared_since(start, "p"));
        assert!(table.is_declared_since(start, ""));
        assert!(table.is_declared_since(0, "p"));
        assert_eq!(table.prefix(1), Some(""));
        assert_eq!(table.uri(0), Some("urn:parent"));
        assert_eq!(table.uri(2), None);
    }
}
