//! Attributes of the start tag the parser is positioned on.
//!
//! The table is reset when the next start tag is parsed; attributes are only
//! meaningful while the current event is `START_TAG`.

use crate::name::{fast_hash, QName};
use crate::utils::ensure_room;

/// One attribute of the current start tag.
#[derive(Debug, Clone)]
pub(crate) struct AttributeEntry {
    /// Name as written in the document, `prefix:local` or `local`
    raw: String,
    /// Index of the prefix separator in `raw`, only when namespaces are processed
    colon: Option<usize>,
    /// Hash of the local name (namespaces processed) or of the raw name
    hash: u32,
    /// Namespace URI the prefix was resolved to, `""` when unprefixed
    uri: String,
    /// Value with references expanded and whitespace normalized
    value: String,
}

impl AttributeEntry {
    #[inline]
    pub fn raw_name(&self) -> &str {
        &self.raw
    }

    /// Name without prefix, or the raw name when namespaces are not processed.
    #[inline]
    pub fn name(&self) -> &str {
        match self.colon {
            Some(i) => &self.raw[i + 1..],
            None => &self.raw,
        }
    }

    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.colon.map(|i| &self.raw[..i])
    }

    #[inline]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Attributes of the current start tag in document order.
#[derive(Debug, Clone, Default)]
pub(crate) struct AttributeTable {
    entries: Vec<AttributeEntry>,
}

impl AttributeTable {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&AttributeEntry> {
        self.entries.get(index)
    }

    /// Appends an attribute. `split` tells if the name may carry a prefix.
    pub fn push(&mut self, raw: String, split: bool, value: String) {
        ensure_room(&mut self.entries, "attribute");
        let colon = if split { QName(&raw).index() } else { None };
        let hash = match colon {
            Some(i) => fast_hash(&raw[i + 1..]),
            None => fast_hash(&raw),
        };
        self.entries.push(AttributeEntry {
            raw,
            colon,
            hash,
            uri: String::new(),
            value,
        });
    }

    pub fn set_uri(&mut self, index: usize, uri: String) {
        if let Some(a) = self.entries.get_mut(index) {
            a.uri = uri;
        }
    }

    /// Finds the first pair of attributes that name the same attribute:
    /// same namespace URI and local name when `namespaces` is set, the same
    /// raw name otherwise. Returns indexes `(earlier, later)`.
    pub fn find_duplicate(&self, namespaces: bool) -> Option<(usize, usize)> {
        for (j, later) in self.entries.iter().enumerate().skip(1) {
            for (i, earlier) in self.entries[..j].iter().enumerate() {
                if earlier.hash != later.hash {
                    continue;
                }
                let same = if namespaces {
                    earlier.name() == later.name() && earlier.uri == later.uri
                } else {
                    earlier.raw == later.raw
                };
                if same {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Finds the value of an attribute.
    ///
    /// When `namespaces` is set, `name` is a local name and `namespace`, if
    /// given, must equal the resolved URI; otherwise `name` is the raw name
    /// and `namespace` is ignored.
    pub fn value_of(&self, namespaces: bool, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| {
                if namespaces {
                    a.name() == name && namespace.map_or(true, |ns| ns == a.uri)
                } else {
                    a.raw == name
                }
            })
            .map(|a| a.value.as_str())
    }
}
