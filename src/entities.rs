//! Named entities the parser can expand in addition to the predefined ones.

use crate::escape::{parse_char_ref, resolve_predefined_entity, EscapeError};
use crate::name::fast_hash;
use crate::utils::ensure_room;
use std::borrow::Cow;

/// Names of the XHTML Latin-1 characters, from U+00A0 (`nbsp`) to U+00FF (`yuml`).
const LATIN1_NAMES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect", "uml", "copy", "ordf",
    "laquo", "not", "shy", "reg", "macr", "deg", "plusmn", "sup2", "sup3", "acute", "micro",
    "para", "middot", "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil", "Egrave", "Eacute",
    "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml", "ETH", "Ntilde", "Ograve", "Oacute",
    "Ocirc", "Otilde", "Ouml", "times", "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute",
    "THORN", "szlig", "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml", "eth", "ntilde",
    "ograve", "oacute", "ocirc", "otilde", "ouml", "divide", "oslash", "ugrave", "uacute",
    "ucirc", "uuml", "yacute", "thorn", "yuml",
];

/// A reusable set of entity definitions.
///
/// Every time a parser created with [`PullParser::with_entity_map`] is given
/// a new input, its entity table starts as a copy of this map.
///
/// ```
/// use xml_pull::{EntityMap, EventType, PullParser};
///
/// let mut map = EntityMap::new();
/// map.insert("product", "xml-pull");
///
/// let mut parser = PullParser::with_entity_map(map);
/// parser.set_input_str("<p>&product;&#x21;</p>");
/// assert_eq!(parser.next().unwrap(), EventType::StartTag);
/// assert_eq!(parser.next().unwrap(), EventType::Text);
/// assert_eq!(parser.text(), Some("xml-pull!"));
/// ```
///
/// [`PullParser::with_entity_map`]: crate::PullParser::with_entity_map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityMap {
    entries: Vec<(String, String)>,
}

impl EntityMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map with the 96 named characters of the XHTML Latin-1 set
    /// (`&nbsp;` to `&yuml;`).
    pub fn xhtml_latin1() -> Self {
        let entries = LATIN1_NAMES
            .iter()
            .zip('\u{A0}'..='\u{FF}')
            .map(|(name, ch)| (name.to_string(), ch.to_string()))
            .collect();
        Self { entries }
    }

    /// Adds a definition. Later definitions of the same name win.
    pub fn insert(&mut self, name: impl Into<String>, replacement: impl Into<String>) {
        self.entries.push((name.into(), replacement.into()));
    }

    /// Returns the number of definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no definitions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
struct EntityEntry {
    name: String,
    hash: u32,
    replacement: String,
}

/// Entities defined for the current input, searched newest first.
#[derive(Debug, Clone, Default)]
pub(crate) struct EntityTable {
    entries: Vec<EntityEntry>,
}

impl EntityTable {
    /// Replaces the table content by the definitions of `map`.
    pub fn reset(&mut self, map: Option<&EntityMap>) {
        self.entries.clear();
        if let Some(map) = map {
            for (name, replacement) in &map.entries {
                self.define(name, replacement.clone());
            }
        }
    }

    pub fn define(&mut self, name: &str, replacement: String) {
        ensure_room(&mut self.entries, "entity");
        self.entries.push(EntityEntry {
            name: name.to_string(),
            hash: fast_hash(name),
            replacement,
        });
    }

    /// Finds the newest definition of `name`, returns its index.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        let hash = fast_hash(name);
        self.entries
            .iter()
            .rposition(|e| e.hash == hash && e.name == name)
    }

    #[inline]
    pub fn replacement(&self, index: usize) -> &str {
        self.entries
            .get(index)
            .map_or("", |e| e.replacement.as_str())
    }

    /// Computes what a new definition should expand to.
    ///
    /// When `text` consists of exactly one reference, the reference is resolved
    /// now: a character reference to its character, a predefined entity to its
    /// replacement and a name defined earlier to that entity's replacement.
    /// Anything else is stored literally.
    pub fn expand_definition<'t>(&self, text: &'t str) -> Result<Cow<'t, str>, EscapeError> {
        let body = match text
            .strip_prefix('&')
            .and_then(|t| t.strip_suffix(';'))
        {
            Some(body) if !body.is_empty() && !body.contains(['&', ';']) => body,
            _ => return Ok(Cow::Borrowed(text)),
        };
        if let Some(digits) = body.strip_prefix("#x") {
            return parse_char_ref(digits, true).map(|c| Cow::Owned(c.to_string()));
        }
        if let Some(digits) = body.strip_prefix('#') {
            return parse_char_ref(digits, false).map(|c| Cow::Owned(c.to_string()));
        }
        if let Some(s) = resolve_predefined_entity(body) {
            return Ok(Cow::Borrowed(s));
        }
        Ok(match self.lookup(body) {
            Some(i) => Cow::Owned(self.replacement(i).to_string()),
            None => Cow::Borrowed(text),
        })
    }
}
