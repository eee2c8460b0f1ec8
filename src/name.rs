//! Names of elements, attributes and entities: character classes of the XML
//! `Name` production, splitting of [qualified names] and the hash used by the
//! parser's lookup tables.
//!
//! [qualified names]: https://www.w3.org/TR/xml-names/#dt-qualname

use memchr::memchr;
use std::fmt::{self, Debug, Formatter};

/// Checks whether `ch` may start an XML name.
#[inline]
pub fn is_name_start_char(ch: char) -> bool {
    matches!(ch,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{3FF}'
    ) || is_wide_name_char(ch)
}

/// Checks whether `ch` may appear inside an XML name after its first character.
#[inline]
pub fn is_name_char(ch: char) -> bool {
    matches!(ch,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '-' | '.' | '0'..='9' | '\u{B7}'
        | '\u{C0}'..='\u{36F}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{3FF}'
    ) || is_wide_name_char(ch)
}

/// Name characters at and above U+0400, where start and inner characters
/// are not distinguished.
#[inline]
fn is_wide_name_char(ch: char) -> bool {
    matches!(ch,
        '\u{400}'..='\u{2027}'
        | '\u{202A}'..='\u{218F}'
        | '\u{2800}'..='\u{FFEF}'
        | '\u{10000}'..='\u{EFFFF}'
    )
}

/// Checks whether `ch` is XML whitespace (`S` production).
#[inline]
pub const fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\n' | '\r' | '\t')
}

/// Hash of a name used to reject most mismatches in the entity, attribute
/// and namespace tables before comparing content.
///
/// Looks only at the first and last characters and, for longer names, at the
/// characters at a quarter and at half of the name.
pub fn fast_hash(name: &str) -> u32 {
    let mut chars = name.chars();
    let first = match chars.next() {
        Some(c) => c as u32,
        None => return 0,
    };
    let last = chars.next_back().map_or(first, |c| c as u32);
    let len = name.chars().count();
    let mut hash = first;
    hash = (hash << 7).wrapping_add(last);
    if len > 16 {
        let quarter = name.chars().nth(len / 4).map_or(0, |c| c as u32);
        hash = (hash << 7).wrapping_add(quarter);
    }
    if len > 8 {
        let half = name.chars().nth(len / 2).map_or(0, |c| c as u32);
        hash = (hash << 7).wrapping_add(half);
    }
    hash
}

////////////////////////////////////////////////////////////////////////////////////////////////////

/// A [qualified name] of an element or an attribute, including an optional
/// namespace prefix and a local name.
///
/// [qualified name]: https://www.w3.org/TR/xml-names/#dt-qualname
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QName<'a>(pub &'a str);
impl<'a> QName<'a> {
    /// Converts this name to an internal slice representation.
    #[inline(always)]
    pub fn into_inner(self) -> &'a str {
        self.0
    }

    /// Returns the index in the name where prefix ended
    #[inline(always)]
    pub fn index(&self) -> Option<usize> {
        memchr(b':', self.0.as_bytes())
    }

    /// Returns the part of the name before the colon, if the name has one.
    ///
    /// ```
    /// # use xml_pull::name::QName;
    /// assert_eq!(QName("soap:Envelope").prefix(), Some("soap"));
    /// assert_eq!(QName("Envelope").prefix(), None);
    /// ```
    #[inline]
    pub fn prefix(&self) -> Option<&'a str> {
        self.index().map(|i| &self.0[..i])
    }

    /// Returns the part of the name after the colon, or the whole name.
    #[inline]
    pub fn local_name(&self) -> &'a str {
        self.index().map_or(self.0, |i| &self.0[i + 1..])
    }
}
impl<'a> Debug for QName<'a> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "QName({:?})", self.0)
    }
}
impl<'a> AsRef<str> for QName<'a> {
    #[inline]
    fn as_ref(&self) -> &str {
        self.0
    }
}
