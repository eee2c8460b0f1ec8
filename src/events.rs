//! Kinds of events reported by the parser.

use std::fmt;

/// Kind of the event the parser is positioned on.
///
/// [`PullParser::next`] only reports [`StartDocument`], [`StartTag`], [`Text`],
/// [`EndTag`] and [`EndDocument`]; [`PullParser::next_token`] reports all kinds.
///
/// [`PullParser::next`]: crate::PullParser::next
/// [`PullParser::next_token`]: crate::PullParser::next_token
/// [`StartDocument`]: Self::StartDocument
/// [`StartTag`]: Self::StartTag
/// [`Text`]: Self::Text
/// [`EndTag`]: Self::EndTag
/// [`EndDocument`]: Self::EndDocument
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum EventType {
    /// Nothing was read yet
    StartDocument,
    /// The input ended after a complete document
    EndDocument,
    /// Start tag `<name attr="value">` or empty element `<name/>`
    StartTag,
    /// End tag `</name>`, also reported after an empty element
    EndTag,
    /// Character data
    Text,
    /// `<![CDATA[...]]>` section
    CData,
    /// Reference `&name;` or `&#NN;`
    EntityRef,
    /// Whitespace outside of the root element
    IgnorableWhitespace,
    /// Processing instruction `<?target data?>`, including the XML declaration
    ProcessingInstruction,
    /// `<!-- comment -->`
    Comment,
    /// `<!DOCTYPE ...>` declaration
    Docdecl,
}

impl EventType {
    /// Returns the conventional upper-case name of the event kind, as used in
    /// diagnostics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventType::StartDocument => "START_DOCUMENT",
            EventType::EndDocument => "END_DOCUMENT",
            EventType::StartTag => "START_TAG",
            EventType::EndTag => "END_TAG",
            EventType::Text => "TEXT",
            EventType::CData => "CDSECT",
            EventType::EntityRef => "ENTITY_REF",
            EventType::IgnorableWhitespace => "IGNORABLE_WHITESPACE",
            EventType::ProcessingInstruction => "PROCESSING_INSTRUCTION",
            EventType::Comment => "COMMENT",
            EventType::Docdecl => "DOCDECL",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of the XML declaration `<?xml version="1.0" ...?>`, if the
/// document had one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub struct XmlDecl {
    /// Value of the `version` pseudo-attribute
    pub version: Option<String>,
    /// Value of the `encoding` pseudo-attribute
    pub encoding: Option<String>,
    /// Value of the `standalone` pseudo-attribute
    pub standalone: Option<bool>,
    /// Everything between `<?xml` and `?>`
    pub content: Option<String>,
}

#[test]
fn names() {
    assert_eq!(EventType::CData.to_string(), "CDSECT");
    assert_eq!(EventType::StartTag.as_str(), "START_TAG");
}
