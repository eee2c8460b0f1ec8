//! Tests for `next_token`: every construct of the document as its own event.

use xml_pull::{EventType, Feature, PullParser};

use pretty_assertions::assert_eq;

mod helpers;
use helpers::{events, folded_tokens, reconstruct, tokens, ChunkedSource};

#[test]
fn all_kinds() {
    let mut r = PullParser::from_str(
        "<?xml version='1.0'?>\n<!DOCTYPE r>\n<!--c--><r a='1'>t&amp;<![CDATA[d]]><?p x?>&#65;&foo;<e/></r>\n",
    );
    assert_eq!(
        tokens(&mut r),
        vec![
            "PROCESSING_INSTRUCTION \"xml version='1.0'\"",
            "IGNORABLE_WHITESPACE \"\\n\"",
            "DOCDECL \" r\"",
            "IGNORABLE_WHITESPACE \"\\n\"",
            "COMMENT \"c\"",
            "START_TAG r",
            "TEXT \"t\"",
            "ENTITY_REF amp \"&\"",
            "CDSECT \"d\"",
            "PROCESSING_INSTRUCTION \"p x\"",
            "ENTITY_REF #65 \"A\"",
            "ENTITY_REF foo",
            "START_TAG e",
            "END_TAG e",
            "END_TAG r",
            "IGNORABLE_WHITESPACE \"\\n\"",
            "END_DOCUMENT",
        ]
    );
    assert_eq!(r.xml_decl().version.as_deref(), Some("1.0"));
}

/// Text reported by `next` between two tags is the concatenation of the
/// character data tokens `next_token` reports there.
#[test]
fn tokens_fold_into_events() {
    for xml in [
        "<a>x<!--c--><![CDATA[y]]>z</a>",
        "<a>x<?p?><![CDATA[y]]>z</a>",
        "<r>a\r\nb<!--c-->\r<![CDATA[c\r\nd]]>&lt;e&#65;<?pi?>f<![CDATA[]]>g</r>",
        "<r><![CDATA[]]>x<![CDATA[y]]><!--c-->&amp;\r\n<i>t</i>\r\n</r>",
        "<?xml version='1.0'?>\n<!--c-->\n<r>\n  <e a='1'/>&quot;<!---->x</r>\n",
    ] {
        let by_event = events(&mut PullParser::from_str(xml));
        let by_token = folded_tokens(&mut PullParser::from_str(xml));
        assert_eq!(by_token, by_event, "{:?}", xml);
    }
}

#[test]
fn tag_text_is_the_tag_as_written() {
    let mut r = PullParser::from_str("<a  x = '1' >text</a >");
    assert_eq!(r.next_token().unwrap(), EventType::StartTag);
    assert_eq!(r.text(), Some("<a  x = '1' >"));
    assert_eq!(r.next_token().unwrap(), EventType::Text);
    assert_eq!(r.text(), Some("text"));
    assert_eq!(r.next_token().unwrap(), EventType::EndTag);
    assert_eq!(r.text(), Some("</a >"));
}

#[test]
fn defined_entity() {
    let mut r = PullParser::from_str("<a>&foo;&bar;</a>");
    r.define_entity_replacement("foo", "replacement").unwrap();
    r.next_token().unwrap();
    assert_eq!(r.next_token().unwrap(), EventType::EntityRef);
    assert_eq!(r.name(), Some("foo"));
    assert_eq!(r.text(), Some("replacement"));

    // undefined entities are not an error in token mode
    assert_eq!(r.next_token().unwrap(), EventType::EntityRef);
    assert_eq!(r.name(), Some("bar"));
    assert_eq!(r.text(), None);
    assert_eq!(r.next_token().unwrap(), EventType::EndTag);
}

#[test]
fn line_endings_normalized() {
    let mut r = PullParser::from_str("<a>1\r\n2<!--x\r\ny--><![CDATA[\r]]><?p\ra?></a>\r\n");
    assert_eq!(
        tokens(&mut r),
        vec![
            "START_TAG a",
            "TEXT \"1\\n2\"",
            "COMMENT \"x\\ny\"",
            "CDSECT \"\\n\"",
            "PROCESSING_INSTRUCTION \"p\\na\"",
            "END_TAG a",
            "IGNORABLE_WHITESPACE \"\\n\"",
            "END_DOCUMENT",
        ]
    );
}

#[test]
fn line_endings_kept_in_roundtrip() {
    let mut r = PullParser::from_str("<a>1\r\n2<!--x\r\ny--><![CDATA[\r]]><?p\ra?></a>\r\n");
    r.set_feature(Feature::XmlRoundtrip, true).unwrap();
    assert_eq!(
        tokens(&mut r),
        vec![
            "START_TAG a",
            "TEXT \"1\\r\\n2\"",
            "COMMENT \"x\\r\\ny\"",
            "CDSECT \"\\r\"",
            "PROCESSING_INSTRUCTION \"p\\ra\"",
            "END_TAG a",
            "IGNORABLE_WHITESPACE \"\\r\\n\"",
            "END_DOCUMENT",
        ]
    );
}

#[test]
fn events_still_normalize_in_roundtrip() {
    let mut r = PullParser::from_str("<a>1\r\n2</a>");
    r.set_feature(Feature::XmlRoundtrip, true).unwrap();
    r.next().unwrap();
    assert_eq!(r.next().unwrap(), EventType::Text);
    assert_eq!(r.text(), Some("1\n2"));
}

#[test]
fn whitespace_inside_root_is_text() {
    let mut r = PullParser::from_str(" <a> <b/> </a> ");
    assert_eq!(
        tokens(&mut r),
        vec![
            "IGNORABLE_WHITESPACE \" \"",
            "START_TAG a",
            "TEXT \" \"",
            "START_TAG b",
            "END_TAG b",
            "TEXT \" \"",
            "END_TAG a",
            "IGNORABLE_WHITESPACE \" \"",
            "END_DOCUMENT",
        ]
    );
}

#[test]
fn mixing_granularities() {
    let mut r = PullParser::from_str("<a><!--c-->x<!--d-->y</a>");
    r.next().unwrap();
    assert_eq!(r.next_token().unwrap(), EventType::Comment);
    assert_eq!(r.next().unwrap(), EventType::Text);
    assert_eq!(r.text(), Some("xy"));
    assert_eq!(r.next_token().unwrap(), EventType::EndTag);
}

mod roundtrip {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n\
        <!DOCTYPE r [<!ENTITY e 'x'>]>\r\n\
        <!-- a\r\nb -->\r\n\
        <r xmlns:p='urn:p' a = \"1\r\n2\">\r\n  \
        <p:c>t &lt; &e; &#x41;</p:c>\r\n  \
        <![CDATA[x\r\ny]]><?pi a\r\nb?><e/>\r\n\
        </r >\r\n<!-- end -->\r\n";

    #[test]
    fn whole() {
        let mut r = PullParser::from_str(DOCUMENT);
        r.set_feature(Feature::XmlRoundtrip, true).unwrap();
        assert_eq!(reconstruct(&mut r), DOCUMENT);
    }

    #[test]
    fn with_namespaces() {
        let mut r = PullParser::from_str(DOCUMENT);
        r.set_feature(Feature::XmlRoundtrip, true).unwrap();
        r.set_feature(Feature::ProcessNamespaces, true).unwrap();
        assert_eq!(reconstruct(&mut r), DOCUMENT);
    }

    macro_rules! chunk_tests {
        ($($name:ident: $size:expr,)+) => {
            $(
                #[test]
                fn $name() {
                    let mut r = PullParser::new();
                    r.set_input(ChunkedSource::new(DOCUMENT, $size));
                    r.set_feature(Feature::XmlRoundtrip, true).unwrap();
                    assert_eq!(reconstruct(&mut r), DOCUMENT);
                }
            )+
        };
    }

    chunk_tests!(
        chunk_1: 1,
        chunk_2: 2,
        chunk_3: 3,
        chunk_11: 11,
    );
}
