//! Utility functions for integration tests

#![allow(dead_code)]

use std::io;
use xml_pull::{CharSource, EventType, PullParser};

/// A source that hands out at most `chunk` characters per read, so that
/// every construct of a document gets split between two buffer refills.
pub struct ChunkedSource<'a> {
    rest: &'a str,
    chunk: usize,
}

impl<'a> ChunkedSource<'a> {
    pub fn new(text: &'a str, chunk: usize) -> Self {
        Self { rest: text, chunk }
    }
}

impl<'a> CharSource for ChunkedSource<'a> {
    fn read(&mut self, buf: &mut String, max: usize) -> io::Result<usize> {
        let n = std::cmp::min(max, self.chunk);
        let end = self
            .rest
            .char_indices()
            .nth(n)
            .map_or(self.rest.len(), |(i, _)| i);
        let (head, tail) = self.rest.split_at(end);
        buf.push_str(head);
        self.rest = tail;
        Ok(head.chars().count())
    }
}

/// Describes the current event as `TYPE` followed by its name and, for
/// anything but tags, its text.
pub fn describe(parser: &PullParser) -> String {
    let event = parser.event_type();
    let mut out = event.to_string();
    if let Some(name) = parser.raw_name().or_else(|| parser.name()) {
        out.push(' ');
        out.push_str(name);
    }
    if event != EventType::StartTag && event != EventType::EndTag {
        if let Some(text) = parser.text() {
            out.push_str(&format!(" {:?}", text));
        }
    }
    out
}

/// Reads the whole document with [`PullParser::next`] and describes every event.
pub fn events(parser: &mut PullParser) -> Vec<String> {
    let mut out = Vec::new();
    loop {
        let event = parser.next().expect("document should be well-formed");
        out.push(describe(parser));
        if event == EventType::EndDocument {
            return out;
        }
    }
}

/// Reads the whole document with [`PullParser::next_token`] and describes every token.
pub fn tokens(parser: &mut PullParser) -> Vec<String> {
    let mut out = Vec::new();
    loop {
        let event = parser.next_token().expect("document should be well-formed");
        out.push(describe(parser));
        if event == EventType::EndDocument {
            return out;
        }
    }
}

/// Rebuilds the document from its tokens: the text of every token is put
/// back between the delimiters it was found in.
pub fn reconstruct(parser: &mut PullParser) -> String {
    let mut out = String::new();
    let mut after_empty_tag = false;
    loop {
        let event = parser.next_token().expect("document should be well-formed");
        let text = parser.text().unwrap_or_default();
        match event {
            EventType::StartTag => {
                after_empty_tag = parser.is_empty_element_tag().unwrap();
                out.push_str(text);
                continue;
            }
            EventType::EndTag if after_empty_tag => {}
            EventType::EndTag | EventType::Text | EventType::IgnorableWhitespace => {
                out.push_str(text)
            }
            EventType::CData => out.push_str(&format!("<![CDATA[{}]]>", text)),
            EventType::Comment => out.push_str(&format!("<!--{}-->", text)),
            EventType::ProcessingInstruction => out.push_str(&format!("<?{}?>", text)),
            EventType::Docdecl => out.push_str(&format!("<!DOCTYPE{}>", text)),
            EventType::EntityRef => {
                out.push_str(&format!("&{};", parser.name().unwrap_or_default()))
            }
            EventType::EndDocument => return out,
            EventType::StartDocument => unreachable!(),
        }
        after_empty_tag = false;
    }
}

/// Reads the whole document with [`PullParser::next_token`] and describes it
/// the way [`events`] does: the text of `TEXT`, `CDSECT` and `ENTITY_REF`
/// tokens between two tags is folded into one `TEXT`, and tokens that
/// [`PullParser::next`] skips are dropped.
pub fn folded_tokens(parser: &mut PullParser) -> Vec<String> {
    let mut out = Vec::new();
    let mut text = String::new();
    loop {
        let event = parser.next_token().expect("document should be well-formed");
        match event {
            EventType::Text | EventType::CData | EventType::EntityRef => {
                text.push_str(parser.text().expect("entity should be resolved"));
                continue;
            }
            EventType::StartTag | EventType::EndTag | EventType::EndDocument => {}
            _ => continue,
        }
        if !text.is_empty() {
            out.push(format!("TEXT {:?}", text));
            text.clear();
        }
        out.push(describe(parser));
        if event == EventType::EndDocument {
            return out;
        }
    }
}
