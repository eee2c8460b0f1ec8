//! The state machine that splits the document into events: prolog, element
//! content and epilog.

use super::{Granularity, Lookahead, PullParser, Reference};
use crate::errors::{Error, Result};
use crate::events::EventType;
use crate::name::{is_name_start_char, is_whitespace};
use crate::utils::{printable, printable_char};

impl<'i> PullParser<'i> {
    #[inline]
    pub(super) fn tokenize(&self) -> bool {
        self.granularity == Granularity::Token
    }

    /// Consumes the next character, refilling the buffer when needed.
    pub(super) fn more(&mut self) -> Result<char> {
        loop {
            if let Some(ch) = self.input.next_char() {
                return Ok(ch);
            }
            if self.reached_end {
                return Err(self.unexpected_eof("no more data available"));
            }
            self.fill_buf()?;
        }
    }

    /// Like [`more`](Self::more), but the end of a complete document is not
    /// an error.
    fn more_or_end(&mut self) -> Result<Option<char>> {
        match self.more() {
            Ok(ch) => Ok(Some(ch)),
            Err(Error::UnexpectedEof(_)) if self.reached_end => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn fill_buf(&mut self) -> Result<()> {
        if self.input.fill()? > 0 {
            return Ok(());
        }
        if self.seen_root && self.depth == 0 {
            log::trace!(target: "xml_pull::reader", "end of input after root element");
            self.reached_end = true;
            return Ok(());
        }
        if self.input.absolute(self.input.pos) == 0 {
            return Err(self.unexpected_eof("input contained no data"));
        }
        let mut message = String::from("no more data available");
        if self.elements.len() < self.depth {
            let tag_start = self.input.relative(self.tag_start);
            let name = self.input.slice(tag_start + 1, self.input.pos);
            message.push_str(" - expected the opening tag <");
            message.push_str(name);
            message.push_str("...>");
        } else if self.depth > 0 {
            message.push_str(&self.elements.describe_unclosed());
        }
        Err(self.unexpected_eof(message))
    }

    /// Collects the span scanned so far into the pending buffer, or starts an
    /// empty pending text when nothing was scanned.
    pub(super) fn start_pending(&mut self) {
        let (start, end) = (self.input.pos_start, self.input.pos_end);
        if end > start {
            self.pending.join(self.input.slice(start, end));
        } else {
            self.pending.engage();
        }
    }

    /// Appends the current span to the pending buffer.
    pub(super) fn join_span(&mut self) {
        let (start, end) = (self.input.pos_start, self.input.pos_end);
        self.pending.join(self.input.slice(start, end));
    }

    /// Collects `ch` as text with `\r\n` and `\r` replaced by `\n`.
    /// `normalized_cr` remembers that the previous character was `\r`.
    pub(super) fn normalize_char(&mut self, ch: char, normalized_cr: &mut bool) {
        match ch {
            '\r' => {
                *normalized_cr = true;
                self.input.pos_end = self.input.prev;
                if !self.pending.is_active() {
                    self.start_pending();
                }
                self.pending.push('\n');
            }
            '\n' => {
                if !*normalized_cr && self.pending.is_active() {
                    self.pending.push('\n');
                }
                *normalized_cr = false;
            }
            _ => {
                if self.pending.is_active() {
                    self.pending.push(ch);
                }
                *normalized_cr = false;
            }
        }
    }

    pub(super) fn next_impl(&mut self) -> Result<EventType> {
        self.text = None;
        self.pending.reset();
        self.input.start = self.input.pos_end;

        if self.past_end_tag {
            self.past_end_tag = false;
            self.depth -= 1;
            self.namespaces
                .truncate(self.elements.namespace_count(self.depth));
            self.elements.truncate(self.depth);
        }
        if self.empty_element_tag {
            self.empty_element_tag = false;
            self.past_end_tag = true;
            return Ok(self.emit(EventType::EndTag));
        }

        if self.depth > 0 {
            self.parse_content()
        } else if self.seen_root {
            self.parse_epilog()
        } else {
            self.parse_prolog()
        }
    }

    fn parse_prolog(&mut self) -> Result<EventType> {
        let mut ch = if self.lookahead == Lookahead::Markup {
            '<'
        } else {
            self.more()?
        };
        if self.event_type == EventType::StartDocument {
            match ch {
                '\u{FFFE}' => {
                    return Err(self.ill_formed(
                        "first character in input was UNICODE noncharacter (0xFFFE)- input requires int swapping",
                    ))
                }
                '\u{FEFF}' => {
                    ch = self.more()?;
                    self.document_start = self.input.absolute(self.input.prev);
                }
                '\u{FFFD}' => {
                    ch = self.more()?;
                    if ch == '\u{FFFD}' {
                        return Err(self.ill_formed(
                            "UTF-16 BOM in a UTF-8 encoded file is incompatible",
                        ));
                    }
                    self.document_start = self.input.absolute(self.input.prev);
                }
                _ => {}
            }
        }
        self.lookahead = Lookahead::None;

        let normalize = self.tokenize() && !self.config.xml_roundtrip;
        let mut normalized_cr = false;
        let mut got_whitespace = false;
        self.input.pos_start = self.input.prev;
        loop {
            if ch == '<' {
                if got_whitespace && self.tokenize() {
                    self.input.pos_end = self.input.prev;
                    self.lookahead = Lookahead::Markup;
                    return Ok(self.emit(EventType::IgnorableWhitespace));
                }
                ch = self.more()?;
                match ch {
                    '?' => {
                        self.parse_pi()?;
                        if self.tokenize() {
                            return Ok(self.emit(EventType::ProcessingInstruction));
                        }
                    }
                    '!' => {
                        ch = self.more()?;
                        match ch {
                            'D' => {
                                if self.seen_docdecl {
                                    return Err(
                                        self.ill_formed("only one docdecl allowed in XML document")
                                    );
                                }
                                self.seen_docdecl = true;
                                self.parse_docdecl()?;
                                if self.tokenize() {
                                    return Ok(self.emit(EventType::Docdecl));
                                }
                            }
                            '-' => {
                                self.parse_comment()?;
                                if self.tokenize() {
                                    return Ok(self.emit(EventType::Comment));
                                }
                            }
                            _ => {
                                return Err(self.ill_formed(format!(
                                    "unexpected markup <!{}",
                                    printable_char(ch)
                                )))
                            }
                        }
                    }
                    c if is_name_start_char(c) => {
                        self.seen_root = true;
                        return self.parse_start_tag();
                    }
                    _ => {
                        return Err(self.ill_formed(format!(
                            "expected start tag name and not {}",
                            printable_char(ch)
                        )))
                    }
                }
            } else if is_whitespace(ch) {
                got_whitespace = true;
                if normalize {
                    self.normalize_char(ch, &mut normalized_cr);
                }
            } else {
                return Err(self.ill_formed(format!(
                    "only whitespace content allowed before start tag and not {}",
                    printable_char(ch)
                )));
            }
            ch = self.more()?;
        }
    }

    fn parse_content(&mut self) -> Result<EventType> {
        let mut ch = match std::mem::replace(&mut self.lookahead, Lookahead::None) {
            Lookahead::StartTag => return self.parse_start_tag(),
            Lookahead::EndTag => return self.parse_end_tag(),
            Lookahead::Markup => '<',
            Lookahead::Ampersand => '&',
            Lookahead::None => self.more()?,
        };
        self.input.pos_start = self.input.prev;
        // character data was seen since the last event
        let mut had_char_data = false;
        // the span before a skipped construct must be joined with what follows
        let mut needs_merging = false;

        loop {
            match ch {
                '<' => {
                    if had_char_data && self.tokenize() {
                        self.lookahead = Lookahead::Markup;
                        return Ok(self.emit(EventType::Text));
                    }
                    ch = self.more()?;
                    match ch {
                        '/' => {
                            if !self.tokenize() && had_char_data {
                                self.lookahead = Lookahead::EndTag;
                                return Ok(self.emit(EventType::Text));
                            }
                            return self.parse_end_tag();
                        }
                        '!' => {
                            ch = self.more()?;
                            match ch {
                                '-' => {
                                    self.parse_comment()?;
                                    if self.tokenize() {
                                        return Ok(self.emit(EventType::Comment));
                                    }
                                    if !self.pending.is_active() && had_char_data {
                                        needs_merging = true;
                                    } else {
                                        self.input.pos_start = self.input.pos;
                                    }
                                }
                                '[' => {
                                    self.parse_cdsect(had_char_data)?;
                                    if self.tokenize() {
                                        return Ok(self.emit(EventType::CData));
                                    }
                                    if self.input.pos_end > self.input.pos_start {
                                        had_char_data = true;
                                        // an active pending buffer already holds the text before the section
                                        needs_merging = !self.pending.is_active();
                                    } else if self.pending.is_active() {
                                        needs_merging = false;
                                    } else if !had_char_data {
                                        self.input.pos_start = self.input.pos;
                                    }
                                }
                                _ => {
                                    return Err(self.ill_formed(format!(
                                        "unexpected character in markup {}",
                                        printable_char(ch)
                                    )))
                                }
                            }
                        }
                        '?' => {
                            self.parse_pi()?;
                            if self.tokenize() {
                                return Ok(self.emit(EventType::ProcessingInstruction));
                            }
                            if !self.pending.is_active() && had_char_data {
                                needs_merging = true;
                            } else {
                                self.input.pos_start = self.input.pos;
                            }
                        }
                        c if is_name_start_char(c) => {
                            if !self.tokenize() && had_char_data {
                                self.lookahead = Lookahead::StartTag;
                                return Ok(self.emit(EventType::Text));
                            }
                            return self.parse_start_tag();
                        }
                        _ => {
                            return Err(self.ill_formed(format!(
                                "unexpected character in markup {}",
                                printable_char(ch)
                            )))
                        }
                    }
                }
                '&' => {
                    if self.tokenize() && had_char_data {
                        self.lookahead = Lookahead::Ampersand;
                        return Ok(self.emit(EventType::Text));
                    }
                    let old_start = self.input.absolute(self.input.pos_start);
                    let old_end = self.input.absolute(self.input.pos_end);
                    self.parse_entity_ref()?;
                    if self.tokenize() {
                        if !matches!(self.reference, Reference::Unresolved) {
                            self.pending.engage();
                            self.push_reference();
                        }
                        return Ok(self.emit(EventType::EntityRef));
                    }
                    if let Reference::Unresolved = self.reference {
                        let name = self.input.slice(self.input.pos_start, self.input.pos_end);
                        return Err(self.ill_formed(format!(
                            "could not resolve entity named '{}'",
                            printable(name)
                        )));
                    }
                    self.input.pos_start = self.input.relative(old_start);
                    self.input.pos_end = self.input.relative(old_end);
                    if !self.pending.is_active() {
                        if had_char_data {
                            self.join_span();
                            needs_merging = false;
                        } else {
                            self.pending.engage();
                        }
                    }
                    self.push_reference();
                    had_char_data = true;
                }
                _ => {
                    if needs_merging {
                        self.join_span();
                        needs_merging = false;
                    }
                    had_char_data = true;

                    let normalize = !self.tokenize() || !self.config.xml_roundtrip;
                    let mut normalized_cr = false;
                    let mut seen_bracket = false;
                    let mut seen_bracket_bracket = false;
                    loop {
                        if ch == ']' {
                            if seen_bracket {
                                seen_bracket_bracket = true;
                            } else {
                                seen_bracket = true;
                            }
                        } else if seen_bracket_bracket && ch == '>' {
                            return Err(self.ill_formed("characters ]]> are not allowed in content"));
                        } else if seen_bracket {
                            seen_bracket = false;
                            seen_bracket_bracket = false;
                        }
                        if normalize {
                            self.normalize_char(ch, &mut normalized_cr);
                        }
                        if !seen_bracket && !normalized_cr {
                            let (from, to) = self.input.skip_plain_text();
                            if normalize && to > from && self.pending.is_active() {
                                self.pending.push_str(self.input.slice(from, to));
                            }
                        }
                        ch = self.more()?;
                        if ch == '<' || ch == '&' {
                            break;
                        }
                    }
                    self.input.pos_end = self.input.prev;
                    continue;
                }
            }
            ch = self.more()?;
        }
    }

    fn parse_epilog(&mut self) -> Result<EventType> {
        if self.event_type == EventType::EndDocument {
            return Err(self.ill_formed("already reached end of XML input"));
        }
        if self.reached_end {
            return Ok(self.emit(EventType::EndDocument));
        }

        let normalize = self.tokenize() && !self.config.xml_roundtrip;
        let mut normalized_cr = false;
        let mut got_whitespace = false;
        let first = if self.lookahead == Lookahead::Markup {
            Some('<')
        } else {
            self.more_or_end()?
        };
        self.lookahead = Lookahead::None;
        self.input.pos_start = self.input.prev;

        if let Some(mut ch) = first {
            loop {
                if ch == '<' {
                    if got_whitespace && self.tokenize() {
                        self.input.pos_end = self.input.prev;
                        self.lookahead = Lookahead::Markup;
                        return Ok(self.emit(EventType::IgnorableWhitespace));
                    }
                    ch = self.more()?;
                    match ch {
                        '?' => {
                            self.parse_pi()?;
                            if self.tokenize() {
                                return Ok(self.emit(EventType::ProcessingInstruction));
                            }
                        }
                        '!' => {
                            ch = self.more()?;
                            match ch {
                                'D' => {
                                    return Err(self.ill_formed(
                                        "docdecl not allowed after root element",
                                    ))
                                }
                                '-' => {
                                    self.parse_comment()?;
                                    if self.tokenize() {
                                        return Ok(self.emit(EventType::Comment));
                                    }
                                }
                                _ => {
                                    return Err(self.ill_formed(format!(
                                        "unexpected markup <!{}",
                                        printable_char(ch)
                                    )))
                                }
                            }
                        }
                        '/' => {
                            return Err(self.ill_formed(format!(
                                "end tag not allowed in epilog but got {}",
                                printable_char(ch)
                            )))
                        }
                        c if is_name_start_char(c) => {
                            return Err(self.ill_formed(format!(
                                "start tag not allowed in epilog but got {}",
                                printable_char(ch)
                            )))
                        }
                        _ => {
                            return Err(self.ill_formed(format!(
                                "in epilog expected ignorable content and not {}",
                                printable_char(ch)
                            )))
                        }
                    }
                } else if is_whitespace(ch) {
                    got_whitespace = true;
                    if normalize {
                        self.normalize_char(ch, &mut normalized_cr);
                    }
                } else {
                    return Err(self.ill_formed(format!(
                        "in epilog non whitespace content is not allowed but got {}",
                        printable_char(ch)
                    )));
                }
                ch = match self.more_or_end()? {
                    Some(ch) => ch,
                    None => break,
                };
            }
        }

        if got_whitespace && self.tokenize() {
            self.input.pos_end = self.input.pos;
            return Ok(self.emit(EventType::IgnorableWhitespace));
        }
        Ok(self.emit(EventType::EndDocument))
    }
}
