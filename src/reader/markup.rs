//! Start tags with their attributes and namespace declarations, end tags.

use super::PullParser;
use crate::errors::Result;
use crate::events::EventType;
use crate::name::{is_name_char, is_name_start_char, is_whitespace};
use crate::utils::printable_char;

/// Characters that must follow `x` for an attribute to be a namespace declaration.
const XMLNS_TAIL: [char; 5] = ['m', 'l', 'n', 's', ':'];

impl<'i> PullParser<'i> {
    /// Parses a start tag. `<` and the first character of the name were consumed.
    pub(super) fn parse_start_tag(&mut self) -> Result<EventType> {
        self.depth += 1;
        let name_start = self.input.prev;
        self.input.pos_start = name_start.saturating_sub(1);
        self.tag_start = self.input.absolute(self.input.pos_start);
        self.empty_element_tag = false;
        self.attributes.clear();

        let namespaces = self.config.process_namespaces;
        let mut ch = self.input.last_char();
        if ch == ':' && namespaces {
            return Err(self.ill_formed(
                "when namespaces processing enabled colon can not be at element name start",
            ));
        }
        let name_start = self.input.absolute(name_start);
        let mut colon = None;
        loop {
            ch = self.more()?;
            if !is_name_char(ch) {
                break;
            }
            if ch == ':' && namespaces {
                if colon.is_some() {
                    return Err(self.ill_formed(
                        "only one colon is allowed in name of element when namespaces are enabled",
                    ));
                }
                colon = Some(self.input.absolute(self.input.prev) - name_start);
            }
        }
        let raw = self
            .input
            .slice(self.input.relative(name_start), self.input.prev)
            .to_string();
        self.elements.open(self.depth, raw, colon, self.input.line);

        loop {
            while is_whitespace(ch) {
                ch = self.more()?;
            }
            if ch == '>' {
                break;
            } else if ch == '/' {
                ch = self.more()?;
                if ch != '>' {
                    return Err(self.ill_formed(format!(
                        "expected > to end empty tag not {}",
                        printable_char(ch)
                    )));
                }
                self.empty_element_tag = true;
                break;
            } else if is_name_start_char(ch) {
                self.parse_attribute()?;
                ch = self.more()?;
            } else {
                return Err(self.ill_formed(format!(
                    "start tag unexpected character {}",
                    printable_char(ch)
                )));
            }
        }

        let mut uri = String::new();
        if namespaces {
            self.resolve_attribute_namespaces()?;
            if let Some(frame) = self.elements.get(self.depth) {
                let prefix = frame.prefix();
                match self.namespaces.resolve(prefix.unwrap_or("")) {
                    Some(resolved) => uri.push_str(resolved),
                    None => {
                        if let Some(prefix) = prefix {
                            return Err(self.ill_formed(format!(
                                "could not determine namespace bound to element prefix {}",
                                prefix
                            )));
                        }
                    }
                }
            }
        }
        if let Some((i, j)) = self.attributes.find_duplicate(namespaces) {
            let message = match (self.attributes.get(i), self.attributes.get(j)) {
                (Some(a), Some(b)) if namespaces => format!(
                    "duplicated attributes {}:{} and {}:{}",
                    a.uri(),
                    a.name(),
                    b.uri(),
                    b.name()
                ),
                (Some(a), Some(b)) => {
                    format!("duplicated attributes {} and {}", a.raw_name(), b.raw_name())
                }
                _ => String::from("duplicated attributes"),
            };
            return Err(self.ill_formed(message));
        }

        self.elements.finish(uri, self.namespaces.len());
        self.input.pos_end = self.input.pos;
        Ok(self.emit(EventType::StartTag))
    }

    fn resolve_attribute_namespaces(&mut self) -> Result<()> {
        for i in 0..self.attributes.len() {
            let prefix = match self.attributes.get(i).and_then(|a| a.prefix()) {
                Some(prefix) => prefix,
                None => continue,
            };
            let uri = match self.namespaces.resolve(prefix) {
                Some(uri) => uri.to_string(),
                None => {
                    return Err(self.ill_formed(format!(
                        "could not determine namespace bound to attribute prefix {}",
                        prefix
                    )))
                }
            };
            self.attributes.set_uri(i, uri);
        }
        Ok(())
    }

    /// Parses one attribute, or a namespace declaration when namespaces are
    /// processed. The first character of the name was consumed; returns after
    /// the closing quote.
    fn parse_attribute(&mut self) -> Result<()> {
        let saved_pos_start = self.input.absolute(self.input.pos_start);
        let name_start = self.input.absolute(self.input.prev);
        let namespaces = self.config.process_namespaces;

        let mut ch = self.input.last_char();
        if ch == ':' && namespaces {
            return Err(self.ill_formed(
                "when namespaces processing enabled colon can not be at attribute name start",
            ));
        }
        let mut is_xmlns = namespaces && ch == 'x';
        let mut xmlns_pos = 0;
        let mut colon = None;
        ch = self.more()?;
        while is_name_char(ch) {
            if namespaces {
                if is_xmlns && xmlns_pos < XMLNS_TAIL.len() {
                    xmlns_pos += 1;
                    if xmlns_pos == XMLNS_TAIL.len() {
                        if ch != ':' {
                            return Err(self.ill_formed(
                                "after xmlns in attribute name must be colon when namespaces are enabled",
                            ));
                        }
                    } else if ch != XMLNS_TAIL[xmlns_pos - 1] {
                        is_xmlns = false;
                    }
                }
                if ch == ':' {
                    if colon.is_some() {
                        return Err(self.ill_formed(
                            "only one colon is allowed in attribute name when namespaces are enabled",
                        ));
                    }
                    colon = Some(self.input.absolute(self.input.prev) - name_start);
                }
            }
            ch = self.more()?;
        }
        let raw = self
            .input
            .slice(self.input.relative(name_start), self.input.prev)
            .to_string();

        // prefix being declared: "" for `xmlns`, `p` for `xmlns:p`
        let declared = if is_xmlns && xmlns_pos >= XMLNS_TAIL.len() - 1 {
            match colon {
                Some(colon) => {
                    let prefix = &raw[colon + 1..];
                    if prefix.is_empty() {
                        return Err(self.ill_formed(
                            "namespace prefix is required after xmlns: when namespaces are enabled",
                        ));
                    }
                    Some(prefix.to_string())
                }
                None => Some(String::new()),
            }
        } else {
            None
        };

        while is_whitespace(ch) {
            ch = self.more()?;
        }
        if ch != '=' {
            return Err(self.ill_formed(format!(
                "expected = after attribute name not {}",
                printable_char(ch)
            )));
        }
        ch = self.more()?;
        while is_whitespace(ch) {
            ch = self.more()?;
        }
        let delimiter = ch;
        if delimiter != '"' && delimiter != '\'' {
            return Err(self.ill_formed(format!(
                "attribute value must start with quotation or apostrophe not {}",
                printable_char(delimiter)
            )));
        }

        let mut normalized_cr = false;
        self.pending.reset();
        self.input.pos_start = self.input.pos;
        loop {
            ch = self.more()?;
            if ch == delimiter {
                break;
            }
            match ch {
                '<' => {
                    return Err(self.ill_formed("markup not allowed inside attribute value - illegal < "))
                }
                '&' => self.extract_entity_ref()?,
                '\t' | '\n' | '\r' => {
                    if !self.pending.is_active() {
                        self.input.pos_end = self.input.prev;
                        self.start_pending();
                    }
                    if ch != '\n' || !normalized_cr {
                        self.pending.push(' ');
                    }
                }
                _ => {
                    if self.pending.is_active() {
                        self.pending.push(ch);
                    }
                }
            }
            normalized_cr = ch == '\r';
        }
        let value = if self.pending.is_active() {
            self.pending.as_str().to_string()
        } else {
            self.input
                .slice(self.input.pos_start, self.input.prev)
                .to_string()
        };
        self.pending.reset();

        match declared {
            Some(prefix) => {
                if !prefix.is_empty() && value.is_empty() {
                    return Err(self.ill_formed(
                        "non-default namespace can not be declared to be empty string",
                    ));
                }
                let scope = self.elements.namespace_count(self.depth - 1);
                if self.namespaces.is_declared_since(scope, &prefix) {
                    return Err(self.ill_formed(format!(
                        "duplicated namespace declaration for '{}' prefix",
                        prefix
                    )));
                }
                self.namespaces.push(&prefix, value);
            }
            None => self.attributes.push(raw, namespaces, value),
        }
        self.input.pos_start = self.input.relative(saved_pos_start);
        Ok(())
    }

    /// Parses an end tag. `</` was consumed.
    pub(super) fn parse_end_tag(&mut self) -> Result<EventType> {
        let mut ch = self.more()?;
        if !is_name_start_char(ch) {
            return Err(self.ill_formed(format!(
                "expected name start and not {}",
                printable_char(ch)
            )));
        }
        self.input.pos_start = self.input.prev.saturating_sub(2);
        let name_start = self.input.absolute(self.input.prev);
        loop {
            ch = self.more()?;
            if !is_name_char(ch) {
                break;
            }
        }

        let name = self
            .input
            .slice(self.input.relative(name_start), self.input.prev);
        let (start_name, line) = match self.elements.get(self.depth) {
            Some(frame) => (frame.raw_name(), frame.line()),
            None => ("", 0),
        };
        if start_name.len() != name.len() {
            return Err(self.ill_formed(format!(
                "end tag name </{}> must match start tag name <{}> from line {}",
                name, start_name, line
            )));
        }
        if start_name != name {
            return Err(self.ill_formed(format!(
                "end tag name </{}> must be the same as start tag <{}> from line {}",
                name, start_name, line
            )));
        }

        while is_whitespace(ch) {
            ch = self.more()?;
        }
        if ch != '>' {
            return Err(self.ill_formed(format!(
                "expected > to finish end tag not {} from line {}",
                printable_char(ch),
                line
            )));
        }
        self.input.pos_end = self.input.pos;
        self.past_end_tag = true;
        Ok(self.emit(EventType::EndTag))
    }
}
