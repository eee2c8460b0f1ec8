//! Character and entity references.

use super::{PullParser, Reference};
use crate::errors::{Error, Result};
use crate::escape::{parse_char_ref, resolve_predefined_entity};
use crate::name::{is_name_char, is_name_start_char};
use crate::utils::{printable, printable_char};

impl<'i> PullParser<'i> {
    /// Scans a reference up to and including `;`. `&` was consumed.
    ///
    /// Character references and the five predefined entities are resolved;
    /// any other name is left [`Reference::Unresolved`]. On return the span
    /// starts after `&` and ends after `;`.
    fn parse_char_or_predefined_ref(&mut self) -> Result<()> {
        self.input.pos_start = self.input.pos;
        self.reference = Reference::Unresolved;

        let mut ch = self.more()?;
        if ch == '#' {
            ch = self.more()?;
            let hex = ch == 'x';
            let digits_start = if hex {
                self.input.absolute(self.input.pos)
            } else {
                self.input.absolute(self.input.prev)
            };
            if hex {
                loop {
                    ch = self.more()?;
                    if ch == ';' {
                        break;
                    }
                    if !ch.is_ascii_hexdigit() {
                        return Err(self.ill_formed(format!(
                            "character reference (with hex value) may not contain {}",
                            printable_char(ch)
                        )));
                    }
                }
            } else {
                while ch != ';' {
                    if !ch.is_ascii_digit() {
                        return Err(self.ill_formed(format!(
                            "character reference (with decimal value) may not contain {}",
                            printable_char(ch)
                        )));
                    }
                    ch = self.more()?;
                }
            }
            let digits = self
                .input
                .slice(self.input.relative(digits_start), self.input.prev);
            match parse_char_ref(digits, hex) {
                Ok(c) => self.reference = Reference::Char(c),
                Err(e) => {
                    let message = format!(
                        "character reference (with {} value {}) is invalid",
                        if hex { "hex" } else { "decimal" },
                        digits
                    );
                    return Err(Error::IllFormed(
                        self.diagnostic(message).caused_by(e),
                    ));
                }
            }
        } else {
            if !is_name_start_char(ch) {
                return Err(self.ill_formed(format!(
                    "entity reference names can not start with character '{}'",
                    printable_char(ch)
                )));
            }
            loop {
                ch = self.more()?;
                if ch == ';' {
                    break;
                }
                if !is_name_char(ch) {
                    return Err(self.ill_formed(format!(
                        "entity reference name can not contain character '{}'",
                        printable_char(ch)
                    )));
                }
            }
            let name = self.input.slice(self.input.pos_start, self.input.prev);
            if let Some(replacement) = resolve_predefined_entity(name) {
                self.reference = Reference::Predefined(replacement);
            }
        }
        self.input.pos_end = self.input.pos;
        Ok(())
    }

    /// Scans a reference in content and looks up entities defined for this
    /// input. On return the span is the name of the reference, without `;`.
    pub(super) fn parse_entity_ref(&mut self) -> Result<()> {
        self.parse_char_or_predefined_ref()?;
        self.input.pos_end = self.input.prev;
        if let Reference::Unresolved = self.reference {
            let name = self.input.slice(self.input.pos_start, self.input.pos_end);
            if let Some(index) = self.entities.lookup(name) {
                self.reference = Reference::Entity(index);
            }
        }
        Ok(())
    }

    /// Expands a reference inside an attribute value into the pending buffer.
    /// `&` was consumed; the value scanned so far starts at the span start.
    pub(super) fn extract_entity_ref(&mut self) -> Result<()> {
        self.input.pos_end = self.input.prev;
        if !self.pending.is_active() {
            self.start_pending();
        }
        let value_start = self.input.absolute(self.input.pos_start);
        self.parse_entity_ref()?;
        if let Reference::Unresolved = self.reference {
            let name = self.input.slice(self.input.pos_start, self.input.pos_end);
            return Err(self.ill_formed(format!(
                "could not resolve entity named '{}'",
                printable(name)
            )));
        }
        self.push_reference();
        self.input.pos_start = self.input.relative(value_start);
        Ok(())
    }

    /// Scans a reference inside a document type declaration, which keeps
    /// its text as written. `&` was consumed.
    pub(super) fn extract_entity_ref_in_docdecl(&mut self) -> Result<()> {
        self.input.pos_end = self.input.prev;
        let decl_start = self.input.absolute(self.input.pos_start);
        self.parse_char_or_predefined_ref()?;
        if self.pending.is_active() {
            self.input.pos_start -= 1;
            self.join_span();
        }
        self.input.pos_start = self.input.relative(decl_start);
        Ok(())
    }

    /// Appends the replacement of the last scanned reference to the pending buffer.
    pub(super) fn push_reference(&mut self) {
        match self.reference {
            Reference::Unresolved => {}
            Reference::Char(c) => self.pending.push(c),
            Reference::Predefined(s) => self.pending.push_str(s),
            Reference::Entity(index) => self.pending.push_str(self.entities.replacement(index)),
        }
    }
}
