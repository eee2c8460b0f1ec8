//! Markup that is not a tag: comments, processing instructions with the XML
//! declaration, CDATA sections and the document type declaration.

use super::PullParser;
use crate::errors::{Error, Result};
use crate::escape::is_xml_char;
use crate::events::EventType;
use crate::name::is_whitespace;
use crate::utils::{printable, printable_char};

impl<'i> PullParser<'i> {
    /// Parses a comment. `<!-` was consumed.
    pub(super) fn parse_comment(&mut self) -> Result<()> {
        let ch = self.more()?;
        if ch != '-' {
            return Err(self.ill_formed("expected <!-- for comment start"));
        }
        if self.tokenize() {
            self.input.pos_start = self.input.pos;
        }
        let line = self.input.line;
        let column = self.input.column.saturating_sub(4);
        match self.scan_comment() {
            Err(e @ Error::UnexpectedEof(_)) => {
                return Err(self.unterminated(
                    format!("comment started on line {} and column {} was not closed", line, column),
                    e,
                ))
            }
            r => r?,
        }
        if self.tokenize() {
            self.input.pos_end = self.input.pos - 3;
            if self.pending.is_active() {
                self.pending.truncate_tail(2);
            }
        }
        Ok(())
    }

    fn scan_comment(&mut self) -> Result<()> {
        let normalize = self.tokenize() && !self.config.xml_roundtrip;
        let mut normalized_cr = false;
        let mut seen_dash = false;
        let mut seen_dash_dash = false;
        loop {
            let ch = self.more()?;
            if seen_dash_dash && ch != '>' {
                return Err(self.ill_formed(format!(
                    "in comment after two dashes (--) next character must be > not {}",
                    printable_char(ch)
                )));
            }
            match ch {
                '-' => {
                    if seen_dash {
                        seen_dash_dash = true;
                    } else {
                        seen_dash = true;
                    }
                }
                '>' if seen_dash_dash => return Ok(()),
                c if is_xml_char(c as u32) => seen_dash = false,
                c => {
                    return Err(self.ill_formed(format!(
                        "Illegal character 0x{:x} found in comment",
                        c as u32
                    )))
                }
            }
            if normalize {
                self.normalize_char(ch, &mut normalized_cr);
            }
        }
    }

    /// Parses a processing instruction, or the XML declaration. `<?` was consumed.
    pub(super) fn parse_pi(&mut self) -> Result<()> {
        if self.tokenize() {
            self.input.pos_start = self.input.pos;
        }
        let line = self.input.line;
        let column = self.input.column.saturating_sub(2);
        let target_start = self.input.absolute(self.input.pos);
        match self.scan_pi(target_start) {
            Err(e @ Error::UnexpectedEof(_)) => Err(self.unterminated(
                format!(
                    "processing instruction started on line {} and column {} was not closed",
                    line, column
                ),
                e,
            )),
            r => r,
        }
    }

    fn scan_pi(&mut self, target_start: usize) -> Result<()> {
        let normalize = self.tokenize() && !self.config.xml_roundtrip;
        let mut normalized_cr = false;
        let mut target_end = None;
        let mut seen_target = false;
        let mut seen_inner_tag = false;
        let mut seen_question = false;

        let mut ch = self.more()?;
        if is_whitespace(ch) {
            return Err(self.ill_formed(
                "processing instruction PITarget must be exactly after <? and not white space character",
            ));
        }
        loop {
            match ch {
                '?' => {
                    if !seen_target {
                        return Err(self.ill_formed("processing instruction PITarget name not found"));
                    }
                    seen_question = true;
                }
                '>' if seen_question => break,
                '>' => {
                    if !seen_target {
                        return Err(self.ill_formed("processing instruction PITarget name not found"));
                    }
                    if !seen_inner_tag {
                        return Err(self.ill_formed(format!(
                            "processing instruction started on line {} and column {} was not closed",
                            self.input.line, self.input.column
                        )));
                    }
                    seen_inner_tag = false;
                }
                _ => {
                    if ch == '<' {
                        seen_inner_tag = true;
                    }
                    if target_end.is_none() && is_whitespace(ch) {
                        let end = self.input.absolute(self.input.prev);
                        target_end = Some(end);
                        if self.is_xml_decl_target(target_start, end)? {
                            return self.parse_xml_decl(ch, target_start);
                        }
                    }
                    seen_question = false;
                }
            }
            if normalize {
                self.normalize_char(ch, &mut normalized_cr);
            }
            seen_target = true;
            ch = self.more()?;
        }

        if target_end.is_none() {
            let target = self.input.slice(
                self.input.relative(target_start),
                self.input.pos - 2,
            );
            if target.eq_ignore_ascii_case("xml") {
                return Err(self.ill_formed(
                    "processing instruction can not have PITarget with reserved xml name",
                ));
            }
        }
        if self.tokenize() {
            self.input.pos_end = self.input.pos - 2;
            if self.pending.is_active() {
                self.pending.truncate_tail(1);
            }
        }
        Ok(())
    }

    /// Checks a PI target that ends before a whitespace: returns `true` for
    /// the XML declaration, fails for a misplaced one.
    fn is_xml_decl_target(&self, target_start: usize, target_end: usize) -> Result<bool> {
        let target = self.input.slice(
            self.input.relative(target_start),
            self.input.relative(target_end),
        );
        if !target.eq_ignore_ascii_case("xml") {
            return Ok(false);
        }
        if target_start - 2 > self.document_start {
            return Err(self.ill_formed(if self.event_type == EventType::StartDocument {
                "XMLDecl is only allowed as first characters in input"
            } else {
                "processing instruction can not have PITarget with reserved xml name"
            }));
        }
        if target != "xml" {
            return Err(self.ill_formed("XMLDecl must have xml name in lowercase"));
        }
        Ok(true)
    }

    /// Parses the pseudo-attributes of the XML declaration. `<?xml` and one
    /// whitespace `ch` were consumed.
    fn parse_xml_decl(&mut self, ch: char, target_start: usize) -> Result<()> {
        self.input.prevent_compaction = true;
        self.input.start = 0;
        let result = self.scan_xml_decl(ch);
        self.input.prevent_compaction = false;
        result?;

        let content_start = self.input.relative(target_start + 3);
        let content_end = self.input.pos - 2;
        self.xml_decl.content = Some(self.input.slice(content_start, content_end).to_string());
        log::debug!(
            target: "xml_pull::reader",
            "XML declaration: version={:?} encoding={:?} standalone={:?}",
            self.xml_decl.version,
            self.xml_decl.encoding,
            self.xml_decl.standalone
        );
        if self.tokenize() {
            self.input.pos_end = content_end;
        }
        Ok(())
    }

    fn scan_xml_decl(&mut self, ch: char) -> Result<()> {
        let mut ch = self.skip_whitespace(ch)?;
        ch = self.require_input(ch, "version")?;
        let version = self.xml_decl_value(ch, "version", |_, c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-') {
                Ok(())
            } else {
                Err("value expected to be in ([a-zA-Z0-9_.:] | '-')")
            }
        })?;
        if version != "1.0" {
            return Err(self.ill_formed(format!(
                "only 1.0 is supported as <?xml version not '{}'",
                printable(&version)
            )));
        }
        self.xml_decl.version = Some(version);

        let mut last = "version";
        let mut before = self.more()?;
        ch = self.skip_whitespace(before)?;

        if ch == 'e' {
            if !is_whitespace(before) {
                return Err(self.missing_space(last, ch));
            }
            ch = self.more()?;
            ch = self.require_input(ch, "ncoding")?;
            let encoding = self.xml_decl_value(ch, "encoding", |i, c| {
                if i == 0 && !c.is_ascii_alphabetic() {
                    Err("name expected to start with [A-Za-z]")
                } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    Ok(())
                } else {
                    Err("value expected to be in ([A-Za-z0-9._] | '-')")
                }
            })?;
            if encoding.is_empty() {
                return Err(self.ill_formed("<?xml encoding name can not be empty"));
            }
            self.xml_decl.encoding = Some(encoding);
            last = "encoding";
            before = self.more()?;
            ch = self.skip_whitespace(before)?;
        }

        if ch == 's' {
            if !is_whitespace(before) {
                return Err(self.missing_space(last, ch));
            }
            ch = self.more()?;
            ch = self.require_input(ch, "tandalone")?;
            let standalone = self.xml_decl_value(ch, "standalone", |_, c| {
                if c.is_ascii_lowercase() {
                    Ok(())
                } else {
                    Err("value expected to be 'yes' or 'no'")
                }
            })?;
            self.xml_decl.standalone = match standalone.as_str() {
                "yes" => Some(true),
                "no" => Some(false),
                _ => {
                    return Err(self.ill_formed(format!(
                        "expected 'yes' or 'no' after standalone and not '{}'",
                        printable(&standalone)
                    )))
                }
            };
            ch = self.more()?;
            ch = self.skip_whitespace(ch)?;
        }

        if ch != '?' {
            return Err(self.ill_formed(format!(
                "expected ?> as last part of <?xml not {}",
                printable_char(ch)
            )));
        }
        ch = self.more()?;
        if ch != '>' {
            return Err(self.ill_formed(format!(
                "expected ?> as last part of <?xml not {}",
                printable_char(ch)
            )));
        }
        Ok(())
    }

    /// Reads `= 'value'` of a pseudo-attribute named `name`. `ch` is the
    /// character after the name; returns at the closing quote. `check` is
    /// given the index and the value of every character.
    fn xml_decl_value(
        &mut self,
        ch: char,
        name: &str,
        check: impl Fn(usize, char) -> std::result::Result<(), &'static str>,
    ) -> Result<String> {
        let mut ch = self.skip_whitespace(ch)?;
        if ch != '=' {
            return Err(self.ill_formed(format!(
                "expected equals sign (=) after {} and not {}",
                name,
                printable_char(ch)
            )));
        }
        ch = self.more()?;
        ch = self.skip_whitespace(ch)?;
        if ch != '\'' && ch != '"' {
            return Err(self.ill_formed(format!(
                "expected apostrophe (') or quotation mark (\") after {} and not {}",
                name,
                printable_char(ch)
            )));
        }
        let quote = ch;
        let start = self.input.absolute(self.input.pos);
        let mut index = 0;
        loop {
            ch = self.more()?;
            if ch == quote {
                break;
            }
            if let Err(expectation) = check(index, ch) {
                return Err(self.ill_formed(format!(
                    "<?xml {} {} not {}",
                    name,
                    expectation,
                    printable_char(ch)
                )));
            }
            index += 1;
        }
        Ok(self
            .input
            .slice(self.input.relative(start), self.input.prev)
            .to_string())
    }

    fn missing_space(&self, after: &str, ch: char) -> Error {
        self.ill_formed(format!(
            "expected a space after {} and not {}",
            after,
            printable_char(ch)
        ))
    }

    /// Consumes the characters of `expected`, the first of which is `ch`.
    /// Returns the character after them.
    fn require_input(&mut self, ch: char, expected: &str) -> Result<char> {
        let mut ch = ch;
        for c in expected.chars() {
            if ch != c {
                return Err(self.ill_formed(format!(
                    "expected {} in {} and not {}",
                    printable_char(c),
                    expected,
                    printable_char(ch)
                )));
            }
            ch = self.more()?;
        }
        Ok(ch)
    }

    fn skip_whitespace(&mut self, ch: char) -> Result<char> {
        let mut ch = ch;
        while is_whitespace(ch) {
            ch = self.more()?;
        }
        Ok(ch)
    }

    /// Parses a CDATA section. `<![` was consumed.
    ///
    /// When the section continues text that was not collected yet, that text
    /// is collected first so both end up in one event.
    pub(super) fn parse_cdsect(&mut self, had_char_data: bool) -> Result<()> {
        let line = self.input.line;
        let column = self.input.column.saturating_sub(3);
        for expected in "CDATA[".chars() {
            if self.more()? != expected {
                return Err(self.ill_formed("expected <![CDATA[ for CDATA section start"));
            }
        }
        let section_start = self.input.absolute(self.input.pos);
        let normalize = !self.tokenize() || !self.config.xml_roundtrip;
        match self.scan_cdsect(section_start, had_char_data, normalize) {
            Err(e @ Error::UnexpectedEof(_)) => {
                return Err(self.unterminated(
                    format!(
                        "CDATA section started on line {} and column {} was not closed",
                        line, column
                    ),
                    e,
                ))
            }
            r => r?,
        }
        if normalize && self.pending.is_active() {
            self.pending.truncate_tail(2);
        }
        self.input.pos_start = self.input.relative(section_start);
        self.input.pos_end = self.input.pos - 3;
        Ok(())
    }

    fn scan_cdsect(&mut self, section_start: usize, had_char_data: bool, normalize: bool) -> Result<()> {
        if normalize && had_char_data && !self.pending.is_active() {
            self.start_pending();
        }
        let mut normalized_cr = false;
        let mut seen_bracket = false;
        let mut seen_bracket_bracket = false;
        loop {
            let ch = self.more()?;
            match ch {
                ']' => {
                    if seen_bracket {
                        seen_bracket_bracket = true;
                    } else {
                        seen_bracket = true;
                    }
                }
                '>' if seen_bracket_bracket => return Ok(()),
                _ => {
                    seen_bracket = false;
                    seen_bracket_bracket = false;
                }
            }
            if normalize {
                if ch == '\r' {
                    self.input.pos_start = self.input.relative(section_start);
                }
                self.normalize_char(ch, &mut normalized_cr);
            }
        }
    }

    /// Skips a document type declaration, keeping its text. `<!D` was consumed.
    pub(super) fn parse_docdecl(&mut self) -> Result<()> {
        let line = self.input.line;
        let column = self.input.column.saturating_sub(3);
        for expected in "OCTYPE".chars() {
            if self.more()? != expected {
                return Err(self.ill_formed("expected <!DOCTYPE"));
            }
        }
        self.input.pos_start = self.input.pos;
        match self.scan_docdecl() {
            Err(e @ Error::UnexpectedEof(_)) => Err(self.unterminated(
                format!(
                    "DOCTYPE declaration started on line {} and column {} was not closed",
                    line, column
                ),
                e,
            )),
            r => r,
        }
    }

    fn scan_docdecl(&mut self) -> Result<()> {
        let normalize = self.tokenize() && !self.config.xml_roundtrip;
        let mut normalized_cr = false;
        let mut bracket_level = 0usize;
        loop {
            let ch = self.more()?;
            match ch {
                '[' => bracket_level += 1,
                ']' => bracket_level = bracket_level.saturating_sub(1),
                '>' if bracket_level == 0 => break,
                '&' => {
                    self.extract_entity_ref_in_docdecl()?;
                    continue;
                }
                _ => {}
            }
            if normalize {
                self.normalize_char(ch, &mut normalized_cr);
            }
        }
        self.input.pos_end = self.input.prev;
        Ok(())
    }
}
