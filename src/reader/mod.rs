//! Contains the pull parser and the machinery it is built from.

use std::fmt::Write;
use std::io::Read;

use crate::attributes::AttributeTable;
use crate::config::{Config, Feature, Property};
use crate::entities::{EntityMap, EntityTable};
use crate::errors::{ConfigError, Diagnostic, Error, Result};
use crate::events::{EventType, XmlDecl};
use crate::name::is_whitespace;
use crate::namespace::NamespaceTable;
use crate::source::{CharSource, ReadSource, StrSource};
use crate::utils::printable;

mod buffer;
mod element;
mod markup;
mod pending;
mod reference;
mod special;
mod state;

use buffer::InputBuffer;
use element::ElementStack;
use pending::PendingBuffer;

/// How much of the document a single advancing call consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Granularity {
    /// [`PullParser::next`]: text, references, CDATA sections, comments and
    /// processing instructions inside an element are merged into one `TEXT`
    Event,
    /// [`PullParser::next_token`]: every construct is its own event
    Token,
}

/// A transition that was already consumed from the input but not reported
/// yet, because an event had to be returned first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lookahead {
    None,
    /// `<` was consumed
    Markup,
    /// `&` was consumed
    Ampersand,
    /// `<` and the first character of a start tag name were consumed
    StartTag,
    /// `</` was consumed
    EndTag,
}

/// What the last scanned reference stands for.
#[derive(Clone, Copy, Debug)]
enum Reference {
    /// A name that is neither predefined nor defined
    Unresolved,
    Char(char),
    Predefined(&'static str),
    /// Index in the entity table
    Entity(usize),
}

/// Where the text of the current event is.
#[derive(Clone, Copy, Debug)]
enum TextSpan {
    /// Slice of the input buffer
    Input(usize, usize),
    /// Content of the pending buffer
    Pending,
}

/// A streaming pull parser for XML 1.0.
///
/// The parser reads characters from a [`CharSource`] in chunks and reports
/// the document as a flat sequence of events. Call [`next`] to get coalesced
/// events (`START_TAG`, `TEXT`, `END_TAG`, ...) or [`next_token`] to get every
/// construct of the document, including comments, processing instructions,
/// CDATA sections, entity references and whitespace outside of the root.
///
/// Everything about the current event (name, attributes, text) is available
/// through accessors until the next advancing call.
///
/// # Examples
///
/// ```
/// use xml_pull::{EventType, PullParser};
///
/// let xml = r#"<tag1 att1 = "test">
///                 <tag2><!--Test comment-->Test</tag2>
///                 <tag2>Test 2</tag2>
///             </tag1>"#;
/// let mut parser = PullParser::from_str(xml);
///
/// let mut count = 0;
/// let mut txt = Vec::new();
/// loop {
///     match parser.next() {
///         Ok(EventType::StartTag) => match parser.name() {
///             Some("tag1") => assert_eq!(parser.attribute_value(0), Some("test")),
///             Some("tag2") => count += 1,
///             _ => (),
///         },
///         Ok(EventType::Text) => {
///             if !parser.is_whitespace().unwrap() {
///                 txt.push(parser.text().unwrap().to_string());
///             }
///         }
///         Ok(EventType::EndDocument) => break,
///         Err(e) => panic!("{}", e),
///         _ => (),
///     }
/// }
/// assert_eq!(count, 2);
/// assert_eq!(txt, ["Test", "Test 2"]);
/// ```
///
/// [`next`]: Self::next
/// [`next_token`]: Self::next_token
pub struct PullParser<'i> {
    config: Config,
    input: InputBuffer<'i>,
    pending: PendingBuffer,
    entities: EntityTable,
    /// Definitions every new input starts with
    entity_map: Option<EntityMap>,
    elements: ElementStack,
    namespaces: NamespaceTable,
    attributes: AttributeTable,

    event_type: EventType,
    granularity: Granularity,
    lookahead: Lookahead,
    depth: usize,
    seen_root: bool,
    seen_docdecl: bool,
    /// The input ended after the root element was closed
    reached_end: bool,
    /// The start tag just reported was `<name/>`; `END_TAG` is reported next
    empty_element_tag: bool,
    /// An `END_TAG` was reported; leave the element on the next advance
    past_end_tag: bool,
    reference: Reference,
    text: Option<TextSpan>,
    xml_decl: XmlDecl,
    /// Offset of the first character after a byte order mark
    document_start: usize,
    /// Offset of the `<` of the start tag being parsed
    tag_start: usize,
}

impl<'i> Default for PullParser<'i> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder methods
impl<'i> PullParser<'i> {
    /// Creates a parser without input and with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            input: InputBuffer::new(),
            pending: PendingBuffer::new(),
            entities: EntityTable::default(),
            entity_map: None,
            elements: ElementStack::default(),
            namespaces: NamespaceTable::default(),
            attributes: AttributeTable::default(),
            event_type: EventType::StartDocument,
            granularity: Granularity::Event,
            lookahead: Lookahead::None,
            depth: 0,
            seen_root: false,
            seen_docdecl: false,
            reached_end: false,
            empty_element_tag: false,
            past_end_tag: false,
            reference: Reference::Unresolved,
            text: None,
            xml_decl: XmlDecl::default(),
            document_start: 0,
            tag_start: 0,
        }
    }

    /// Creates a parser that knows the entities of `map` for every input.
    pub fn with_entity_map(map: EntityMap) -> Self {
        let mut parser = Self::new();
        parser.entity_map = Some(map);
        parser
    }

    /// Creates a parser reading from a string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &'i str) -> Self {
        let mut parser = Self::new();
        parser.set_input_str(text);
        parser
    }

    /// Creates a parser decoding UTF-8 from a byte reader.
    pub fn from_reader<R: Read + 'i>(reader: R) -> Self {
        let mut parser = Self::new();
        parser.set_input_reader(reader);
        parser
    }

    /// Returns the configuration of this parser.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration of this parser.
    ///
    /// Unlike [`set_feature`](Self::set_feature), changes made through this
    /// reference are not checked; switching namespace processing in the
    /// middle of a document gives unspecified results.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Switches a feature.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NamespacesAfterStart`] when namespace processing is
    ///   changed after the first event was read
    /// - [`ConfigError::Unsupported`] when names interning or DOCTYPE
    ///   processing is enabled
    pub fn set_feature(&mut self, feature: Feature, value: bool) -> Result<()> {
        match feature {
            Feature::ProcessNamespaces => {
                if self.event_type != EventType::StartDocument {
                    return Err(ConfigError::NamespacesAfterStart.into());
                }
                self.config.process_namespaces = value;
            }
            Feature::XmlRoundtrip => self.config.xml_roundtrip = value,
            Feature::NamesInterned if value => {
                return Err(ConfigError::Unsupported("interning names").into())
            }
            Feature::ProcessDocdecl if value => {
                return Err(ConfigError::Unsupported("processing DOCDECL").into())
            }
            Feature::NamesInterned | Feature::ProcessDocdecl => {}
        }
        Ok(())
    }

    /// Returns the state of a feature.
    pub fn feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::ProcessNamespaces => self.config.process_namespaces,
            Feature::XmlRoundtrip => self.config.xml_roundtrip,
            Feature::NamesInterned | Feature::ProcessDocdecl => false,
        }
    }

    /// Sets a property. Only [`Property::Location`] can be written.
    pub fn set_property(&mut self, property: Property, value: Option<String>) -> Result<()> {
        match property {
            Property::Location => {
                self.config.location = value;
                Ok(())
            }
            Property::XmlDeclVersion => Err(ConfigError::ReadOnlyProperty("xmldecl-version").into()),
            Property::XmlDeclStandalone => {
                Err(ConfigError::ReadOnlyProperty("xmldecl-standalone").into())
            }
            Property::XmlDeclContent => Err(ConfigError::ReadOnlyProperty("xmldecl-content").into()),
        }
    }

    /// Returns the value of a property; `standalone` reads as `yes` or `no`.
    pub fn property(&self, property: Property) -> Option<&str> {
        match property {
            Property::Location => self.config.location.as_deref(),
            Property::XmlDeclVersion => self.xml_decl.version.as_deref(),
            Property::XmlDeclStandalone => self
                .xml_decl
                .standalone
                .map(|yes| if yes { "yes" } else { "no" }),
            Property::XmlDeclContent => self.xml_decl.content.as_deref(),
        }
    }
}

/// Input binding and entity definitions
impl<'i> PullParser<'i> {
    /// Starts parsing a new document from `source`, forgetting everything
    /// about the previous one. Entities defined with
    /// [`define_entity_replacement`](Self::define_entity_replacement) are
    /// forgotten too.
    pub fn set_input<S: CharSource + 'i>(&mut self, source: S) {
        log::debug!(target: "xml_pull::reader", "binding new input");
        self.input.reset(Some(Box::new(source)));
        self.reset_state();
    }

    /// Starts parsing a new document from a string.
    pub fn set_input_str(&mut self, text: &'i str) {
        self.set_input(StrSource::new(text));
    }

    /// Starts parsing a new document decoded as UTF-8 from a byte reader.
    pub fn set_input_reader<R: Read + 'i>(&mut self, reader: R) {
        self.set_input(ReadSource::new(reader));
    }

    fn reset_state(&mut self) {
        self.pending.reset();
        self.entities.reset(self.entity_map.as_ref());
        self.elements.clear();
        self.namespaces.clear();
        self.attributes.clear();
        self.event_type = EventType::StartDocument;
        self.granularity = Granularity::Event;
        self.lookahead = Lookahead::None;
        self.depth = 0;
        self.seen_root = false;
        self.seen_docdecl = false;
        self.reached_end = false;
        self.empty_element_tag = false;
        self.past_end_tag = false;
        self.reference = Reference::Unresolved;
        self.text = None;
        self.xml_decl = XmlDecl::default();
        self.document_start = 0;
        self.tag_start = 0;
    }

    /// Defines the replacement of `&name;` for the current input.
    ///
    /// If `text` is a single reference (`&#NN;`, `&#xNN;`, a predefined entity
    /// or an entity defined before) it is resolved now, so entities can be
    /// defined in terms of each other:
    ///
    /// ```
    /// use xml_pull::{EventType, PullParser};
    ///
    /// let mut parser = PullParser::from_str("<r>&bar;</r>");
    /// parser.define_entity_replacement("foo", "&#x159;").unwrap();
    /// parser.define_entity_replacement("bar", "&foo;").unwrap();
    /// parser.next().unwrap();
    /// assert_eq!(parser.next().unwrap(), EventType::Text);
    /// assert_eq!(parser.text(), Some("\u{159}"));
    /// ```
    ///
    /// # Errors
    ///
    /// Fails when no input is set, or when `text` is a character reference
    /// to a character not allowed in XML.
    pub fn define_entity_replacement(&mut self, name: &str, text: &str) -> Result<()> {
        if !self.input.has_source() {
            return Err(self.invalid_state("entity replacement text must be defined after setting input"));
        }
        let replacement = match self.entities.expand_definition(text) {
            Ok(r) => r.into_owned(),
            Err(e) => {
                let message = format!(
                    "replacement text '{}' of entity '{}' is invalid",
                    printable(text),
                    printable(name)
                );
                return Err(Error::InvalidState(self.diagnostic(message).caused_by(e)));
            }
        };
        log::debug!(target: "xml_pull::reader", "defining entity '{}'", name);
        self.entities.define(name, replacement);
        Ok(())
    }
}

/// Advancing
impl<'i> PullParser<'i> {
    /// Advances to the next event of the document and returns its kind.
    ///
    /// Only `START_TAG`, `TEXT`, `END_TAG` and `END_DOCUMENT` are reported.
    /// All character data between two tags, including expanded references,
    /// CDATA sections and the text around comments and processing
    /// instructions, is reported as one `TEXT` event with line endings
    /// normalized to `\n`. Whitespace outside of the root element is skipped.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<EventType> {
        self.granularity = Granularity::Event;
        self.advance()
    }

    /// Advances to the next construct of the document and returns its kind.
    ///
    /// In addition to the events of [`next`](Self::next), reports `COMMENT`,
    /// `PROCESSING_INSTRUCTION`, `CDSECT`, `DOCDECL`, `ENTITY_REF` and
    /// `IGNORABLE_WHITESPACE`. Text is split at every construct. Line endings
    /// are normalized unless [`Config::xml_roundtrip`] is set.
    pub fn next_token(&mut self) -> Result<EventType> {
        self.granularity = Granularity::Token;
        self.advance()
    }

    fn advance(&mut self) -> Result<EventType> {
        if !self.input.has_source() {
            return Err(self.invalid_state("input must be set before parsing is started"));
        }
        self.next_impl()
    }

    /// Reads the text content of a text-only element.
    ///
    /// Must be called on a `START_TAG`. If the element is empty, returns an
    /// empty string; otherwise the element must contain only text, which is
    /// returned. The parser is left on the `END_TAG` of the element.
    pub fn next_text(&mut self) -> Result<String> {
        if self.event_type != EventType::StartTag {
            return Err(self.invalid_state("parser must be on START_TAG to read next text"));
        }
        match self.next()? {
            EventType::Text => {
                let text = self.text().unwrap_or_default().to_string();
                let event = self.next()?;
                if event != EventType::EndTag {
                    return Err(self.invalid_state(format!(
                        "TEXT must be immediately followed by END_TAG and not {}",
                        event
                    )));
                }
                Ok(text)
            }
            EventType::EndTag => Ok(String::new()),
            _ => Err(self.invalid_state("parser must be on START_TAG or TEXT to read text")),
        }
    }

    /// Advances to the next `START_TAG` or `END_TAG`, skipping one
    /// whitespace-only `TEXT` in between.
    pub fn next_tag(&mut self) -> Result<EventType> {
        let mut event = self.next()?;
        if event == EventType::Text && self.is_whitespace()? {
            event = self.next()?;
        }
        if event != EventType::StartTag && event != EventType::EndTag {
            return Err(self.invalid_state(format!("expected START_TAG or END_TAG not {}", event)));
        }
        Ok(event)
    }

    /// Checks that the current event is of `kind` and, if given, has the
    /// namespace and name asked for.
    pub fn require(&self, kind: EventType, namespace: Option<&str>, name: Option<&str>) -> Result<()> {
        if !self.config.process_namespaces && namespace.map_or(false, |ns| !ns.is_empty()) {
            return Err(self.invalid_state(
                "processing namespaces must be enabled on parser (or factory) to have possible namespaces declared on elements",
            ));
        }
        let name_matches = name.map_or(true, |n| self.name() == Some(n));
        let namespace_matches = namespace.map_or(true, |ns| self.namespace_uri() == Some(ns));
        if kind == self.event_type && name_matches && namespace_matches {
            return Ok(());
        }

        let mut message = format!("expected event {}", kind);
        if let Some(n) = name {
            let _ = write!(message, " with name '{}'", n);
        }
        if let Some(ns) = namespace {
            if name.is_some() {
                message.push_str(" and");
            }
            let _ = write!(message, " with namespace '{}'", ns);
        }
        message.push_str(" but got");
        if kind != self.event_type {
            let _ = write!(message, " {}", self.event_type);
        }
        if let (false, Some(actual)) = (name_matches, self.name()) {
            let _ = write!(message, " name '{}'", actual);
        }
        if let (false, Some(actual)) = (namespace_matches, self.namespace_uri()) {
            if !name_matches {
                message.push_str(" and");
            }
            let _ = write!(message, " namespace '{}'", actual);
        }
        Err(self.invalid_state(message))
    }

    /// Skips everything up to and including the `END_TAG` that matches the
    /// current `START_TAG`.
    pub fn skip_subtree(&mut self) -> Result<()> {
        self.require(EventType::StartTag, None, None)?;
        let mut level = 1;
        while level > 0 {
            match self.next()? {
                EventType::StartTag => level += 1,
                EventType::EndTag => level -= 1,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Accessors
impl<'i> PullParser<'i> {
    /// Kind of the current event.
    #[inline]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Number of open elements: 1 on the `START_TAG` of the root element and
    /// on its `END_TAG`, 0 outside of it.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Line (1-based) of the next character to be read.
    #[inline]
    pub fn line_number(&self) -> usize {
        self.input.line
    }

    /// Column (1-based) of the next character to be read.
    #[inline]
    pub fn column_number(&self) -> usize {
        self.input.column
    }

    /// Name of the element on `START_TAG` and `END_TAG` (the local name when
    /// namespaces are processed) or of the entity on `ENTITY_REF`.
    pub fn name(&self) -> Option<&str> {
        match self.event_type {
            EventType::StartTag | EventType::EndTag => self.elements.get(self.depth).map(|f| f.name()),
            EventType::EntityRef => Some(self.input.slice(self.input.pos_start, self.input.pos_end)),
            _ => None,
        }
    }

    /// Name of the element exactly as written, with its prefix.
    pub fn raw_name(&self) -> Option<&str> {
        match self.event_type {
            EventType::StartTag | EventType::EndTag => {
                self.elements.get(self.depth).map(|f| f.raw_name())
            }
            _ => None,
        }
    }

    /// Prefix of the element on `START_TAG` and `END_TAG` when namespaces are
    /// processed.
    pub fn prefix(&self) -> Option<&str> {
        match self.event_type {
            EventType::StartTag | EventType::EndTag => {
                self.elements.get(self.depth).and_then(|f| f.prefix())
            }
            _ => None,
        }
    }

    /// Namespace URI of the element on `START_TAG` and `END_TAG`; `""` when
    /// the element has no namespace or namespaces are not processed.
    pub fn namespace_uri(&self) -> Option<&str> {
        match self.event_type {
            EventType::StartTag | EventType::EndTag => self.elements.get(self.depth).map(|f| f.uri()),
            _ => None,
        }
    }

    /// URI bound to `prefix` in the current scope; `""` asks for the default
    /// namespace.
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.resolve(prefix)
    }

    /// Number of namespace declarations in scope inside the element at
    /// `depth`. Declarations of the current element count on its
    /// `START_TAG`.
    pub fn namespace_count(&self, depth: usize) -> Result<usize> {
        if depth > self.depth {
            return Err(self.invalid_state(format!(
                "allowed namespace depth 0..{} not {}",
                self.depth, depth
            )));
        }
        if !self.config.process_namespaces {
            return Ok(0);
        }
        Ok(self.elements.namespace_count(depth))
    }

    /// Prefix of the namespace declaration at `pos`, `""` for a default
    /// namespace declaration.
    pub fn namespace_prefix(&self, pos: usize) -> Result<&str> {
        match self.namespaces.prefix(pos) {
            Some(p) => Ok(p),
            None => Err(self.namespace_position_error(pos)),
        }
    }

    /// URI of the namespace declaration at `pos`.
    pub fn namespace_uri_at(&self, pos: usize) -> Result<&str> {
        match self.namespaces.uri(pos) {
            Some(u) => Ok(u),
            None => Err(self.namespace_position_error(pos)),
        }
    }

    fn namespace_position_error(&self, pos: usize) -> Error {
        self.invalid_state(format!(
            "position {} exceeded number of available namespaces {}",
            pos,
            self.namespaces.len()
        ))
    }

    /// Returns `true` if the current `START_TAG` was written as `<name/>`.
    pub fn is_empty_element_tag(&self) -> Result<bool> {
        if self.event_type != EventType::StartTag {
            return Err(self.invalid_state("parser must be on START_TAG to check for empty element"));
        }
        Ok(self.empty_element_tag)
    }

    /// Number of attributes of the current `START_TAG`; `None` for other events.
    /// Namespace declarations are not counted when namespaces are processed.
    pub fn attribute_count(&self) -> Option<usize> {
        match self.event_type {
            EventType::StartTag => Some(self.attributes.len()),
            _ => None,
        }
    }

    fn attribute(&self, index: usize) -> Option<&crate::attributes::AttributeEntry> {
        match self.event_type {
            EventType::StartTag => self.attributes.get(index),
            _ => None,
        }
    }

    /// Name of the attribute at `index`, the local name when namespaces are
    /// processed.
    pub fn attribute_name(&self, index: usize) -> Option<&str> {
        self.attribute(index).map(|a| a.name())
    }

    /// Prefix of the attribute at `index`, if it has one and namespaces are
    /// processed.
    pub fn attribute_prefix(&self, index: usize) -> Option<&str> {
        self.attribute(index).and_then(|a| a.prefix())
    }

    /// Namespace URI of the attribute at `index`; `""` when unprefixed.
    pub fn attribute_namespace(&self, index: usize) -> Option<&str> {
        self.attribute(index).map(|a| a.uri())
    }

    /// Value of the attribute at `index`, with references expanded.
    pub fn attribute_value(&self, index: usize) -> Option<&str> {
        self.attribute(index).map(|a| a.value())
    }

    /// Type of the attribute at `index`. Without DTD processing every
    /// attribute is `CDATA`.
    pub fn attribute_type(&self, index: usize) -> Option<&'static str> {
        self.attribute(index).map(|_| "CDATA")
    }

    /// Whether the attribute at `index` was defaulted from a DTD rather than
    /// written in the tag. Always `false`, as DTDs are not processed.
    pub fn is_attribute_default(&self, index: usize) -> Option<bool> {
        self.attribute(index).map(|_| false)
    }

    /// Value of the attribute with the given name.
    ///
    /// When namespaces are processed, `name` is a local name and `namespace`,
    /// if given, must be the attribute's namespace URI. Otherwise `name` is
    /// the name as written and `namespace` is ignored.
    pub fn attribute_value_by_name(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        match self.event_type {
            EventType::StartTag => {
                self.attributes
                    .value_of(self.config.process_namespaces, namespace, name)
            }
            _ => None,
        }
    }

    /// Text of the current event.
    ///
    /// - `TEXT`, `CDSECT`, `IGNORABLE_WHITESPACE`: the characters
    /// - `COMMENT`: what is between `<!--` and `-->`
    /// - `PROCESSING_INSTRUCTION`: what is between `<?` and `?>`
    /// - `DOCDECL`: what follows `<!DOCTYPE` up to the closing `>`
    /// - `ENTITY_REF`: the replacement, `None` if the entity is not defined
    /// - `START_TAG`, `END_TAG`: the tag as written
    /// - `START_DOCUMENT`, `END_DOCUMENT`: `None`
    pub fn text(&self) -> Option<&str> {
        match self.text? {
            TextSpan::Input(start, end) => Some(self.input.slice(start, end)),
            TextSpan::Pending => Some(self.pending.as_str()),
        }
    }

    /// Checks whether the text of the current `TEXT`, `CDSECT` or
    /// `IGNORABLE_WHITESPACE` consists of whitespace only.
    pub fn is_whitespace(&self) -> Result<bool> {
        match self.event_type {
            EventType::Text | EventType::CData => {
                Ok(self.text().unwrap_or_default().chars().all(is_whitespace))
            }
            EventType::IgnorableWhitespace => Ok(true),
            _ => Err(self.invalid_state("no content available to check for whitespaces")),
        }
    }

    /// Content of the XML declaration of the document.
    pub fn xml_decl(&self) -> &XmlDecl {
        &self.xml_decl
    }

    /// Describes where the parser is: the current event, the input around
    /// the current position and the line and column, like
    /// `START_TAG seen <root>&otherentity;... @1:20`.
    pub fn position_description(&self) -> String {
        let buf = self.input.as_str();
        let (start, end) = (self.input.pos_start, self.input.pos);
        let mut out = String::from(self.event_type.as_str());
        if start <= end && end <= buf.len() && buf.is_char_boundary(start) {
            let from = fragment_start(buf, start, end);
            if from < end {
                out.push_str(" seen ");
                if self.input.absolute_start > 0 || from > 0 {
                    out.push_str("...");
                }
                out.push_str(&printable(&buf[from..end]));
                out.push_str("...");
            }
        }
        out.push(' ');
        if let Some(location) = &self.config.location {
            out.push_str(location);
        }
        let _ = write!(out, "@{}:{}", self.input.line, self.input.column);
        out
    }
}

/// Bookkeeping shared by the scanners
impl<'i> PullParser<'i> {
    /// Makes `event` the current event and remembers where its text is.
    fn emit(&mut self, event: EventType) -> EventType {
        self.event_type = event;
        self.text = match event {
            EventType::StartDocument | EventType::EndDocument => None,
            EventType::EntityRef => match self.reference {
                Reference::Unresolved => None,
                _ => Some(TextSpan::Pending),
            },
            EventType::StartTag | EventType::EndTag => {
                Some(TextSpan::Input(self.input.pos_start, self.input.pos_end))
            }
            _ if self.pending.is_active() => Some(TextSpan::Pending),
            _ => Some(TextSpan::Input(self.input.pos_start, self.input.pos_end)),
        };
        event
    }

    fn diagnostic(&self, message: String) -> Diagnostic {
        Diagnostic {
            message,
            line: self.input.line,
            column: self.input.column,
            position: self.position_description(),
            cause: None,
        }
    }

    fn ill_formed(&self, message: impl Into<String>) -> Error {
        Error::IllFormed(self.diagnostic(message.into()))
    }

    fn unexpected_eof(&self, message: impl Into<String>) -> Error {
        Error::UnexpectedEof(self.diagnostic(message.into()))
    }

    fn invalid_state(&self, message: impl Into<String>) -> Error {
        Error::InvalidState(self.diagnostic(message.into()))
    }

    /// End of input inside a construct that started at a known place.
    fn unterminated(&self, message: String, cause: Error) -> Error {
        Error::UnexpectedEof(self.diagnostic(message).caused_by(cause))
    }
}

/// Finds where the fragment shown by a position description starts: at most
/// 65 bytes back from `end`, preferably at a `<` well before `start`.
fn fragment_start(buf: &str, start: usize, end: usize) -> usize {
    let mut start = start;
    if end - start > 65 {
        start = floor_char_boundary(buf, end - 10);
    }
    let mut i = start;
    loop {
        if i == 0 || end - i > 65 {
            return i;
        }
        if buf.as_bytes().get(i) == Some(&b'<') && start - i > 10 {
            return i;
        }
        i = floor_char_boundary(buf, i - 1);
    }
}

fn floor_char_boundary(buf: &str, mut index: usize) -> usize {
    while index > 0 && !buf.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fragment_walks_back_to_start_of_short_input() {
        let buf = "<root>&otherentity;";
        assert_eq!(fragment_start(buf, 7, buf.len()), 0);
    }

    #[test]
    fn fragment_of_span_at_end_of_input() {
        let buf = "<!DOCTYPE";
        assert_eq!(fragment_start(buf, buf.len(), buf.len()), 0);
    }

    #[test]
    fn fragment_is_bounded() {
        let buf = format!("<a>{}<b>text", "x".repeat(100));
        let end = buf.len();
        let from = fragment_start(&buf, 0, end);
        assert!(end - from <= 66, "{}", end - from);
    }

    #[test]
    fn fragment_stops_at_markup() {
        let buf = format!("<a>{}<b>{}", "x".repeat(20), "y".repeat(20));
        let start = buf.len() - 5;
        // `<b>` is more than 10 bytes before `start`
        assert_eq!(fragment_start(&buf, start, buf.len()), 23);
    }

    #[test]
    fn position_description_is_stable() {
        let mut parser = PullParser::from_str("<root>&otherentity;</root>");
        assert!(parser.next().is_ok());
        let err = parser.next().unwrap_err();
        let first = parser.position_description();
        assert_eq!(first, parser.position_description());
        assert_eq!(
            err.diagnostic().unwrap().position,
            "START_TAG seen <root>&otherentity;... @1:20"
        );
    }

    #[test]
    fn namespaces_locked_after_start() {
        let mut parser = PullParser::from_str("<a/>");
        parser.set_feature(Feature::ProcessNamespaces, true).unwrap();
        parser.next().unwrap();
        assert!(matches!(
            parser.set_feature(Feature::ProcessNamespaces, false),
            Err(Error::Config(ConfigError::NamespacesAfterStart))
        ));
        assert!(parser.set_feature(Feature::XmlRoundtrip, true).is_ok());
        assert!(parser.feature(Feature::XmlRoundtrip));
        assert!(matches!(
            parser.set_feature(Feature::NamesInterned, true),
            Err(Error::Config(ConfigError::Unsupported(_)))
        ));
        assert!(parser.set_feature(Feature::ProcessDocdecl, false).is_ok());
    }
}
