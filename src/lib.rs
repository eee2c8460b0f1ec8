//! Streaming XML pull parser.
//!
//! ## Description
//!
//! `xml-pull` reads an XML 1.0 document from a character source chunk by chunk
//! and lets the application pull it as a sequence of events, without ever
//! building a tree or holding the whole document in memory.
//!
//! The [`PullParser`] can be driven at two granularities:
//!
//! - [`PullParser::next`] reports `START_TAG`, `TEXT`, `END_TAG` and
//!   `END_DOCUMENT`. Character data between tags is merged into a single
//!   `TEXT` event, with references expanded and line endings normalized.
//! - [`PullParser::next_token`] additionally reports comments, processing
//!   instructions, CDATA sections, the document type declaration, entity
//!   references and whitespace outside of the root element, each as its own
//!   event. With [`Config::xml_roundtrip`] the text of every token is exactly
//!   what the document contains.
//!
//! Namespace processing can be enabled with [`Config::process_namespaces`].
//!
//! ## Example
//!
//! ```rust
//! use xml_pull::{EventType, Feature, PullParser};
//!
//! let xml = r#"<doc xmlns="urn:doc" xmlns:x="urn:x">
//!                  <x:item id="1">one &amp; two</x:item>
//!              </doc>"#;
//! let mut parser = PullParser::from_str(xml);
//! parser.set_feature(Feature::ProcessNamespaces, true).unwrap();
//!
//! assert_eq!(parser.next_tag().unwrap(), EventType::StartTag);
//! assert_eq!(parser.name(), Some("doc"));
//! assert_eq!(parser.namespace_uri(), Some("urn:doc"));
//!
//! assert_eq!(parser.next_tag().unwrap(), EventType::StartTag);
//! assert_eq!(parser.prefix(), Some("x"));
//! assert_eq!(parser.namespace_uri(), Some("urn:x"));
//! assert_eq!(parser.attribute_value_by_name(None, "id"), Some("1"));
//! assert_eq!(parser.next_text().unwrap(), "one & two");
//!
//! assert_eq!(parser.next_tag().unwrap(), EventType::EndTag);
//! assert_eq!(parser.next().unwrap(), EventType::EndDocument);
//! ```
//!
//! ## Logging
//!
//! The parser emits records through the [`log`] facade: `debug` when an input
//! is bound, an entity is defined or an XML declaration is read, `trace` when
//! internal buffers are compacted or grown. No logger is installed by this crate.
//!
//! [`log`]: https://docs.rs/log
#![deny(missing_docs)]

mod attributes;
pub mod config;
pub mod entities;
pub mod errors;
pub mod escape;
pub mod events;
pub mod name;
pub mod namespace;
pub mod reader;
pub mod source;
mod utils;

// reexports
pub use crate::config::{Config, Feature, Property};
pub use crate::entities::EntityMap;
pub use crate::errors::{ConfigError, Diagnostic, Error, Result};
pub use crate::events::{EventType, XmlDecl};
pub use crate::reader::PullParser;
pub use crate::source::{CharSource, ReadSource, StrSource};
