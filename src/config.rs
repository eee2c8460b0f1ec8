//! Parser configuration: features that change how the document is parsed and
//! properties that can be queried by their well-known keys.

use crate::errors::ConfigError;
use std::str::FromStr;

/// Options of a [`PullParser`].
///
/// [`PullParser`]: crate::PullParser
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Config {
    /// Split element and attribute names into prefix and local name, resolve
    /// prefixes to namespace URIs, and treat `xmlns` attributes as namespace
    /// declarations instead of regular attributes.
    ///
    /// Can only be changed before the first event is read; use
    /// [`PullParser::set_feature`] to have that enforced.
    ///
    /// Default: `false`
    ///
    /// [`PullParser::set_feature`]: crate::PullParser::set_feature
    pub process_namespaces: bool,

    /// Report the text of tokens as it is written in the document, without
    /// converting `\r\n` and `\r` into `\n`. Only affects
    /// [`PullParser::next_token`]; [`PullParser::next`] always normalizes.
    ///
    /// Default: `false`
    ///
    /// [`PullParser::next_token`]: crate::PullParser::next_token
    /// [`PullParser::next`]: crate::PullParser::next
    pub xml_roundtrip: bool,

    /// Name of the input (a file name or an URL) printed in position
    /// descriptions.
    ///
    /// Default: `None`
    pub location: Option<String>,
}

/// Features of the parser that can be switched by their XmlPull key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum Feature {
    /// See [`Config::process_namespaces`]
    ProcessNamespaces,
    /// See [`Config::xml_roundtrip`]
    XmlRoundtrip,
    /// Names are interned. Always `false`; cannot be enabled.
    NamesInterned,
    /// DOCTYPE declarations are processed. Always `false`; cannot be enabled.
    ProcessDocdecl,
}

impl Feature {
    /// The well-known key of the feature.
    pub const fn key(&self) -> &'static str {
        match self {
            Feature::ProcessNamespaces => "http://xmlpull.org/v1/doc/features.html#process-namespaces",
            Feature::XmlRoundtrip => "http://xmlpull.org/v1/doc/features.html#xml-roundtrip",
            Feature::NamesInterned => "http://xmlpull.org/v1/doc/features.html#names-interned",
            Feature::ProcessDocdecl => "http://xmlpull.org/v1/doc/features.html#process-docdecl",
        }
    }
}

impl FromStr for Feature {
    type Err = ConfigError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        [
            Feature::ProcessNamespaces,
            Feature::XmlRoundtrip,
            Feature::NamesInterned,
            Feature::ProcessDocdecl,
        ]
        .into_iter()
        .find(|f| f.key() == key)
        .ok_or_else(|| ConfigError::UnknownFeature(key.to_string()))
    }
}

/// Properties of the parser that can be queried by their XmlPull key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-types", derive(serde::Deserialize, serde::Serialize))]
pub enum Property {
    /// See [`Config::location`]. The only writable property.
    Location,
    /// `version` of the XML declaration
    XmlDeclVersion,
    /// `standalone` of the XML declaration
    XmlDeclStandalone,
    /// Everything between `<?xml` and `?>`
    XmlDeclContent,
}

impl Property {
    /// The well-known key of the property.
    pub const fn key(&self) -> &'static str {
        match self {
            Property::Location => "http://xmlpull.org/v1/doc/properties.html#location",
            Property::XmlDeclVersion => "http://xmlpull.org/v1/doc/properties.html#xmldecl-version",
            Property::XmlDeclStandalone => {
                "http://xmlpull.org/v1/doc/properties.html#xmldecl-standalone"
            }
            Property::XmlDeclContent => "http://xmlpull.org/v1/doc/properties.html#xmldecl-content",
        }
    }
}

impl FromStr for Property {
    type Err = ConfigError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        [
            Property::Location,
            Property::XmlDeclVersion,
            Property::XmlDeclStandalone,
            Property::XmlDeclContent,
        ]
        .into_iter()
        .find(|p| p.key() == key)
        .ok_or_else(|| ConfigError::UnknownProperty(key.to_string()))
    }
}
