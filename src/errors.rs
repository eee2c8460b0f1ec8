//! Error management module

use std::fmt;
use std::io::Error as IoError;
use std::sync::Arc;

/// A failure located in the parsed document.
///
/// Carries the human readable message together with the line and column
/// the parser was at and the [position description] of that moment. When the
/// failure was provoked by another one (for example, end of input inside a
/// comment), the original error is kept as the `cause`.
///
/// [position description]: crate::PullParser::position_description
#[derive(Debug)]
pub struct Diagnostic {
    /// Description of the problem
    pub message: String,
    /// Line (1-based) of the parser when the problem was detected
    pub line: usize,
    /// Column (1-based) of the parser when the problem was detected
    pub column: usize,
    /// Snapshot of [`PullParser::position_description`] when the problem was detected
    ///
    /// [`PullParser::position_description`]: crate::PullParser::position_description
    pub position: String,
    /// The error that provoked this one
    pub cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Diagnostic {
    /// Chains `cause` to this diagnostic.
    pub(crate) fn caused_by<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (position: {})", self.message, self.position)?;
        if let Some(cause) = &self.cause {
            write!(f, " caused by: {}", cause)?;
        }
        Ok(())
    }
}

/// A configuration request that the parser cannot honor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The feature key is not known
    UnknownFeature(String),
    /// The property key is not known
    UnknownProperty(String),
    /// The feature is known, but the requested value is not supported
    Unsupported(&'static str),
    /// The property can only be read
    ReadOnlyProperty(&'static str),
    /// Namespace processing was toggled after the first event was read
    NamespacesAfterStart,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::UnknownFeature(name) => write!(f, "unsupported feature {}", name),
            ConfigError::UnknownProperty(name) => write!(f, "unsupported property: '{}'", name),
            ConfigError::Unsupported(what) => write!(f, "{} is not supported", what),
            ConfigError::ReadOnlyProperty(name) => write!(f, "property '{}' is read only", name),
            ConfigError::NamespacesAfterStart => write!(
                f,
                "namespace processing feature can only be changed before parsing"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The error type used by this crate.
#[derive(Debug)]
pub enum Error {
    /// The character source failed. Sources are not retried, so this error
    /// is fatal for the current parse.
    Io(Arc<IoError>),
    /// The document is not well-formed.
    IllFormed(Diagnostic),
    /// The source was exhausted while the document was structurally incomplete:
    /// inside an open element, an unterminated comment, processing instruction,
    /// CDATA section or document type declaration, or the input was empty.
    UnexpectedEof(Diagnostic),
    /// A convenience method or accessor was used while the parser was on an
    /// event it does not apply to.
    InvalidState(Diagnostic),
    /// A feature or property could not be set.
    Config(ConfigError),
}

impl Error {
    /// Returns the located diagnostic of this error, if any.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Error::IllFormed(d) | Error::UnexpectedEof(d) | Error::InvalidState(d) => Some(d),
            Error::Io(_) | Error::Config(_) => None,
        }
    }
}

impl From<IoError> for Error {
    /// Creates a new `Error::Io` from the given error
    #[inline]
    fn from(error: IoError) -> Error {
        Error::Io(Arc::new(error))
    }
}

impl From<ConfigError> for Error {
    /// Creates a new `Error::Config` from the given error
    #[inline]
    fn from(error: ConfigError) -> Error {
        Error::Config(error)
    }
}

/// A specialized `Result` type where the error is hard-wired to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::IllFormed(d) => write!(f, "ill-formed document: {}", d),
            Error::UnexpectedEof(d) => write!(f, "unexpected end of input: {}", d),
            Error::InvalidState(d) => write!(f, "{}", d),
            Error::Config(e) => write!(f, "configuration error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e.as_ref()),
            Error::Config(e) => Some(e),
            Error::IllFormed(d) | Error::UnexpectedEof(d) | Error::InvalidState(d) => d
                .cause
                .as_ref()
                .map(|c| c.as_ref() as &(dyn std::error::Error + 'static)),
        }
    }
}
