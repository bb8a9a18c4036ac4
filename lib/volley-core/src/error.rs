//! Error types for volley.
//!
//! Every variant names the stage that failed: URL parsing, request
//! construction, transport, body read, or body decoding.

use derive_more::{Display, Error, From};

/// Main error type for volley operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The target string is not a parseable URL.
    ///
    /// Raised before any network activity.
    #[display("malformed URL '{url}': {source}")]
    #[from(skip)]
    MalformedUrl {
        /// The string that failed to parse.
        #[error(not(source))]
        url: String,
        /// Underlying parser error.
        source: url::ParseError,
    },

    /// The method, URL, headers and body cannot form a valid request.
    #[display("failed to construct request: {_0}")]
    #[from(skip)]
    RequestConstruction(#[error(not(source))] String),

    /// Network/connection errors.
    #[display("connection error: {message}")]
    #[from(skip)]
    Connection {
        /// What went wrong, with the cause chain flattened.
        message: String,
        /// Underlying transport error, when there is one.
        source: Option<BoxError>,
    },

    /// TLS/SSL errors.
    #[display("TLS error: {message}")]
    #[from(skip)]
    Tls {
        /// What went wrong, with the cause chain flattened.
        message: String,
        /// Underlying transport error, when there is one.
        source: Option<BoxError>,
    },

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The response body stream failed, or was already consumed.
    #[display("failed to read response body: {_0}")]
    #[from(skip)]
    BodyRead(#[error(not(source))] String),

    /// The parser selected by the declared content type rejected the body.
    #[display("failed to decode '{content_type}' body: {message}")]
    #[from(skip)]
    Decode {
        /// Declared content type that selected the parser.
        content_type: String,
        /// Parser error message.
        message: String,
    },

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Form URL-encoded serialization error.
    #[display("form serialization error: {_0}")]
    #[from]
    FormSerialization(serde_urlencoded::ser::Error),
}

/// Boxed cause carried by transport errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a malformed URL error.
    #[must_use]
    pub fn malformed_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::MalformedUrl {
            url: url.into(),
            source,
        }
    }

    /// Create a request construction error.
    #[must_use]
    pub fn request_construction(message: impl Into<String>) -> Self {
        Self::RequestConstruction(message.into())
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error wrapping its cause.
    #[must_use]
    pub fn connection_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls {
            message: message.into(),
            source: None,
        }
    }

    /// Create a TLS error wrapping its cause.
    #[must_use]
    pub fn tls_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Tls {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a body read error.
    #[must_use]
    pub fn body_read(message: impl Into<String>) -> Self {
        Self::BodyRead(message.into())
    }

    /// Create a decode error for the given content type.
    #[must_use]
    pub fn decode(content_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            content_type: content_type.into(),
            message: message.into(),
        }
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Returns `true` if the transport failed to complete the exchange
    /// (connection, TLS or timeout).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Tls { .. } | Self::Timeout
        )
    }

    /// Returns `true` if the target URL could not be parsed.
    #[must_use]
    pub const fn is_malformed_url(&self) -> bool {
        matches!(self, Self::MalformedUrl { .. })
    }

    /// Returns `true` if the response body could not be read.
    #[must_use]
    pub const fn is_body_read(&self) -> bool {
        matches!(self, Self::BodyRead(_))
    }

    /// Returns `true` if the response body could not be decoded.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
