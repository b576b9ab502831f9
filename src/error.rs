//! Error types for wirestruct.
//!
//! Every layer wraps the error it receives with a short prefix
//! (`"Adapter field 2 read error: "`) instead of replacing it, so the
//! outermost caller sees the full chain and can still reach the original
//! cause through [`std::error::Error::source`] or [`ProtocolError::root_cause`].

use thiserror::Error;

/// Main error type for all encode/decode operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// I/O error on the underlying stream (including truncated input).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A wire-type byte that does not name any known type.
    #[error("invalid wire type tag: {0:#04x}")]
    InvalidTag(u8),

    /// A length or count field decoded to a negative value.
    #[error("negative size: {0}")]
    NegativeSize(i64),

    /// A length or count exceeds the configured limit (or the encoding's range).
    #[error("size {size} exceeds limit {limit}")]
    SizeLimit { size: u64, limit: u64 },

    /// Struct or skip nesting went deeper than allowed.
    #[error("nesting depth exceeds limit {0}")]
    DepthLimit(usize),

    /// Well-formed bytes carrying a value the decoder cannot accept.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// JSON syntax error (JSON protocol only).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field never appeared in the frame.
    #[error("required field {id}:{name} is not set")]
    MissingRequiredField { id: i16, name: &'static str },

    /// Another error with a prefix describing the failed operation.
    #[error("{context}{source}")]
    Context {
        context: String,
        #[source]
        source: Box<ProtocolError>,
    },
}

impl ProtocolError {
    /// Wrap this error with an operation prefix.
    pub fn context(self, context: impl Into<String>) -> Self {
        ProtocolError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all context layers stripped.
    pub fn root_cause(&self) -> &ProtocolError {
        let mut current = self;
        while let ProtocolError::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// True when the stream ended before a complete value was read.
    pub fn is_unexpected_eof(&self) -> bool {
        match self.root_cause() {
            ProtocolError::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            ProtocolError::Json(e) => e.is_eof(),
            _ => false,
        }
    }

    pub(crate) fn invalid_data(msg: impl Into<String>) -> Self {
        ProtocolError::InvalidData(msg.into())
    }
}

/// Result type alias using ProtocolError.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Adds context prefixes to results carrying a [`ProtocolError`].
pub trait ResultExt<T> {
    /// Prefix the error, if any, with a fixed string.
    fn context(self, context: &str) -> Result<T>;

    /// Prefix the error, if any, with a lazily built string.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}
