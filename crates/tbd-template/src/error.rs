//! Error types for template execution.

use std::io;

use thiserror::Error;

/// Errors that can occur while substituting placeholders.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Writing to the sink failed, or a [`TagFunc`](crate::TagFunc) reported
    /// a failure. The `io::Error` is the one returned by the sink or the
    /// callback, untouched.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A mapping value has no byte rendering.
    #[error("tag={tag:?} contains unexpected value type={kind}. Expected bytes, text or TagFunc")]
    UnexpectedValue { tag: String, kind: &'static str },

    /// The text-returning variants produced bytes that are not valid UTF-8.
    #[error("substitution produced invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

impl TemplateError {
    /// Create an unexpected value error.
    pub fn unexpected_value(tag: impl Into<String>, kind: &'static str) -> Self {
        Self::UnexpectedValue {
            tag: tag.into(),
            kind,
        }
    }
}

/// A failed execution, together with the bytes written before it failed.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ExecuteError {
    written: u64,
    #[source]
    source: TemplateError,
}

impl ExecuteError {
    pub(crate) fn new(written: u64, source: TemplateError) -> Self {
        Self { written, source }
    }

    /// Number of bytes that reached the sink before the failure.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// The underlying error.
    pub fn error(&self) -> &TemplateError {
        &self.source
    }

    /// Discards the byte count and returns the underlying error.
    pub fn into_inner(self) -> TemplateError {
        self.source
    }
}

impl From<ExecuteError> for TemplateError {
    fn from(err: ExecuteError) -> Self {
        err.source
    }
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;
