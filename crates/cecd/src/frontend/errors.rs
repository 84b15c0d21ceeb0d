//! Error types for the JSONL front-end.

use std::io;

use thiserror::Error;

/// Errors surfaced while framing requests and responses.
#[derive(Debug, Error)]
pub enum FrontendError {
    /// Request line could not be parsed as JSON.
    #[error("malformed JSONL: {message}")]
    MalformedJsonl {
        /// Parser diagnostic.
        message: String,
        /// Underlying parser error, when one exists.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The `method` field names no supported operation.
    #[error("unknown method: {method}")]
    UnknownMethod {
        /// Method as received.
        method: String,
    },

    /// The `params` object does not match the method's schema.
    #[error("invalid params for {method}: {source}")]
    InvalidParams {
        /// Method whose params were rejected.
        method: String,
        /// Underlying deserialisation error.
        #[source]
        source: serde_json::Error,
    },

    /// Request exceeds the maximum allowed size.
    #[error("request too large: {size} bytes exceeds {max_size} byte limit")]
    RequestTooLarge {
        /// Received size in bytes.
        size: usize,
        /// Maximum accepted size in bytes.
        max_size: usize,
    },

    /// IO error during read or write.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Response serialisation failed.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[from] serde_json::Error),

    /// The response writer thread panicked.
    #[error("response writer panicked")]
    WriterPanicked,
}

impl FrontendError {
    /// Builds a malformed-input error without an underlying source.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedJsonl {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a JSON parse error.
    #[must_use]
    pub fn from_json_error(error: serde_json::Error) -> Self {
        Self::MalformedJsonl {
            message: error.to_string(),
            source: Some(error),
        }
    }

    /// Returns `true` when the error describes a bad request rather than a
    /// failure of the stream itself.
    #[must_use]
    pub const fn is_bad_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedJsonl { .. }
                | Self::UnknownMethod { .. }
                | Self::InvalidParams { .. }
                | Self::RequestTooLarge { .. }
        )
    }
}
