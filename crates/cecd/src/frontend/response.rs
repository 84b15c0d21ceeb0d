//! Response serialisation for the JSONL front-end.
//!
//! Successful replies carry `"returnValue": true` next to the command's
//! data fields (`cecAdapters`, `devices`, `payload`, `key`/`value`).
//! Failures carry `"returnValue": false` with `errorCode` and `errorText`.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use cec_core::{CommandResult, ErrorInfo, ErrorKind, ResultData};

use super::errors::FrontendError;

/// Body of a response, flattened next to `returnValue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Success data.
    Data(ResultData),
    /// Failure details.
    Error(ErrorInfo),
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendResponse {
    /// Correlation token copied from the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// `true` when the command succeeded.
    pub return_value: bool,
    /// Data or error fields.
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl FrontendResponse {
    /// Builds the response for a completed command.
    #[must_use]
    pub fn from_result(id: Option<Value>, result: CommandResult) -> Self {
        match result.into_outcome() {
            Ok(data) => Self {
                id,
                return_value: true,
                body: ResponseBody::Data(data),
            },
            Err(error) => Self::failure(id, error),
        }
    }

    /// Builds a failure response.
    #[must_use]
    pub fn failure(id: Option<Value>, error: impl Into<ErrorInfo>) -> Self {
        Self {
            id,
            return_value: false,
            body: ResponseBody::Error(error.into()),
        }
    }

    /// Failure response for a request the front-end could not type.
    #[must_use]
    pub fn bad_input(id: Option<Value>) -> Self {
        Self::failure(id, ErrorKind::BadInput)
    }
}

/// Writer that serialises responses as JSONL.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one response line and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation, writing or flushing fails.
    pub fn write_response(&mut self, response: &FrontendResponse) -> Result<(), FrontendError> {
        serde_json::to_writer(&mut self.writer, response)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Returns the wrapped stream.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}
