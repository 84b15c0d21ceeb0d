//! Request deserialisation for the JSONL front-end.
//!
//! Each line is an envelope `{"method": ..., "params": {...}, "id": ...}`.
//! The optional `id` is echoed back verbatim on the matching response so a
//! client can correlate replies that complete out of order.

use serde::Deserialize;
use serde_json::{Map, Value};

use cec_core::{CommandKind, CommandPayload};

use super::errors::FrontendError;

/// Maximum accepted request line length in bytes.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Parsed request envelope.
#[derive(Debug, Deserialize)]
pub struct FrontendRequest {
    /// Method name, e.g. `sendCommand`.
    pub method: String,
    /// Method parameters; absent or `null` means no parameters.
    #[serde(default)]
    pub params: Value,
    /// Client correlation token.
    #[serde(default)]
    pub id: Option<Value>,
}

impl FrontendRequest {
    /// Parses a JSONL line into a request envelope.
    ///
    /// Trailing whitespace, including the newline delimiter, is trimmed
    /// before parsing.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::RequestTooLarge`] for oversized lines and
    /// [`FrontendError::MalformedJsonl`] when the line is empty or does not
    /// match the envelope schema.
    pub fn parse(line: &[u8]) -> Result<Self, FrontendError> {
        if line.len() > MAX_REQUEST_BYTES {
            return Err(FrontendError::RequestTooLarge {
                size: line.len(),
                max_size: MAX_REQUEST_BYTES,
            });
        }
        let trimmed = trim_trailing_whitespace(line);
        if trimmed.is_empty() {
            return Err(FrontendError::malformed("empty request line"));
        }

        serde_json::from_slice(trimmed).map_err(FrontendError::from_json_error)
    }

    /// Command kind named by `method`.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::UnknownMethod`] for unsupported methods.
    pub fn kind(&self) -> Result<CommandKind, FrontendError> {
        match self.method.trim() {
            "listAdapters" => Ok(CommandKind::ListAdapters),
            "scan" => Ok(CommandKind::Scan),
            "sendCommand" => Ok(CommandKind::SendCommand),
            "getConfig" => Ok(CommandKind::GetConfig),
            "setConfig" => Ok(CommandKind::SetConfig),
            other => Err(FrontendError::UnknownMethod {
                method: other.to_owned(),
            }),
        }
    }

    /// Converts the envelope into a typed command payload.
    ///
    /// # Errors
    ///
    /// Returns [`FrontendError::UnknownMethod`] or
    /// [`FrontendError::InvalidParams`] when the request cannot be typed.
    pub fn into_payload(self) -> Result<CommandPayload, FrontendError> {
        let kind = self.kind()?;
        let params = match self.params {
            Value::Null => Value::Object(Map::new()),
            params => params,
        };
        let invalid = |source: serde_json::Error| FrontendError::InvalidParams {
            method: kind.as_str().to_owned(),
            source,
        };
        let payload = match kind {
            CommandKind::ListAdapters => CommandPayload::ListAdapters,
            CommandKind::Scan => {
                CommandPayload::Scan(serde_json::from_value(params).map_err(invalid)?)
            }
            CommandKind::SendCommand => {
                CommandPayload::SendCommand(serde_json::from_value(params).map_err(invalid)?)
            }
            CommandKind::GetConfig => {
                CommandPayload::GetConfig(serde_json::from_value(params).map_err(invalid)?)
            }
            CommandKind::SetConfig => {
                CommandPayload::SetConfig(serde_json::from_value(params).map_err(invalid)?)
            }
        };
        Ok(payload)
    }
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    bytes.get(..end).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use cec_core::{CecCommand, CecCommandArg, SendCommandRequest};
    use rstest::rstest;

    use super::*;

    #[test]
    fn parses_minimal_request() {
        let request = FrontendRequest::parse(br#"{"method":"listAdapters"}"#).expect("parse");
        assert_eq!(request.kind().expect("kind"), CommandKind::ListAdapters);
        assert!(request.id.is_none());
    }

    #[test]
    fn keeps_the_correlation_id() {
        let request =
            FrontendRequest::parse(br#"{"method":"scan","id":7}"#).expect("parse with id");
        assert_eq!(request.id, Some(Value::from(7)));
    }

    #[test]
    fn trims_trailing_whitespace() {
        let request = FrontendRequest::parse(b"{\"method\":\"scan\"}  \r\n").expect("parse");
        assert_eq!(request.method, "scan");
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::whitespace(b"   \n".as_slice())]
    #[case::not_json(b"not json".as_slice())]
    #[case::missing_method(br#"{"params":{}}"#.as_slice())]
    fn rejects_malformed_lines(#[case] line: &[u8]) {
        let result = FrontendRequest::parse(line);
        assert!(matches!(result, Err(FrontendError::MalformedJsonl { .. })));
    }

    #[test]
    fn rejects_oversized_lines() {
        let line = vec![b' '; MAX_REQUEST_BYTES + 1];
        let result = FrontendRequest::parse(&line);
        assert!(matches!(
            result,
            Err(FrontendError::RequestTooLarge { max_size: MAX_REQUEST_BYTES, .. })
        ));
    }

    #[test]
    fn rejects_unknown_methods() {
        let request = FrontendRequest::parse(br#"{"method":"reboot"}"#).expect("parse");
        let error = request.into_payload().expect_err("unknown method");
        assert!(matches!(error, FrontendError::UnknownMethod { method } if method == "reboot"));
    }

    #[test]
    fn scan_without_params_uses_default_adapter() {
        let request = FrontendRequest::parse(br#"{"method":"scan","params":null}"#).expect("parse");
        let payload = request.into_payload().expect("payload");
        assert!(matches!(payload, CommandPayload::Scan(scan) if scan.adapter.is_none()));
    }

    #[test]
    fn send_command_params_are_typed() {
        let line = br#"{"method":"sendCommand","params":{"adapter":"cec0","destAddress":"0","timeout":250,"command":{"name":"report-power-status","args":[{"arg":"pwr-state"}]}}}"#;
        let payload = FrontendRequest::parse(line)
            .expect("parse")
            .into_payload()
            .expect("payload");
        let CommandPayload::SendCommand(request) = payload else {
            panic!("expected sendCommand payload, got {payload:?}");
        };
        let expected = SendCommandRequest {
            adapter: Some(String::from("cec0")),
            dest_address: String::from("0"),
            timeout_ms: 250,
            command: CecCommand::new(
                "report-power-status",
                vec![CecCommandArg::named("pwr-state")],
            ),
        };
        assert_eq!(request, expected);
    }

    #[rstest]
    #[case::send_command_without_destination(
        br#"{"method":"sendCommand","params":{"command":{"name":"standby"}}}"#.as_slice(),
        "sendCommand"
    )]
    #[case::get_config_without_key(br#"{"method":"getConfig","params":{}}"#.as_slice(), "getConfig")]
    #[case::set_config_without_value(
        br#"{"method":"setConfig","params":{"key":"osdName"}}"#.as_slice(),
        "setConfig"
    )]
    fn rejects_params_missing_required_fields(#[case] line: &[u8], #[case] expected: &str) {
        let error = FrontendRequest::parse(line)
            .expect("parse")
            .into_payload()
            .expect_err("invalid params");
        assert!(
            matches!(&error, FrontendError::InvalidParams { method, .. } if method == expected),
            "unexpected error: {error}"
        );
    }
}
