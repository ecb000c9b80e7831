//! Request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A client request.
///
/// The `id` is chosen by the client and never interpreted by the daemon; it
/// is echoed verbatim in the matching [`Response`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Opaque correlation id.
    #[serde(default)]
    pub id: Option<String>,
    /// Method name from the catalogue in [`crate::Method`].
    pub method: String,
    /// Named parameters; absent means empty.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Request {
    /// Builds a request.
    #[must_use]
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    /// Decodes a request from a frame payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the payload is not UTF-8 JSON matching the
    /// request schema.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Encodes the request as a frame payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialisation fails.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Error codes carried in error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed frame or JSON.
    ParseError,
    /// The method is not part of the catalogue.
    MethodNotFound,
    /// A parameter is missing or malformed.
    InvalidParams,
    /// The capture provider (or the daemon itself) failed.
    Internal,
}

impl ErrorCode {
    /// Numeric value placed on the wire.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::Internal => -32000,
        }
    }

    /// Maps a wire value back to a known code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -32700 => Some(Self::ParseError),
            -32601 => Some(Self::MethodNotFound),
            -32602 => Some(Self::InvalidParams),
            -32000 => Some(Self::Internal),
            _ => None,
        }
    }
}

/// Error payload of a failed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric error code (see [`ErrorCode`]).
    pub code: i32,
    /// Single-line description.
    pub message: String,
}

/// Either the result or the error of a call; never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Successful call.
    Result(Value),
    /// Failed call.
    Error(ErrorObject),
}

/// A daemon response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Id of the request being answered, or `null` when it was unreadable.
    pub id: Option<String>,
    /// Result or error, flattened into the envelope.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    /// Builds a success response.
    #[must_use]
    pub const fn success(id: Option<String>, result: Value) -> Self {
        Self {
            id,
            outcome: Outcome::Result(result),
        }
    }

    /// Builds an error response.
    #[must_use]
    pub fn error(id: Option<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            id,
            outcome: Outcome::Error(ErrorObject {
                code: code.code(),
                message: message.into(),
            }),
        }
    }

    /// Returns the error payload when the call failed.
    #[must_use]
    pub const fn error_object(&self) -> Option<&ErrorObject> {
        match &self.outcome {
            Outcome::Error(error) => Some(error),
            Outcome::Result(_) => None,
        }
    }

    /// Converts the response into the call outcome.
    ///
    /// # Errors
    ///
    /// Returns the error payload when the call failed.
    pub fn into_result(self) -> Result<Value, ErrorObject> {
        match self.outcome {
            Outcome::Result(value) => Ok(value),
            Outcome::Error(error) => Err(error),
        }
    }

    /// Decodes a response from a frame payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the payload does not match the schema.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Encodes the response as a frame payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialisation fails.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_without_params_decodes_to_empty_map() {
        let request = Request::decode(br#"{"id":"a","method":"ping"}"#).expect("decode");
        assert_eq!(request.id.as_deref(), Some("a"));
        assert_eq!(request.method, "ping");
        assert!(request.params.is_empty());
    }

    #[test]
    fn request_without_method_is_rejected() {
        assert!(Request::decode(br#"{"id":"a","params":{}}"#).is_err());
    }

    #[test]
    fn success_response_has_result_only() {
        let response = Response::success(Some("1".to_owned()), json!({"status": "ok"}));
        let value: Value = serde_json::from_slice(&response.encode().expect("encode"))
            .expect("json");
        assert_eq!(value, json!({"id": "1", "result": {"status": "ok"}}));
    }

    #[test]
    fn error_response_without_id_serialises_null() {
        let response = Response::error(None, ErrorCode::ParseError, "Parse error: eof");
        let value: Value = serde_json::from_slice(&response.encode().expect("encode"))
            .expect("json");
        assert_eq!(
            value,
            json!({"id": null, "error": {"code": -32700, "message": "Parse error: eof"}})
        );
    }

    #[test]
    fn responses_decode_both_shapes() {
        let ok = Response::decode(br#"{"id":"1","result":null}"#).expect("ok");
        assert_eq!(ok.into_result().expect("result"), Value::Null);

        let failed =
            Response::decode(br#"{"id":"2","error":{"code":-32602,"message":"bad"}}"#)
                .expect("error");
        let error = failed.into_result().expect_err("error outcome");
        assert_eq!(ErrorCode::from_code(error.code), Some(ErrorCode::InvalidParams));
    }

    #[test]
    fn codes_round_trip() {
        for code in [
            ErrorCode::ParseError,
            ErrorCode::MethodNotFound,
            ErrorCode::InvalidParams,
            ErrorCode::Internal,
        ] {
            assert_eq!(ErrorCode::from_code(code.code()), Some(code));
        }
        assert_eq!(ErrorCode::from_code(1), None);
    }
}
