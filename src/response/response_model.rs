use serde::Deserialize;
use serde_json::{Map, Value};

/// Response body returned by `/process`.
///
/// Only `error` and `result` are recognized; anything else is ignored.
/// A JSON `null` in either field is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
}

impl SubmissionResponse {
    /// The failure message carried by `error`, if it is set to anything truthy.
    ///
    /// Empty strings, `false` and `0` count as unset.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }

    pub fn into_payload(self) -> Option<ResultPayload> {
        self.result.map(ResultPayload::from_value)
    }
}

/// Parse a response body.
///
/// A body that is valid JSON but not an object has neither field.
pub fn parse_response(body: &str) -> Result<SubmissionResponse, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    if value.is_object() {
        serde_json::from_value(value)
    } else {
        Ok(SubmissionResponse::default())
    }
}

/// Shape of a `result` value, one renderer per variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultPayload {
    Text(String),
    Sequence(Vec<Value>),
    Structured(Map<String, Value>),
    Scalar(Value),
}

impl ResultPayload {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => ResultPayload::Text(s),
            Value::Array(items) => ResultPayload::Sequence(items),
            Value::Object(map) => ResultPayload::Structured(map),
            scalar => ResultPayload::Scalar(scalar),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResultPayload::Text(_) => "text",
            ResultPayload::Sequence(_) => "sequence",
            ResultPayload::Structured(_) => "structured",
            ResultPayload::Scalar(_) => "scalar",
        }
    }
}
