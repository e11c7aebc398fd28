//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code attached to a response that carried neither a result nor an error.
pub const NO_RESULT_CODE: i64 = 5000;

/// JSON-RPC request ID — string, number, or null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    #[default]
    Null,
}

impl RpcId {
    pub fn number(n: u64) -> Self {
        Self::Number(n)
    }

    /// The numeric value, if this id is a number.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A single JSON-RPC parameter value.
pub type RpcParam = Value;

/// A JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub id: RpcId,
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<RpcParam>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            id: RpcId::Number(id),
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Interpret whatever a node put in the `error` member.
    ///
    /// A `{code, message, data}` object decodes as-is. Any other value is kept
    /// whole in `data`, with a string value doubling as the message.
    pub fn from_value(raw: Value) -> Self {
        if raw.is_object() {
            if let Ok(err) = serde_json::from_value::<Self>(raw.clone()) {
                return err;
            }
        }
        let message = match &raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            code: 0,
            message,
            data: Some(raw),
        }
    }

    /// The synthetic error used when a response has no usable result.
    pub fn no_result() -> Self {
        Self {
            code: NO_RESULT_CODE,
            message: "No Result".into(),
            data: None,
        }
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// A JSON-RPC 2.0 response envelope.
///
/// Decoding is lenient: `jsonrpc` and `id` may be missing, a response
/// carrying neither `result` nor `error` still decodes, and `error` is kept
/// as raw JSON whatever its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: RpcId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl JsonRpcResponse {
    /// Returns `true` if the response carries a usable result.
    ///
    /// `null`, `false`, `0` and `""` do not count as a result.
    pub fn has_result(&self) -> bool {
        self.result.as_ref().is_some_and(is_truthy)
    }

    /// The error payload, if `error` holds a truthy value.
    pub fn error_payload(&self) -> Option<JsonRpcError> {
        self.error
            .as_ref()
            .filter(|e| is_truthy(e))
            .map(|e| JsonRpcError::from_value(e.clone()))
    }

    /// Returns `true` if this is a successful response (usable result, no error).
    pub fn is_ok(&self) -> bool {
        !self.error.as_ref().is_some_and(is_truthy) && self.has_result()
    }

    /// Unwrap the result value or return the error payload.
    ///
    /// A response without a usable result yields [`JsonRpcError::no_result`].
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        if let Some(err) = self.error.filter(is_truthy) {
            return Err(JsonRpcError::from_value(err));
        }
        match self.result {
            Some(v) if is_truthy(&v) => Ok(v),
            _ => Err(JsonRpcError::no_result()),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
