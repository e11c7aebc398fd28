//! Caller-facing call model: descriptors, single/batch calls and their outputs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;
use crate::request::{JsonRpcRequest, RpcParam};

/// Method name that routes an EIP-1193 request to the batch path.
pub const BATCH_METHOD: &str = "eth_batch";

/// One logical JSON-RPC call: a method and optional positional params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDescriptor {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<RpcParam>>,
}

impl CallDescriptor {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    pub fn with_params(method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            method: method.into(),
            params: Some(params),
        }
    }

    /// Build the wire envelope for this call under `id`; missing params become `[]`.
    pub fn to_request(&self, id: u64) -> JsonRpcRequest {
        JsonRpcRequest::new(id, self.method.clone(), self.params.clone().unwrap_or_default())
    }
}

/// A call as handed to a dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcCall {
    Single(CallDescriptor),
    Batch(Vec<CallDescriptor>),
}

impl RpcCall {
    /// Short label for logs: the method name, or `batch(n)`.
    pub fn label(&self) -> String {
        match self {
            Self::Single(call) => call.method.clone(),
            Self::Batch(calls) => format!("batch({})", calls.len()),
        }
    }
}

impl From<CallDescriptor> for RpcCall {
    fn from(call: CallDescriptor) -> Self {
        Self::Single(call)
    }
}

impl From<Vec<CallDescriptor>> for RpcCall {
    fn from(calls: Vec<CallDescriptor>) -> Self {
        Self::Batch(calls)
    }
}

/// EIP-1193 `request` arguments: `{method, params?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestArguments {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestArguments {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

impl TryFrom<RequestArguments> for RpcCall {
    type Error = RpcError;

    /// `eth_batch` with an array of descriptors becomes [`RpcCall::Batch`];
    /// everything else is a single call whose params must be an array or absent.
    fn try_from(args: RequestArguments) -> Result<Self, Self::Error> {
        let params = args.params.filter(|p| !p.is_null());
        if args.method == BATCH_METHOD {
            let calls = match params {
                None => Vec::new(),
                Some(value) => serde_json::from_value::<Vec<CallDescriptor>>(value).map_err(|e| {
                    RpcError::InvalidInput {
                        message: format!("{BATCH_METHOD} params must be an array of {{method, params}}: {e}"),
                    }
                })?,
            };
            return Ok(Self::Batch(calls));
        }
        let params = match params {
            None => None,
            Some(Value::Array(items)) => Some(items),
            Some(other) => {
                return Err(RpcError::InvalidInput {
                    message: format!(
                        "params for {} must be an array, got {}",
                        args.method,
                        json_type(&other)
                    ),
                })
            }
        };
        Ok(Self::Single(CallDescriptor {
            method: args.method,
            params,
        }))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// What a dispatcher resolves with: the bare result, or the ordered batch results.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutput {
    Single(Value),
    Batch(Vec<Value>),
}

impl RpcOutput {
    /// Flatten into a JSON value; batch results become an array.
    pub fn into_value(self) -> Value {
        match self {
            Self::Single(v) => v,
            Self::Batch(vs) => Value::Array(vs),
        }
    }
}
