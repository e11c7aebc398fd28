//! JSON-RPC request dispatcher.
//!
//! Builds envelopes, performs the HTTP exchange and normalizes every outcome
//! into either the bare result(s) or an [`RpcError`]:
//!
//! - transport error or status ≠ 200 → [`RpcError::Transport`]
//! - body is not valid JSON for the expected shape → [`RpcError::Protocol`]
//! - truthy `error` of any shape, or no usable result → [`RpcError::Application`]
//! - any failed batch item → [`RpcError::Aggregate`] with the whole batch

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ethrpc_core::call::{CallDescriptor, RpcCall, RpcOutput};
use ethrpc_core::error::{HttpError, RpcError};
use ethrpc_core::id::{IdGenerator, SequentialIds};
use ethrpc_core::request::{JsonRpcRequest, JsonRpcResponse, RpcId};
use ethrpc_core::transport::{HttpRequest, HttpTransport, RpcDispatch};

/// How batch results are lined up with the calls that produced them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchOrdering {
    /// Trust the server: results come back in response order.
    #[default]
    Positional,
    /// Match each response to its request by id and return results in request order.
    ById,
}

/// Configuration for [`Dispatcher`].
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    pub batch_ordering: BatchOrdering,
    /// Sent with every POST, after `Content-Type`.
    pub headers: Vec<(String, String)>,
}

pub struct Dispatcher {
    transport: Arc<dyn HttpTransport>,
    ids: Arc<dyn IdGenerator>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        ids: Arc<dyn IdGenerator>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            transport,
            ids,
            config,
        }
    }

    /// Dispatcher on the process-wide id counter with default configuration.
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(transport, SequentialIds::global(), DispatcherConfig::default())
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    async fn post_json(&self, endpoint: &str, body: Vec<u8>) -> Result<Vec<u8>, HttpError> {
        let mut headers = Vec::with_capacity(self.config.headers.len() + 1);
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
        headers.extend(self.config.headers.iter().cloned());

        let resp = self
            .transport
            .post(HttpRequest {
                url: endpoint.to_string(),
                headers,
                body,
            })
            .await?;

        if resp.status != 200 {
            return Err(HttpError::Status(resp.status));
        }
        Ok(resp.body)
    }

    async fn send_single(&self, endpoint: &str, call: CallDescriptor) -> Result<Value, RpcError> {
        let method = call.method.as_str();
        let req = call.to_request(self.ids.next_id());
        tracing::debug!(id = %req.id, method, endpoint, "sending request");

        let body = encode(&req)?;
        let body = self.post_json(endpoint, body).await.map_err(|cause| {
            tracing::warn!(error = %cause, method, endpoint, "request failed");
            let message = match cause.status() {
                Some(status) => {
                    format!("failed to fetch (status = {status}) at {endpoint} (method: {method})")
                }
                None => format!("failed to fetch at {endpoint} (method: {method})"),
            };
            RpcError::Transport { message, cause }
        })?;

        let resp: JsonRpcResponse =
            serde_json::from_slice(&body).map_err(|cause| RpcError::Protocol {
                message: format!("failed to parse response json from {endpoint} (method: {method})"),
                cause,
            })?;

        resp.into_result().map_err(|payload| {
            tracing::debug!(code = payload.code, method, endpoint, "node returned an error");
            RpcError::Application {
                message: format!("{payload} (method: {method})"),
                payload,
            }
        })
    }

    async fn send_batch(
        &self,
        endpoint: &str,
        calls: Vec<CallDescriptor>,
    ) -> Result<Vec<Value>, RpcError> {
        if calls.is_empty() {
            return Ok(vec![]);
        }

        let reqs: Vec<JsonRpcRequest> = calls
            .iter()
            .map(|call| call.to_request(self.ids.next_id()))
            .collect();
        let count = reqs.len();
        tracing::debug!(count, endpoint, "sending batch");

        let body = encode(&reqs)?;
        let body = self.post_json(endpoint, body).await.map_err(|cause| {
            tracing::warn!(error = %cause, count, endpoint, "batch request failed");
            let message = match cause.status() {
                Some(status) => {
                    format!("failed to batch fetch (status = {status}) at {endpoint} ({count} calls)")
                }
                None => format!("failed to batch fetch at {endpoint} ({count} calls)"),
            };
            RpcError::Transport { message, cause }
        })?;

        let responses: Vec<JsonRpcResponse> =
            serde_json::from_slice(&body).map_err(|cause| RpcError::Protocol {
                message: format!("failed to parse batch response json from {endpoint}"),
                cause,
            })?;

        if responses.iter().any(|r| !r.is_ok()) {
            tracing::debug!(count, endpoint, "batch contains failed items");
            return Err(RpcError::Aggregate { responses });
        }

        let responses = match self.config.batch_ordering {
            BatchOrdering::Positional => responses,
            BatchOrdering::ById => {
                if responses.len() != count {
                    return Err(RpcError::Correlation {
                        message: format!(
                            "batch response from {endpoint} has {} items, expected {count}",
                            responses.len()
                        ),
                    });
                }
                align_by_id(endpoint, &reqs, responses)?
            }
        };

        Ok(responses
            .into_iter()
            .map(|r| r.result.unwrap_or(Value::Null))
            .collect())
    }
}

#[async_trait]
impl RpcDispatch for Dispatcher {
    async fn dispatch(&self, endpoint: &str, call: RpcCall) -> Result<RpcOutput, RpcError> {
        match call {
            RpcCall::Single(call) => self.send_single(endpoint, call).await.map(RpcOutput::Single),
            RpcCall::Batch(calls) => self.send_batch(endpoint, calls).await.map(RpcOutput::Batch),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, RpcError> {
    serde_json::to_vec(value).map_err(|cause| RpcError::Protocol {
        message: "failed to encode request json".into(),
        cause,
    })
}

/// Reorder `responses` to follow `reqs`, matching on id.
fn align_by_id(
    endpoint: &str,
    reqs: &[JsonRpcRequest],
    responses: Vec<JsonRpcResponse>,
) -> Result<Vec<JsonRpcResponse>, RpcError> {
    let mut by_id: HashMap<RpcId, JsonRpcResponse> = HashMap::with_capacity(responses.len());
    for resp in responses {
        let id = resp.id.clone();
        if !reqs.iter().any(|r| r.id == id) {
            return Err(RpcError::Correlation {
                message: format!("batch response from {endpoint} has unexpected id {id}"),
            });
        }
        if by_id.insert(id.clone(), resp).is_some() {
            return Err(RpcError::Correlation {
                message: format!("batch response from {endpoint} repeats id {id}"),
            });
        }
    }

    reqs.iter()
        .map(|req| {
            by_id.remove(&req.id).ok_or_else(|| RpcError::Correlation {
                message: format!("batch response from {endpoint} is missing id {}", req.id),
            })
        })
        .collect()
}
