//! `HttpProvider`: the EIP-1193 style facade over a gateway and dispatcher.
//!
//! # Usage
//! ```rust,no_run
//! use ethrpc_http::{HttpProvider, ProviderOptions};
//!
//! # async fn run() -> Result<(), ethrpc_core::RpcError> {
//! let provider = HttpProvider::new(
//!     "https://rpc.example.com",
//!     ProviderOptions {
//!         requests_per_second: Some(10.0),
//!         ..Default::default()
//!     },
//! )?;
//! let block: String = provider.call("eth_blockNumber", vec![]).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ethrpc_core::call::{CallDescriptor, RequestArguments, RpcCall, RpcOutput};
use ethrpc_core::error::RpcError;
use ethrpc_core::gateway::{gateway_for, CallGateway};
use ethrpc_core::id::{IdGenerator, SequentialIds};
use ethrpc_core::transport::HttpTransport;

use crate::client::{HttpClientConfig, ReqwestTransport};
use crate::dispatcher::{BatchOrdering, Dispatcher, DispatcherConfig};

/// Provider construction options.
///
/// Deserializes from camelCase JSON, e.g. `{"requestsPerSecond": 5}`; every
/// field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderOptions {
    /// Call starts per second; `None` disables throttling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<f64>,
    pub request_timeout_ms: u64,
    pub batch_ordering: BatchOrdering,
    /// Extra headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            requests_per_second: None,
            request_timeout_ms: 30_000,
            batch_ordering: BatchOrdering::default(),
            headers: BTreeMap::new(),
        }
    }
}

impl ProviderOptions {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            batch_ordering: self.batch_ordering,
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// JSON-RPC provider for one HTTP endpoint.
pub struct HttpProvider {
    gateway: Box<dyn CallGateway>,
}

impl HttpProvider {
    /// Provider over a `reqwest` transport and the process-wide id counter.
    pub fn new(endpoint: impl Into<String>, options: ProviderOptions) -> Result<Self, RpcError> {
        let endpoint = endpoint.into();
        let transport = ReqwestTransport::new(HttpClientConfig {
            request_timeout: options.request_timeout(),
        })
        .map_err(|cause| RpcError::Transport {
            message: format!("failed to build HTTP client for {endpoint}"),
            cause,
        })?;
        Self::with_parts(endpoint, &options, Arc::new(transport), SequentialIds::global())
    }

    /// Provider over an injected transport and id generator.
    ///
    /// `options.request_timeout_ms` is left to the transport.
    pub fn with_parts(
        endpoint: impl Into<String>,
        options: &ProviderOptions,
        transport: Arc<dyn HttpTransport>,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Self, RpcError> {
        let dispatcher = Arc::new(Dispatcher::new(transport, ids, options.dispatcher_config()));
        let gateway = gateway_for(endpoint, dispatcher, options.requests_per_second)?;
        Ok(Self::from_gateway(gateway))
    }

    pub fn from_gateway(gateway: Box<dyn CallGateway>) -> Self {
        Self { gateway }
    }

    pub fn endpoint(&self) -> &str {
        self.gateway.endpoint()
    }

    /// Batches can be sent through [`request`](Self::request) with `eth_batch`.
    pub fn supports_eth_batch(&self) -> bool {
        true
    }

    pub fn is_rate_limited(&self) -> bool {
        self.gateway.is_rate_limited()
    }

    /// EIP-1193 `request({method, params})`.
    ///
    /// `eth_batch` with an array of `{method, params}` objects is sent as one
    /// batch and resolves to the array of results.
    pub async fn request(&self, args: RequestArguments) -> Result<Value, RpcError> {
        let call = RpcCall::try_from(args)?;
        self.send(call).await.map(RpcOutput::into_value)
    }

    pub async fn send(&self, call: RpcCall) -> Result<RpcOutput, RpcError> {
        self.gateway.request(call).await
    }

    /// Call `method` and deserialize the result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let call = RpcCall::Single(CallDescriptor::with_params(method, params));
        let result = self.send(call).await?.into_value();
        serde_json::from_value(result).map_err(|cause| RpcError::Protocol {
            message: format!("failed to decode result of {method}"),
            cause,
        })
    }

    /// Send `calls` as one HTTP batch.
    pub async fn batch(&self, calls: Vec<CallDescriptor>) -> Result<Vec<Value>, RpcError> {
        match self.send(RpcCall::Batch(calls)).await? {
            RpcOutput::Batch(values) => Ok(values),
            RpcOutput::Single(_) => Err(RpcError::Correlation {
                message: format!("batch call to {} resolved with a single result", self.endpoint()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ethrpc_core::error::ErrorKind;
    use serde_json::json;

    /// Answers every call, batch or not, with one bare value.
    struct SingleOnlyGateway;

    #[async_trait]
    impl CallGateway for SingleOnlyGateway {
        async fn request(&self, _call: RpcCall) -> Result<RpcOutput, RpcError> {
            Ok(RpcOutput::Single(json!("0x1")))
        }

        fn endpoint(&self) -> &str {
            "http://node.test"
        }
    }

    #[tokio::test]
    async fn batch_rejects_single_output() {
        let provider = HttpProvider::from_gateway(Box::new(SingleOnlyGateway));
        let err = provider
            .batch(vec![CallDescriptor::new("eth_chainId")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProtocolFailure);
        assert!(err.to_string().contains("single result"));
    }

    #[test]
    fn options_from_camel_case_json() {
        let opts: ProviderOptions = serde_json::from_value(json!({
            "requestsPerSecond": 5,
            "batchOrdering": "byId",
            "headers": {"Authorization": "Bearer t"}
        }))
        .unwrap();
        assert_eq!(opts.requests_per_second, Some(5.0));
        assert_eq!(opts.batch_ordering, BatchOrdering::ById);
        assert_eq!(opts.request_timeout(), Duration::from_secs(30));
        assert_eq!(opts.headers.get("Authorization").map(String::as_str), Some("Bearer t"));
    }

    #[test]
    fn empty_options_disable_throttling() {
        let opts: ProviderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, ProviderOptions::default());
        let provider = HttpProvider::new("http://node.test", opts).unwrap();
        assert!(!provider.is_rate_limited());
        assert!(provider.supports_eth_batch());
        assert_eq!(provider.endpoint(), "http://node.test");
    }

    #[test]
    fn non_positive_rate_rejected() {
        let opts = ProviderOptions {
            requests_per_second: Some(-2.0),
            ..Default::default()
        };
        let err = HttpProvider::new("http://node.test", opts).err().unwrap();
        assert!(matches!(err, RpcError::InvalidInput { .. }));
    }
}
