//! The two seams of the adapter: the HTTP POST primitive underneath the
//! dispatcher, and the dispatch signature the gateways wrap.

use async_trait::async_trait;

use crate::call::{RpcCall, RpcOutput};
use crate::error::{HttpError, RpcError};

/// A fully-built HTTP POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Status and raw body of an HTTP answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The HTTP POST primitive.
///
/// Implementations report only failures to obtain a response; any status
/// code, including errors, comes back as `Ok`.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn HttpTransport>`.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn post(&self, req: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Anything that can carry a call to a JSON-RPC endpoint.
#[async_trait]
pub trait RpcDispatch: Send + Sync + 'static {
    async fn dispatch(&self, endpoint: &str, call: RpcCall) -> Result<RpcOutput, RpcError>;
}
