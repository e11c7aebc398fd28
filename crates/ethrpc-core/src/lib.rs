//! ethrpc-core — foundation traits and types for ethrpc.
//!
//! # Overview
//!
//! ethrpc is a JSON-RPC 2.0 over HTTP adapter for blockchain nodes with a
//! single entry point for single and batched calls. The core crate defines:
//!
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] — wire types
//! - [`RpcCall`] / [`RpcOutput`] — the caller-facing call model
//! - [`RpcError`] — the normalized error taxonomy
//! - [`IdGenerator`] — request id source
//! - [`HttpTransport`] / [`RpcDispatch`] — the seams around the dispatcher
//! - [`gateway`] module — direct and rate-limited call gateways
//! - [`policy`] module — the start-slot rate limiter

pub mod call;
pub mod error;
pub mod gateway;
pub mod id;
pub mod policy;
pub mod request;
pub mod transport;

pub use call::{CallDescriptor, RequestArguments, RpcCall, RpcOutput, BATCH_METHOD};
pub use error::{BoxError, ErrorKind, HttpError, RpcError};
pub use gateway::{gateway_for, CallGateway, DirectGateway, RateLimitedGateway};
pub use id::{IdGenerator, SequentialIds};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam, NO_RESULT_CODE};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, RpcDispatch};
