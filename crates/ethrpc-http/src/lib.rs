//! ethrpc-http — JSON-RPC 2.0 over HTTP.
//!
//! - [`Dispatcher`] builds envelopes, decides single vs batch and normalizes errors
//! - [`ReqwestTransport`] is the default HTTP POST primitive
//! - [`HttpProvider`] is the EIP-1193 style entry point, optionally throttled

pub mod client;
pub mod dispatcher;
pub mod provider;

pub use client::{HttpClientConfig, ReqwestTransport};
pub use dispatcher::{BatchOrdering, Dispatcher, DispatcherConfig};
pub use provider::{HttpProvider, ProviderOptions};
