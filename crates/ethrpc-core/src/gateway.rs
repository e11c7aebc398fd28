//! Call gateways sit between a provider and its dispatcher.
//!
//! A gateway binds an endpoint to a dispatcher and decides *when* a call
//! starts, never *what* it does: arguments, result and error pass through
//! untouched.

use std::sync::Arc;

use async_trait::async_trait;

use crate::call::{RpcCall, RpcOutput};
use crate::error::RpcError;
use crate::policy::{RateLimiter, RateLimiterConfig};
use crate::transport::RpcDispatch;

#[async_trait]
pub trait CallGateway: Send + Sync + 'static {
    /// Send `call` to the bound endpoint.
    async fn request(&self, call: RpcCall) -> Result<RpcOutput, RpcError>;

    /// The endpoint every call is sent to.
    fn endpoint(&self) -> &str;

    /// Returns `true` if calls are admitted through a rate limiter.
    fn is_rate_limited(&self) -> bool {
        false
    }
}

/// Forwards every call straight to the dispatcher.
pub struct DirectGateway {
    endpoint: String,
    dispatcher: Arc<dyn RpcDispatch>,
}

impl DirectGateway {
    pub fn new(endpoint: impl Into<String>, dispatcher: Arc<dyn RpcDispatch>) -> Self {
        Self {
            endpoint: endpoint.into(),
            dispatcher,
        }
    }
}

#[async_trait]
impl CallGateway for DirectGateway {
    async fn request(&self, call: RpcCall) -> Result<RpcOutput, RpcError> {
        self.dispatcher.dispatch(&self.endpoint, call).await
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Admits each call through a [`RateLimiter`] before dispatching it.
pub struct RateLimitedGateway {
    endpoint: String,
    dispatcher: Arc<dyn RpcDispatch>,
    limiter: RateLimiter,
}

impl RateLimitedGateway {
    pub fn new(
        endpoint: impl Into<String>,
        dispatcher: Arc<dyn RpcDispatch>,
        config: RateLimiterConfig,
    ) -> Result<Self, RpcError> {
        Ok(Self {
            endpoint: endpoint.into(),
            dispatcher,
            limiter: RateLimiter::new(config)?,
        })
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

#[async_trait]
impl CallGateway for RateLimitedGateway {
    async fn request(&self, call: RpcCall) -> Result<RpcOutput, RpcError> {
        self.limiter.acquire().await;
        self.dispatcher.dispatch(&self.endpoint, call).await
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn is_rate_limited(&self) -> bool {
        true
    }
}

/// Pick the gateway for an optional rate: `None` dispatches directly.
pub fn gateway_for(
    endpoint: impl Into<String>,
    dispatcher: Arc<dyn RpcDispatch>,
    requests_per_second: Option<f64>,
) -> Result<Box<dyn CallGateway>, RpcError> {
    match requests_per_second {
        None => Ok(Box::new(DirectGateway::new(endpoint, dispatcher))),
        Some(rps) => Ok(Box::new(RateLimitedGateway::new(
            endpoint,
            dispatcher,
            RateLimiterConfig::new(rps),
        )?)),
    }
}
