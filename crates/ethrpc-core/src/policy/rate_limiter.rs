//! Start-slot rate limiter.
//!
//! Hands out call-start slots spaced `1 / requests_per_second` apart. Waiters
//! queue on a fair async mutex, so slots are granted in arrival order. With
//! slots spaced that way, no one-second window ever holds more than
//! `requests_per_second` starts.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{self, Instant};

use crate::error::RpcError;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Call starts admitted per second. Must be finite and positive.
    pub requests_per_second: f64,
}

impl RateLimiterConfig {
    pub fn new(requests_per_second: f64) -> Self {
        Self { requests_per_second }
    }

    /// Spacing between two consecutive slots, rounded up to the nanosecond so
    /// that `requests_per_second` intervals never add up to less than a second.
    pub fn interval(&self) -> Duration {
        Duration::from_nanos((1e9 / self.requests_per_second).ceil() as u64)
    }

    fn validate(&self) -> Result<(), RpcError> {
        let rps = self.requests_per_second;
        if rps.is_finite() && rps > 0.0 {
            Ok(())
        } else {
            Err(RpcError::InvalidInput {
                message: format!("requests_per_second must be a positive number, got {rps}"),
            })
        }
    }
}

/// FIFO slot scheduler.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Result<Self, RpcError> {
        config.validate()?;
        Ok(Self {
            interval: config.interval(),
            next_slot: Mutex::new(None),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next free slot.
    ///
    /// Dropping the returned future while queued gives up the place in line
    /// without consuming a slot.
    pub async fn acquire(&self) {
        let mut next = self.next_slot.lock().await;
        if let Some(at) = *next {
            let now = Instant::now();
            if at > now {
                tracing::debug!(
                    wait_ms = (at - now).as_millis() as u64,
                    "rate limited, waiting for slot"
                );
                time::sleep_until(at).await;
            }
        }
        *next = Some(Instant::now() + self.interval);
    }

    /// Time until the next slot opens, ignoring queued waiters.
    pub async fn wait_time(&self) -> Duration {
        match *self.next_slot.lock().await {
            Some(at) => at.saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }
}
