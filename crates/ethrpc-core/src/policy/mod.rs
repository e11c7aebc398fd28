//! Call admission policies.
//!
//! ```text
//! Call → [RateLimiter] → Dispatcher → Transport
//! ```

pub mod rate_limiter;

pub use rate_limiter::{RateLimiter, RateLimiterConfig};
