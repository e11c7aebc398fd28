//! Request id generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Source of JSON-RPC request ids.
///
/// Every envelope a dispatcher builds takes exactly one id; ids must never
/// repeat for the lifetime of the generator.
pub trait IdGenerator: Send + Sync + 'static {
    fn next_id(&self) -> u64;
}

/// Monotonic counter: the first id issued is `1`, then `2`, `3`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start so that the next issued id is `last + 1`.
    pub fn starting_after(last: u64) -> Self {
        Self {
            counter: AtomicU64::new(last),
        }
    }

    /// The process-wide generator shared by every dispatcher built with defaults.
    pub fn global() -> Arc<SequentialIds> {
        static GLOBAL: OnceLock<Arc<SequentialIds>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(SequentialIds::new())).clone()
    }

    /// The last id handed out (`0` if none yet).
    pub fn last(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}
