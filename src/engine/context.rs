//! Invocation Context
//!
//! Per-invocation bookkeeping for log output. Never handed to stages.

use std::time::Instant;

use uuid::Uuid;

/// Identity and timing of a single invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Invocation ID for log correlation
    pub id: Uuid,

    /// Start time for duration tracking
    started_at: Instant,
}

impl Invocation {
    /// Start a new invocation
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Instant::now(),
        }
    }

    /// Milliseconds since the invocation started
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

impl Default for Invocation {
    fn default() -> Self {
        Self::new()
    }
}
