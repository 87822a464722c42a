//! Retry pacing for contended CAS loops.
//!
//! Retries are never capped: an operation always runs to completion. The
//! policy only decides how long a thread waits before its next attempt.

use std::hint;
use std::thread;

pub trait Backoff: Default + Send + Sync {
    /// Called before retry number `attempt` (starting at 1) of one loop.
    fn wait(&self, attempt: u32);
}

/// Retry immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spin;

impl Backoff for Spin {
    #[inline]
    fn wait(&self, _attempt: u32) {
        hint::spin_loop();
    }
}

/// Spin `2^attempt` times up to `2^spin_limit`, then yield the time slice.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    spin_limit: u32,
}

impl ExponentialBackoff {
    pub fn new(spin_limit: u32) -> Self {
        ExponentialBackoff {
            spin_limit: spin_limit.min(16),
        }
    }

    pub fn spin_limit(&self) -> u32 {
        self.spin_limit
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(6)
    }
}

impl Backoff for ExponentialBackoff {
    fn wait(&self, attempt: u32) {
        if attempt <= self.spin_limit {
            for _ in 0..(1u32 << attempt) {
                hint::spin_loop();
            }
        } else {
            thread::yield_now();
        }
    }
}
