// crates/device-assertion-core/src/runtime/clock.rs
// ============================================================================
// Module: Clocks
// Description: System and fixed clock implementations.
// Purpose: Supply token timestamps from the host or from tests.
// Dependencies: crate::interfaces
// ============================================================================

//! Clock implementations for token timestamps.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::interfaces::Clock;

/// Clock backed by the host wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_seconds(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
    }
}

/// Clock returning a caller-controlled time.
#[derive(Debug, Default)]
pub struct FixedClock {
    /// Current time in unix seconds.
    now: AtomicU64,
}

impl FixedClock {
    /// Creates a clock pinned to `now` (unix seconds).
    #[must_use]
    pub const fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Advances the clock by `secs`.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_unix_seconds(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
