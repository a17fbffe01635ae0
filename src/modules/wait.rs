//! Bounded condition polling.
//!
//! Every wait in the crate goes through [`wait_until`]: evaluate a
//! predicate over and over until it reports true or the timeout elapses.
//! The predicate owns its own pacing (typically a short humanized pause
//! before each measurement), so there is no backoff or jitter here.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Polls `predicate` until it returns true or `timeout` elapses.
///
/// Returns true iff the predicate returned true before the timeout. The
/// predicate is never evaluated again after its first true result. A wait
/// cannot be cancelled once started: the side effects it polls for are
/// not safely interruptible, so timeout is the only way out.
pub fn wait_until<F>(mut predicate: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let started = Instant::now();
    loop {
        if predicate() {
            return true;
        }
        if started.elapsed() >= timeout {
            return false;
        }
    }
}

/// Picks a duration uniformly inside `range` (both bounds in ms, inclusive).
pub fn roll_duration(rng: &mut impl Rng, range: (u64, u64)) -> Duration {
    let (lo, hi) = range;
    let ms = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
    Duration::from_millis(ms)
}

/// Timeout ranges for every bounded wait, in milliseconds.
///
/// Each wait rolls a fresh value inside its range so no two runs pace
/// identically. Defaults are the production values; tests shrink them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Waiting for a selected node to come on-screen while approaching.
    pub on_screen_ms: (u64, u64),
    /// Waiting for the agent's activity indicator after triggering.
    pub active_ms: (u64, u64),
    /// Waiting for the worked node to deplete.
    pub depletion_ms: (u64, u64),
    /// Waiting to arrive inside the work area after navigating.
    pub walk_ms: (u64, u64),
    /// Waiting for the inventory to drain after a bulk deposit.
    pub deposit_ms: (u64, u64),
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            on_screen_ms: (11_000, 12_000),
            active_ms: (5_000, 6_000),
            depletion_ms: (35_000, 40_000),
            walk_ms: (10_000, 12_000),
            deposit_ms: (2_000, 3_000),
        }
    }
}
