//! Explicit state machine for a store pass, plus the politeness delay policy.
//!
//! The phases replace the implicit sequencing-by-sleep the pipeline would
//! otherwise accumulate: every transition is logged with the store, so an
//! operator can see exactly where a pass stalled or died.

use std::time::Duration;

use rand::Rng;
use snizenja_core::Store;

/// Phase of a list pass. Transitions are strictly forward except that any
/// phase may move to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassPhase {
    Paginating,
    Extracting,
    Filtering,
    Persisting,
    Done,
    Failed,
}

impl PassPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PassPhase::Paginating => "paginating",
            PassPhase::Extracting => "extracting",
            PassPhase::Filtering => "filtering",
            PassPhase::Persisting => "persisting",
            PassPhase::Done => "done",
            PassPhase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PassPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks and logs the current phase of one store's pass.
#[derive(Debug)]
pub struct PassTracker {
    store: Store,
    phase: PassPhase,
}

impl PassTracker {
    /// Starts a tracker in the given phase without logging a transition.
    #[must_use]
    pub fn at(store: Store, phase: PassPhase) -> Self {
        Self { store, phase }
    }

    /// Starts a fresh list-pass tracker in `Paginating`.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self::at(store, PassPhase::Paginating)
    }

    #[must_use]
    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// Moves to `phase`, logging the transition. Re-entering the current
    /// phase is a no-op so page loops can call this unconditionally.
    pub fn enter(&mut self, phase: PassPhase) {
        if self.phase == phase {
            return;
        }
        tracing::debug!(
            store = %self.store,
            from = %self.phase,
            to = %phase,
            "pass transition"
        );
        self.phase = phase;
    }
}

/// Randomized delay bounds between requests to the same site.
///
/// An anti-detection/politeness control, not a correctness requirement;
/// tests run with [`DelayPolicy::NONE`].
#[derive(Debug, Clone, Copy)]
pub struct DelayPolicy {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayPolicy {
    pub const NONE: DelayPolicy = DelayPolicy {
        min_ms: 0,
        max_ms: 0,
    };

    #[must_use]
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms,
        }
    }

    /// Sleeps for a uniformly random duration within the bounds.
    pub async fn pause(&self) {
        if self.max_ms == 0 {
            return;
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
