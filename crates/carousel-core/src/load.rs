//! Bulk load of a freshly built window.
//!
//! A build counts the slots whose size is still being measured and resolves once they all
//! report, when the deadline passes, or when it is cancelled. The result cell is written at
//! most once; whoever resolves first wins and every later attempt is a no-op.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Every slot measured and positioned
    Loaded,
    /// The deadline passed with measurements outstanding
    TimedOut,
    /// Cancelled by the host or by a failed build
    Cancelled,
    /// A newer build replaced this one
    Superseded,
}

impl LoadOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

#[derive(Debug)]
struct LoadState {
    generation: u64,
    outcome: OnceLock<LoadOutcome>,
    notify: Notify,
}

impl LoadState {
    /// Try to resolve; returns the outcome that actually won.
    fn resolve(&self, outcome: LoadOutcome) -> LoadOutcome {
        match self.outcome.set(outcome) {
            Ok(()) => {
                self.notify.notify_one();
                outcome
            }
            Err(_) => self.outcome.get().copied().unwrap_or(outcome),
        }
    }
}

/// Awaitable handle to one build's outcome.
#[derive(Debug)]
pub struct PendingLoad {
    state: Arc<LoadState>,
    deadline: tokio::time::Instant,
}

impl PendingLoad {
    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    /// Outcome if already resolved
    pub fn outcome(&self) -> Option<LoadOutcome> {
        self.state.outcome.get().copied()
    }

    /// Cancel the build. No-op if it already resolved.
    pub fn cancel(&self) -> LoadOutcome {
        self.state.resolve(LoadOutcome::Cancelled)
    }

    /// Wait for the build to resolve, or time it out at its deadline.
    pub async fn wait(self) -> LoadOutcome {
        if let Some(outcome) = self.outcome() {
            return outcome;
        }

        tokio::select! {
            _ = self.state.notify.notified() => {}
            _ = tokio::time::sleep_until(self.deadline) => {
                self.state.resolve(LoadOutcome::TimedOut);
            }
        }

        self.outcome().unwrap_or(LoadOutcome::TimedOut)
    }
}

#[derive(Debug)]
struct InFlight {
    state: Arc<LoadState>,
    remaining: usize,
    deadline: Instant,
}

/// Tracks the single in-flight build.
#[derive(Debug, Default)]
pub struct LoadCoordinator {
    generation: u64,
    current: Option<InFlight>,
}

impl LoadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new build, superseding any build still in flight.
    pub fn begin(&mut self, now: Instant, timeout: Duration) -> PendingLoad {
        self.supersede();

        self.generation += 1;
        let state = Arc::new(LoadState {
            generation: self.generation,
            outcome: OnceLock::new(),
            notify: Notify::new(),
        });
        self.current = Some(InFlight {
            state: state.clone(),
            remaining: 0,
            deadline: now + timeout,
        });

        PendingLoad {
            state,
            deadline: tokio::time::Instant::now() + timeout,
        }
    }

    /// Drop the in-flight build as superseded, if any.
    pub fn supersede(&mut self) -> Option<LoadOutcome> {
        let previous = self.current.take()?;
        let outcome = previous.state.resolve(LoadOutcome::Superseded);
        debug!(
            generation = previous.state.generation,
            ?outcome,
            "Superseded in-flight build"
        );
        Some(outcome)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.current.is_some()
    }

    /// Outstanding measurements of the current build
    pub fn remaining(&self) -> usize {
        self.current.as_ref().map_or(0, |c| c.remaining)
    }

    /// Count one more slot awaiting measurement.
    pub fn expect_measurement(&mut self) {
        if let Some(current) = self.current.as_mut() {
            current.remaining += 1;
        }
    }

    /// Resolve as loaded if nothing is outstanding.
    pub fn settle(&mut self) -> Option<LoadOutcome> {
        if self.current.as_ref()?.remaining > 0 {
            return None;
        }
        self.finish(LoadOutcome::Loaded)
    }

    /// A measurement arrived. Returns the outcome when it was the last one.
    pub fn measured(&mut self, generation: u64) -> Option<LoadOutcome> {
        let current = self.current.as_mut()?;
        if current.state.generation != generation {
            debug!(generation, current = current.state.generation, "Ignoring stale measurement");
            return None;
        }
        current.remaining = current.remaining.saturating_sub(1);
        self.settle()
    }

    pub fn cancel(&mut self) -> Option<LoadOutcome> {
        self.finish(LoadOutcome::Cancelled)
    }

    /// Time out an expired build, and pick up one resolved through its [`PendingLoad`].
    pub fn poll(&mut self, now: Instant) -> Option<LoadOutcome> {
        let current = self.current.as_ref()?;
        match current.state.outcome.get().copied() {
            Some(outcome) => {
                self.current = None;
                Some(outcome)
            }
            None if now >= current.deadline => self.finish(LoadOutcome::TimedOut),
            None => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.current.as_ref().map(|c| c.deadline)
    }

    fn finish(&mut self, outcome: LoadOutcome) -> Option<LoadOutcome> {
        let current = self.current.take()?;
        Some(current.state.resolve(outcome))
    }
}
