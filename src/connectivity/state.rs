//! Connectivity state machine.
//!
//! # States
//! - Online: initial, optimistic until proven otherwise
//! - Offline: enough consecutive probes failed
//!
//! # State Transitions
//! ```text
//! Online → Offline: consecutive failures >= failure_threshold
//! Offline → Online: consecutive successes >= success_threshold
//! ```
//!
//! # Design Decisions
//! - Hysteresis prevents flapping
//! - Each observation resets the opposite counter
//! - Owned by a single loop; no atomics needed

use crate::connectivity::{ConnectivityState, ProbeOutcome, ThresholdConfig};

/// Consecutive observation counters. At most one is nonzero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HysteresisCounters {
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

/// Debounces raw probe outcomes into a stable connectivity state.
#[derive(Debug, Clone)]
pub struct Classifier {
    state: ConnectivityState,
    counters: HysteresisCounters,
    success_threshold: u32,
    failure_threshold: u32,
}

impl Classifier {
    pub fn new(success_threshold: u32, failure_threshold: u32) -> Self {
        Self {
            state: ConnectivityState::Online,
            counters: HysteresisCounters::default(),
            success_threshold: success_threshold.max(1),
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn from_thresholds(config: &ThresholdConfig) -> Self {
        Self::new(config.success_threshold, config.failure_threshold)
    }

    /// Current stable state.
    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn counters(&self) -> HysteresisCounters {
        self.counters
    }

    /// Feed one probe outcome; returns the new state only if it flipped.
    pub fn observe(&mut self, outcome: ProbeOutcome) -> Option<ConnectivityState> {
        match outcome {
            ProbeOutcome::Success => {
                self.counters.consecutive_failures = 0;
                self.counters.consecutive_successes =
                    self.counters.consecutive_successes.saturating_add(1);

                if self.counters.consecutive_successes >= self.success_threshold
                    && self.state == ConnectivityState::Offline
                {
                    self.state = ConnectivityState::Online;
                    return Some(self.state);
                }
            }
            ProbeOutcome::Failure => {
                self.counters.consecutive_successes = 0;
                self.counters.consecutive_failures =
                    self.counters.consecutive_failures.saturating_add(1);

                if self.counters.consecutive_failures >= self.failure_threshold
                    && self.state == ConnectivityState::Online
                {
                    self.state = ConnectivityState::Offline;
                    return Some(self.state);
                }
            }
        }
        None
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(1, 1)
    }
}
