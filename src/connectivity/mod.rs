//! Connectivity checking subsystem.
//!
//! # Data Flow
//! ```text
//! monitor.rs (periodic loop, cancellable):
//!     Probe the endpoint (probe.rs)
//!     → Classify outcome (state.rs)
//!     → On transition: publish to a TransitionSink
//!     → Cancellable wait, repeat
//!
//! State machine (state.rs):
//!     Online ←→ Offline
//!     With thresholds to prevent flapping
//! ```
//!
//! # Design Decisions
//! - Probes never fail; every fault becomes `ProbeOutcome::Failure`
//! - Transitions require consecutive successes/failures
//! - Only genuine transitions leave the loop

use std::fmt;
use std::time::Duration;

use crate::config::MonitorConfig;

pub mod monitor;
pub mod probe;
pub mod state;

pub use monitor::{ConnectivityMonitor, TransitionSink};
pub use probe::{HttpProbe, Probe, ProbeError, RouteCheck};
pub use state::{Classifier, HysteresisCounters};

/// Stable connectivity state reported to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectivityState {
    Online,
    Offline,
}

impl ConnectivityState {
    pub fn is_online(self) -> bool {
        self == ConnectivityState::Online
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectivityState::Online => "online",
            ConnectivityState::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    Failure,
}

impl ProbeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeOutcome::Success => "success",
            ProbeOutcome::Failure => "failure",
        }
    }
}

/// Event delivered to subscribers on each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityChanged {
    pub connected: bool,
}

impl From<ConnectivityState> for ConnectivityChanged {
    fn from(state: ConnectivityState) -> Self {
        Self {
            connected: state.is_online(),
        }
    }
}

/// Hysteresis and timing parameters, fixed for the lifetime of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    pub success_threshold: u32,
    pub failure_threshold: u32,
    pub check_interval: Duration,
    pub probe_timeout: Duration,
}

impl ThresholdConfig {
    /// Build a config, clamping both thresholds to at least 1.
    pub fn new(
        success_threshold: u32,
        failure_threshold: u32,
        check_interval: Duration,
        probe_timeout: Duration,
    ) -> Self {
        if success_threshold == 0 || failure_threshold == 0 {
            tracing::warn!(
                success_threshold,
                failure_threshold,
                "Threshold of zero clamped to 1"
            );
        }
        Self {
            success_threshold: success_threshold.max(1),
            failure_threshold: failure_threshold.max(1),
            check_interval,
            probe_timeout,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::new(1, 1, Duration::from_secs(5), Duration::from_secs(5))
    }
}

impl From<&MonitorConfig> for ThresholdConfig {
    fn from(config: &MonitorConfig) -> Self {
        Self::new(
            config.check.success_threshold,
            config.check.failure_threshold,
            Duration::from_millis(config.check.interval_ms),
            Duration::from_millis(config.check.probe_timeout_ms),
        )
    }
}
