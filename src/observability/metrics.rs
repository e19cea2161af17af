//! Metrics collection and exposition.
//!
//! # Metrics
//! - `connectivity_probes_total` (counter): probes by outcome
//! - `connectivity_transitions_total` (counter): stable-state flips by state
//! - `connectivity_online` (gauge): 1=online, 0=offline
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Prometheus exporter is optional and off by default

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::connectivity::{ConnectivityState, ProbeOutcome};

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of a single probe.
pub fn record_probe(outcome: ProbeOutcome) {
    counter!("connectivity_probes_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record a stable-state transition.
pub fn record_transition(state: ConnectivityState) {
    counter!("connectivity_transitions_total", "state" => state.as_str()).increment(1);
    record_state(state);
}

/// Record the current stable state.
pub fn record_state(state: ConnectivityState) {
    let value = match state {
        ConnectivityState::Online => 1.0,
        ConnectivityState::Offline => 0.0,
    };
    gauge!("connectivity_online").set(value);
}
