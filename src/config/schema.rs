//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the connectivity monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Probe cadence and hysteresis thresholds.
    pub check: CheckConfig,

    /// Probe endpoint settings.
    pub probe: ProbeConfig,

    /// Offline indicator settings.
    pub indicator: IndicatorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Check loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Delay between two probes in milliseconds.
    pub interval_ms: u64,

    /// Upper bound on a single probe in milliseconds.
    pub probe_timeout_ms: u64,

    /// Number of consecutive successes before reporting online.
    pub success_threshold: u32,

    /// Number of consecutive failures before reporting offline.
    pub failure_threshold: u32,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            probe_timeout_ms: 5_000,
            success_threshold: 1,
            failure_threshold: 1,
        }
    }
}

/// Probe endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// HTTP(S) endpoint expected to answer `200 OK`.
    pub url: String,

    /// User-Agent header sent with every probe.
    pub user_agent: String,

    /// Skip the network call when no interface has a route out.
    pub require_active_interface: bool,

    /// Route probes through the proxy configured in the environment.
    pub use_system_proxy: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: "https://www.baidu.com".to_string(),
            user_agent: "connectivity-monitor".to_string(),
            require_active_interface: true,
            use_system_proxy: true,
        }
    }
}

/// Offline indicator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Blink tick period in milliseconds.
    pub blink_interval_ms: u64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            blink_interval_ms: 600,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
