//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals and timeouts > 0)
//! - Check the probe URL and metrics address are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Zero thresholds are clamped at construction, not rejected here

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::MonitorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A duration field was zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// The probe URL could not be parsed.
    #[error("invalid probe url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The probe URL uses a scheme other than http or https.
    #[error("probe url scheme must be http or https, got '{0}'")]
    UnsupportedScheme(String),

    /// The metrics address is not a socket address.
    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.check.interval_ms == 0 {
        errors.push(ValidationError::ZeroDuration("check.interval_ms"));
    }
    if config.check.probe_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration("check.probe_timeout_ms"));
    }
    if config.indicator.blink_interval_ms == 0 {
        errors.push(ValidationError::ZeroDuration("indicator.blink_interval_ms"));
    }

    match Url::parse(&config.probe.url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidUrl {
            url: config.probe.url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
