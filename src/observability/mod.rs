//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Monitor loop and UI loop produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted strings where practical
//! - Metrics are cheap and safe to record with no exporter installed

pub mod logging;
pub mod metrics;
