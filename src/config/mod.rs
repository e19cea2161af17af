//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!     → ThresholdConfig / ProbeConfig handed to the monitor at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::MonitorConfig;
pub use schema::CheckConfig;
pub use schema::ProbeConfig;
pub use schema::IndicatorConfig;
pub use schema::ObservabilityConfig;
