//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Init logging/metrics → Build UI loop → First idle:
//!     capture UI context, start monitor
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop and await monitor → UI loop exits → Stop blinking
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Begin graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One shutdown signal observed by every suspension point
//! - Shutdown is level-triggered, so late subscribers still stop

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
