//! Delivery of connectivity transitions to the UI.
//!
//! # Data Flow
//! ```text
//! Monitor task                         UI loop (single consumer)
//!     publish(state)                       │
//!     → dispatcher.rs                      │
//!         context captured? ──no──▶ queue  │
//!                  │yes                    │
//!                  ▼                       ▼
//!         context.rs post(closure) ──▶ run handlers in order
//!                                      run timer ticks
//! ```
//!
//! # Design Decisions
//! - The UI context is captured once, on the loop's first idle
//! - All UI-facing mutation funnels through one queue, so handlers and
//!   ticks never overlap

pub mod context;
pub mod dispatcher;

pub use context::{DispatchError, TimerHandle, UiContext, UiLoop, UiTask};
pub use dispatcher::{Handler, NotificationDispatcher};
