//! Connectivity indicator.
//!
//! # Data Flow
//! ```text
//! dispatcher (UI context)
//!     → blinker.rs on_connectivity
//!         offline: start UiContext::every timer, ticks → on_tick
//!         online:  cancel timer, restore stable form
//!     → IndicatorHost::set_displayed
//! ```
//!
//! # Design Decisions
//! - The host is an external collaborator; the blinker only swaps forms
//! - Everything here runs on the UI context

use crate::dispatch::NotificationDispatcher;

pub mod blinker;
pub mod console;

pub use blinker::{BlinkMode, IndicatorBlinker};
pub use console::ConsoleIndicator;

/// Visual surface showing connectivity, e.g. a tray icon.
///
/// All methods are synchronous and called only on the UI context.
pub trait IndicatorHost {
    type Representation: Clone;

    fn set_displayed(&mut self, representation: Self::Representation);

    /// The form the host's owner currently considers correct.
    fn current_stable(&self) -> Self::Representation;

    /// Fully transparent form, preferred for blinking.
    fn hidden(&self) -> Option<Self::Representation>;

    /// Distinct offline form, used when no hidden form exists.
    fn offline_marker(&self) -> Option<Self::Representation>;
}

/// Subscribe the blinker reachable through `project` to `dispatcher`.
pub fn subscribe_blinker<S, H>(
    dispatcher: &NotificationDispatcher<S>,
    project: fn(&mut S) -> &mut IndicatorBlinker<H>,
) where
    S: 'static,
    H: IndicatorHost + 'static,
{
    dispatcher.subscribe(move |state, context, event| {
        project(state).on_connectivity(event, |period, generation| {
            context.every(period, move |state, _| project(state).on_tick(generation))
        });
    });
}
