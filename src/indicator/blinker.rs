//! Offline blink state machine.
//!
//! # States
//! - Idle: the host shows whatever its owner last set
//! - Blinking: the blinker alternates between the captured stable form and
//!   an alternate (hidden, else offline marker) form on every tick
//!
//! # State Transitions
//! ```text
//! Idle     --offline--> Blinking  capture stable, show alternate, start timer
//! Blinking --online-->  Idle      cancel timer, restore captured stable
//! Blinking --tick-->    Blinking  flip toggle: true=stable, false=alternate
//! Blinking --offline--> Blinking  no-op
//! Idle     --online-->  Idle      no-op
//! ```
//!
//! # Design Decisions
//! - Each blink cycle has a generation; ticks from an older cycle are ignored
//! - The blinker never redefines the stable form, only restores it

use std::time::Duration;

use crate::connectivity::ConnectivityChanged;
use crate::dispatch::TimerHandle;
use crate::indicator::IndicatorHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkMode {
    Idle,
    Blinking,
}

pub struct IndicatorBlinker<H: IndicatorHost> {
    host: H,
    period: Duration,
    mode: BlinkMode,
    toggle: bool,
    stable: Option<H::Representation>,
    alternate: Option<H::Representation>,
    timer: Option<TimerHandle>,
    generation: u64,
}

impl<H: IndicatorHost> IndicatorBlinker<H> {
    pub fn new(host: H, period: Duration) -> Self {
        Self {
            host,
            period,
            mode: BlinkMode::Idle,
            toggle: false,
            stable: None,
            alternate: None,
            timer: None,
            generation: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn mode(&self) -> BlinkMode {
        self.mode
    }

    pub fn is_blinking(&self) -> bool {
        self.mode == BlinkMode::Blinking
    }

    pub fn toggle(&self) -> bool {
        self.toggle
    }

    /// Identifier of the current (or last) blink cycle.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Show `representation` unless blinking owns the display.
    ///
    /// Returns `false` when the update was refused.
    pub fn display(&mut self, representation: H::Representation) -> bool {
        if self.is_blinking() {
            return false;
        }
        self.host.set_displayed(representation);
        true
    }

    /// Route a connectivity event to `on_offline` / `on_online`.
    pub fn on_connectivity<F>(&mut self, event: ConnectivityChanged, start_timer: F)
    where
        F: FnOnce(Duration, u64) -> TimerHandle,
    {
        if event.connected {
            self.on_online();
        } else {
            self.on_offline(start_timer);
        }
    }

    /// Enter Blinking. `start_timer` receives the period and cycle generation.
    pub fn on_offline<F>(&mut self, start_timer: F)
    where
        F: FnOnce(Duration, u64) -> TimerHandle,
    {
        if self.is_blinking() {
            return;
        }
        let Some(alternate) = self.host.hidden().or_else(|| self.host.offline_marker()) else {
            tracing::warn!("Indicator has no hidden or offline form, not blinking");
            return;
        };

        self.stable = Some(self.host.current_stable());
        self.alternate = Some(alternate.clone());
        self.generation += 1;
        self.toggle = false;
        self.mode = BlinkMode::Blinking;
        self.host.set_displayed(alternate);
        self.timer = Some(start_timer(self.period, self.generation));

        tracing::debug!(generation = self.generation, "Indicator blinking started");
    }

    /// Leave Blinking and restore the captured stable form.
    pub fn on_online(&mut self) {
        if !self.is_blinking() {
            return;
        }
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        self.toggle = false;
        self.mode = BlinkMode::Idle;
        self.alternate = None;
        if let Some(stable) = self.stable.take() {
            self.host.set_displayed(stable);
        }

        tracing::debug!(generation = self.generation, "Indicator blinking stopped");
    }

    pub fn on_tick(&mut self, generation: u64) {
        if !self.is_blinking() || generation != self.generation {
            return;
        }
        self.toggle = !self.toggle;
        let next = if self.toggle {
            self.stable.clone()
        } else {
            self.alternate.clone()
        };
        if let Some(representation) = next {
            self.host.set_displayed(representation);
        }
    }

    /// Stop blinking for teardown; same as going back online.
    pub fn stop(&mut self) {
        self.on_online();
    }
}
