//! Transition fan-out onto the UI context.
//!
//! # Responsibilities
//! - Hold the subscriber list
//! - Capture the UI context once, when the UI loop first goes idle
//! - Queue transitions published before capture and flush them in order
//!
//! # Design Decisions
//! - Publishing and capture share one short critical section, so a
//!   transition is either queued before the flush or posted after it
//! - Consecutive identical events are suppressed
//! - Handlers run on the UI context, never on the monitor task

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::connectivity::{ConnectivityChanged, ConnectivityState, TransitionSink};
use crate::dispatch::context::{UiContext, UiLoop};

/// Subscriber callback, invoked on the UI context.
pub type Handler<S> = Arc<dyn Fn(&mut S, &UiContext<S>, ConnectivityChanged) + Send + Sync>;

struct DispatchState<S> {
    handlers: Vec<Handler<S>>,
    context: Option<UiContext<S>>,
    pending: VecDeque<ConnectivityChanged>,
    last: Option<ConnectivityChanged>,
}

/// Delivers connectivity transitions to subscribers on the UI context.
pub struct NotificationDispatcher<S> {
    inner: Arc<Mutex<DispatchState<S>>>,
}

impl<S> Clone for NotificationDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: 'static> NotificationDispatcher<S> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(DispatchState {
                handlers: Vec::new(),
                context: None,
                pending: VecDeque::new(),
                last: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DispatchState<S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler. Handlers run in registration order.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&mut S, &UiContext<S>, ConnectivityChanged) + Send + Sync + 'static,
    {
        self.lock().handlers.push(Arc::new(handler));
    }

    /// Capture the UI context and flush queued transitions.
    ///
    /// Only the first call captures; later calls return `false`.
    pub fn attach(&self, context: &UiContext<S>) -> bool {
        let mut inner = self.lock();
        let state = &mut *inner;
        if state.context.is_some() {
            return false;
        }

        let queued = state.pending.len();
        for event in state.pending.drain(..) {
            deliver(context, state.handlers.clone(), event);
        }
        state.context = Some(context.clone());

        tracing::debug!(queued, "UI context captured for connectivity notifications");
        true
    }

    /// Capture the UI context the first time `ui` goes idle.
    pub fn attach_on_idle(&self, ui: &mut UiLoop<S>) {
        let dispatcher = self.clone();
        ui.on_idle_once(move |_, context| {
            dispatcher.attach(context);
        });
    }

    pub fn is_attached(&self) -> bool {
        self.lock().context.is_some()
    }

    /// Number of transitions waiting for the UI context.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn publish_event(&self, event: ConnectivityChanged) {
        let mut inner = self.lock();
        let state = &mut *inner;
        if state.last == Some(event) {
            tracing::debug!(connected = event.connected, "Duplicate connectivity event suppressed");
            return;
        }
        state.last = Some(event);

        match &state.context {
            Some(context) => deliver(context, state.handlers.clone(), event),
            None => {
                tracing::debug!(connected = event.connected, "UI context not ready, queueing event");
                state.pending.push_back(event);
            }
        }
    }
}

impl<S: 'static> Default for NotificationDispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> TransitionSink for NotificationDispatcher<S> {
    fn publish(&self, state: ConnectivityState) {
        self.publish_event(state.into());
    }
}

fn deliver<S: 'static>(context: &UiContext<S>, handlers: Vec<Handler<S>>, event: ConnectivityChanged) {
    let posted = context.post(move |state, ctx| {
        for handler in &handlers {
            handler(state, ctx, event);
        }
    });
    if let Err(e) = posted {
        tracing::warn!(connected = event.connected, error = %e, "Connectivity event dropped");
    }
}
