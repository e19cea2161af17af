//! UI-owning execution context.
//!
//! # Responsibilities
//! - Run posted closures, one at a time, on whichever task drives the loop
//! - Signal "idle" once the queue first drains
//! - Provide repeating timers whose ticks run on the same context
//!
//! # Design Decisions
//! - UI state `S` is owned by the loop and only reachable from posted tasks,
//!   so it needs no locks and need not be `Send` to be mutated
//! - Timers are separate Tokio tasks that only post; a cancelled timer never
//!   touches `S` again unless a tick was already queued

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::lifecycle::ShutdownSignal;

/// Work item executed on the UI context.
pub type UiTask<S> = Box<dyn FnOnce(&mut S, &UiContext<S>) + Send + 'static>;

/// Errors delivering work to the UI context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("UI loop has shut down")]
    Closed,
}

/// Handle for posting work onto the UI-owning context from any thread.
pub struct UiContext<S> {
    tx: mpsc::UnboundedSender<UiTask<S>>,
}

impl<S> Clone for UiContext<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> fmt::Debug for UiContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiContext")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<S: 'static> UiContext<S> {
    /// Queue `task` to run on the UI context.
    pub fn post<F>(&self, task: F) -> Result<(), DispatchError>
    where
        F: FnOnce(&mut S, &UiContext<S>) + Send + 'static,
    {
        self.tx.send(Box::new(task)).map_err(|_| DispatchError::Closed)
    }

    /// Run `tick` on the UI context every `period`, starting one period from now.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn every<F>(&self, period: Duration, tick: F) -> TimerHandle
    where
        F: Fn(&mut S, &UiContext<S>) + Send + Sync + 'static,
    {
        let context = self.clone();
        let tick = Arc::new(tick);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let tick = tick.clone();
                if context.post(move |state, ctx| tick(state, ctx)).is_err() {
                    break;
                }
            }
        });

        TimerHandle { task: Some(task) }
    }
}

/// Owner of a repeating timer. Cancels on `cancel()` or drop.
#[derive(Debug)]
pub struct TimerHandle {
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

type IdleHook<S> = Box<dyn FnOnce(&mut S, &UiContext<S>) + Send + 'static>;

/// Single-threaded message loop owning the UI state.
pub struct UiLoop<S> {
    state: S,
    context: UiContext<S>,
    rx: mpsc::UnboundedReceiver<UiTask<S>>,
    idle_hooks: Vec<IdleHook<S>>,
}

impl<S: 'static> UiLoop<S> {
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state,
            context: UiContext { tx },
            rx,
            idle_hooks: Vec::new(),
        }
    }

    pub fn context(&self) -> UiContext<S> {
        self.context.clone()
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Run `hook` the next time the queue is drained, then forget it.
    pub fn on_idle_once<F>(&mut self, hook: F)
    where
        F: FnOnce(&mut S, &UiContext<S>) + Send + 'static,
    {
        self.idle_hooks.push(Box::new(hook));
    }

    /// Execute everything queued so far, firing idle hooks once drained.
    ///
    /// Returns the number of tasks executed.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        loop {
            while let Ok(task) = self.rx.try_recv() {
                task(&mut self.state, &self.context);
                ran += 1;
            }
            if self.idle_hooks.is_empty() {
                return ran;
            }
            for hook in std::mem::take(&mut self.idle_hooks) {
                hook(&mut self.state, &self.context);
            }
        }
    }

    /// Drive the loop until `shutdown` fires, then hand the state back.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) -> S {
        tracing::debug!("UI loop running");
        loop {
            self.run_pending();
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                task = self.rx.recv() => match task {
                    Some(task) => task(&mut self.state, &self.context),
                    None => break,
                },
            }
        }
        tracing::debug!("UI loop exited");
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;

    #[test]
    fn test_tasks_run_in_post_order() {
        let mut ui = UiLoop::new(Vec::<u32>::new());
        let ctx = ui.context();
        for i in 0..5 {
            ctx.post(move |log, _| log.push(i)).unwrap();
        }
        assert_eq!(ui.run_pending(), 5);
        assert_eq!(ui.state(), &vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_idle_hook_fires_once_after_queue_drains() {
        let mut ui = UiLoop::new(Vec::<&'static str>::new());
        let ctx = ui.context();
        ctx.post(|log, _| log.push("queued")).unwrap();
        ui.on_idle_once(|log, ctx| {
            log.push("idle");
            ctx.post(|log, _| log.push("posted from idle")).unwrap();
        });

        ui.run_pending();
        ui.run_pending();
        assert_eq!(ui.state(), &vec!["queued", "idle", "posted from idle"]);
    }

    #[test]
    fn test_post_after_loop_dropped_fails() {
        let ui = UiLoop::new(());
        let ctx = ui.context();
        drop(ui);
        assert_eq!(ctx.post(|_, _| {}), Err(DispatchError::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_stops_ticking() {
        let shutdown = Shutdown::new();
        let ui = UiLoop::new(0u32);
        let mut timer = ui.context().every(Duration::from_millis(100), |count, _| *count += 1);

        let handle = tokio::spawn(ui.run(shutdown.subscribe()));
        time::sleep(Duration::from_millis(250)).await;
        timer.cancel();
        time::sleep(Duration::from_millis(1000)).await;
        shutdown.trigger();

        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_ticks_on_ui_context() {
        let shutdown = Shutdown::new();
        let ui = UiLoop::new((0u32, None::<TimerHandle>));
        let ctx = ui.context();
        ctx.post(|state, ctx| {
            state.1 = Some(ctx.every(Duration::from_millis(100), |state: &mut (u32, Option<TimerHandle>), _| {
                state.0 += 1;
                if state.0 == 3 {
                    state.1.take();
                }
            }));
        })
        .unwrap();

        let handle = tokio::spawn(ui.run(shutdown.subscribe()));
        time::sleep(Duration::from_millis(1050)).await;
        shutdown.trigger();
        let (ticks, timer) = handle.await.unwrap();
        assert_eq!(ticks, 3);
        assert!(timer.is_none());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let ui = UiLoop::new(());
        let mut timer = ui.context().every(Duration::from_millis(10), |_, _| {});
        assert!(timer.is_active());
        timer.cancel();
        timer.cancel();
        assert!(!timer.is_active());
    }
}
