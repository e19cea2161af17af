//! Shutdown coordination for the monitor.

use tokio::sync::watch;

/// Coordinator for cooperative cancellation.
///
/// Backed by a watch channel so that the signal is level-triggered: a task
/// that subscribes after `trigger` still observes it.
#[derive(Debug)]
pub struct Shutdown {
    /// Watch channel sender; `true` once shutdown was requested.
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal. Repeated calls are no-ops.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of [`Shutdown`], held by each cancellable task.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown is requested or the coordinator is dropped.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }

    /// Non-blocking check of the signal.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}
