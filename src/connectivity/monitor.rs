//! Periodic connectivity monitor.
//!
//! # Responsibilities
//! - Periodically probe the endpoint
//! - Feed outcomes through the hysteresis classifier
//! - Publish genuine transitions, and nothing else
//!
//! # Design Decisions
//! - The loop owns the classifier; no shared mutable state
//! - Both suspension points (probe, inter-probe wait) race the shutdown
//!   signal, so `stop()` takes effect immediately
//! - A transition computed after `stop()` is discarded

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

use crate::connectivity::probe::Probe;
use crate::connectivity::state::Classifier;
use crate::connectivity::{ConnectivityState, ThresholdConfig};
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::observability::metrics;

/// Receiver of stable-state transitions produced by the monitor loop.
///
/// Called from the monitor's task, never from the UI thread.
pub trait TransitionSink: Send + Sync + 'static {
    fn publish(&self, state: ConnectivityState);
}

impl TransitionSink for mpsc::UnboundedSender<ConnectivityState> {
    fn publish(&self, state: ConnectivityState) {
        if self.send(state).is_err() {
            tracing::debug!(state = %state, "Transition dropped: receiver closed");
        }
    }
}

impl<T: TransitionSink> TransitionSink for Arc<T> {
    fn publish(&self, state: ConnectivityState) {
        (**self).publish(state)
    }
}

/// Background connectivity monitor.
pub struct ConnectivityMonitor<P: Probe, T: TransitionSink> {
    thresholds: ThresholdConfig,
    probe: Arc<P>,
    sink: Arc<T>,
    shutdown: Shutdown,
    started: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<P: Probe, T: TransitionSink> ConnectivityMonitor<P, T> {
    pub fn new(thresholds: ThresholdConfig, probe: P, sink: T) -> Self {
        Self {
            thresholds,
            probe: Arc::new(probe),
            sink: Arc::new(sink),
            shutdown: Shutdown::new(),
            started: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    /// Spawn the monitor loop onto the current Tokio runtime.
    ///
    /// Returns `false` if the monitor was already started or already stopped.
    pub fn start(&self) -> bool {
        if self.shutdown.is_triggered() {
            tracing::warn!("Connectivity monitor already stopped, not starting");
            return false;
        }
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Connectivity monitor already started");
            return false;
        }

        let task = tokio::spawn(run_loop(
            self.probe.clone(),
            self.sink.clone(),
            self.thresholds,
            self.shutdown.subscribe(),
        ));
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
        true
    }

    /// Request the loop to exit. Idempotent; safe before `start()`.
    pub fn stop(&self) {
        if !self.shutdown.is_triggered() {
            tracing::info!("Stopping connectivity monitor");
        }
        self.shutdown.trigger();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Wait for the loop task to finish. Returns immediately if never started.
    pub async fn wait(&self) {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "Connectivity monitor task panicked");
                }
            }
        }
    }
}

impl<P: Probe, T: TransitionSink> Drop for ConnectivityMonitor<P, T> {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

async fn run_loop<P: Probe, T: TransitionSink>(
    probe: Arc<P>,
    sink: Arc<T>,
    thresholds: ThresholdConfig,
    mut shutdown: ShutdownSignal,
) {
    let mut classifier = Classifier::from_thresholds(&thresholds);

    tracing::info!(
        interval_ms = thresholds.check_interval.as_millis() as u64,
        success_threshold = thresholds.success_threshold,
        failure_threshold = thresholds.failure_threshold,
        "Connectivity monitor starting"
    );
    metrics::record_state(classifier.state());

    loop {
        let outcome = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            outcome = probe.probe() => outcome,
        };
        metrics::record_probe(outcome);

        match classifier.observe(outcome) {
            Some(state) => {
                if shutdown.is_cancelled() {
                    break;
                }
                tracing::info!(state = %state, "Connectivity changed");
                metrics::record_transition(state);
                sink.publish(state);
            }
            None => {
                let counters = classifier.counters();
                tracing::trace!(
                    outcome = outcome.as_str(),
                    state = %classifier.state(),
                    successes = counters.consecutive_successes,
                    failures = counters.consecutive_failures,
                    "Probe observed"
                );
            }
        }

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = time::sleep(thresholds.check_interval) => {}
        }
    }

    tracing::info!("Connectivity monitor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::ProbeOutcome::{self, Failure, Success};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::mpsc::error::TryRecvError;

    /// Replays a fixed script, then repeats `fallback`.
    struct ScriptedProbe {
        script: Mutex<VecDeque<ProbeOutcome>>,
        fallback: ProbeOutcome,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedProbe {
        fn new(script: &[ProbeOutcome], fallback: ProbeOutcome) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let probe = Self {
                script: Mutex::new(script.iter().copied().collect()),
                fallback,
                calls: calls.clone(),
            };
            (probe, calls)
        }
    }

    impl Probe for ScriptedProbe {
        fn probe(&self) -> impl Future<Output = ProbeOutcome> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);
            async move { outcome }
        }
    }

    struct HangingProbe;

    impl Probe for HangingProbe {
        async fn probe(&self) -> ProbeOutcome {
            std::future::pending().await
        }
    }

    fn thresholds(interval: Duration) -> ThresholdConfig {
        ThresholdConfig::new(1, 1, interval, Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_emits_only_transitions() {
        let interval = Duration::from_secs(5);
        let (probe, calls) = ScriptedProbe::new(&[Success, Failure, Failure, Success], Success);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let monitor = ConnectivityMonitor::new(thresholds(interval), probe, tx);
        assert!(monitor.start());

        let expected = [
            None,
            Some(ConnectivityState::Offline),
            None,
            Some(ConnectivityState::Online),
        ];

        time::sleep(Duration::from_millis(1)).await;
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(calls.load(Ordering::SeqCst), i + 1);
            match want {
                Some(state) => assert_eq!(rx.try_recv(), Ok(*state)),
                None => {}
            }
            assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
            time::sleep(interval).await;
        }

        monitor.stop();
        monitor.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_final() {
        let interval = Duration::from_secs(1);
        let (probe, calls) = ScriptedProbe::new(&[Success], Failure);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let monitor = ConnectivityMonitor::new(thresholds(interval), probe, tx);
        monitor.start();

        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        monitor.stop();
        monitor.stop();
        monitor.wait().await;
        assert!(monitor.is_stopped());

        time::sleep(interval * 10).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_start() {
        let (probe, calls) = ScriptedProbe::new(&[], Failure);
        let (tx, _rx) = mpsc::unbounded_channel();
        let monitor = ConnectivityMonitor::new(thresholds(Duration::from_secs(1)), probe, tx);

        monitor.stop();
        assert!(!monitor.start());
        monitor.wait().await;

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_spawns_once() {
        let (probe, calls) = ScriptedProbe::new(&[], Success);
        let (tx, _rx) = mpsc::unbounded_channel();
        let monitor = ConnectivityMonitor::new(thresholds(Duration::from_secs(1)), probe, tx);

        assert!(monitor.start());
        assert!(!monitor.start());
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        monitor.stop();
        monitor.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_long_wait() {
        let (probe, _calls) = ScriptedProbe::new(&[], Success);
        let (tx, _rx) = mpsc::unbounded_channel();
        let monitor = ConnectivityMonitor::new(thresholds(Duration::from_secs(3600)), probe, tx);
        monitor.start();
        time::sleep(Duration::from_millis(1)).await;

        monitor.stop();
        time::timeout(Duration::from_secs(1), monitor.wait())
            .await
            .expect("loop should exit without waiting out the interval");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_pending_probe() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let monitor = ConnectivityMonitor::new(thresholds(Duration::from_secs(1)), HangingProbe, tx);
        monitor.start();
        time::sleep(Duration::from_millis(10)).await;

        monitor.stop();
        time::timeout(Duration::from_secs(1), monitor.wait())
            .await
            .expect("loop should exit while a probe is in flight");
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_loop() {
        let (probe, calls) = ScriptedProbe::new(&[], Success);
        let (tx, _rx) = mpsc::unbounded_channel();
        let monitor = ConnectivityMonitor::new(thresholds(Duration::from_secs(1)), probe, tx);
        monitor.start();
        time::sleep(Duration::from_millis(1)).await;
        drop(monitor);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hysteresis_applied_by_loop() {
        let interval = Duration::from_secs(1);
        let (probe, _calls) = ScriptedProbe::new(
            &[Failure, Failure, Success, Failure, Failure, Failure, Success],
            Success,
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let monitor = ConnectivityMonitor::new(
            ThresholdConfig::new(2, 3, interval, Duration::from_secs(5)),
            probe,
            tx,
        );
        monitor.start();

        time::sleep(interval * 10).await;
        monitor.stop();
        monitor.wait().await;
        drop(monitor);

        let mut emitted = Vec::new();
        while let Some(state) = rx.recv().await {
            emitted.push(state);
        }
        assert_eq!(emitted, vec![ConnectivityState::Offline, ConnectivityState::Online]);
    }
}
