//! Connectivity Monitor
//!
//! Probes a well-known endpoint on a fixed cadence and blinks a console
//! indicator while the host is offline.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────── monitor task ────────────────┐     ┌──────── UI loop ────────┐
//!   │                                              │     │                         │
//!   │  interval ──▶ probe ──▶ classifier ──────────┼────▶│ dispatcher handlers     │
//!   │     ▲        (HTTP,    (hysteresis)  only on │post │   └▶ blinker ──▶ glyph  │
//!   │     └──────── 5s cap)               transition│     │ blink timer ticks      │
//!   └──────────────────────────────────────────────┘     └─────────────────────────┘
//!            ▲                                                       ▲
//!            └──────────────── shutdown (SIGINT/SIGTERM) ────────────┘
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use connectivity_monitor::config::loader::{load_config, ConfigError};
use connectivity_monitor::config::validation::validate_config;
use connectivity_monitor::config::MonitorConfig;
use connectivity_monitor::connectivity::{
    ConnectivityMonitor, HttpProbe, Probe, ProbeOutcome, ThresholdConfig,
};
use connectivity_monitor::dispatch::{NotificationDispatcher, UiLoop};
use connectivity_monitor::indicator::{subscribe_blinker, ConsoleIndicator, IndicatorBlinker};
use connectivity_monitor::lifecycle::{signals, Shutdown};
use connectivity_monitor::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "connectivity-monitor")]
#[command(about = "Watch internet connectivity and blink an indicator while offline", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor with a console indicator until interrupted
    Run(RunArgs),
    /// Probe once and print the result as JSON
    Probe,
}

#[derive(Args)]
struct RunArgs {
    /// Override check.interval_ms
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Override check.success_threshold
    #[arg(long)]
    success_threshold: Option<u32>,

    /// Override check.failure_threshold
    #[arg(long)]
    failure_threshold: Option<u32>,
}

impl RunArgs {
    fn apply(&self, config: &mut MonitorConfig) {
        if let Some(interval_ms) = self.interval_ms {
            config.check.interval_ms = interval_ms;
        }
        if let Some(threshold) = self.success_threshold {
            config.check.success_threshold = threshold;
        }
        if let Some(threshold) = self.failure_threshold {
            config.check.failure_threshold = threshold;
        }
    }
}

/// UI-owned state.
struct Tray {
    blinker: IndicatorBlinker<ConsoleIndicator>,
}

impl Tray {
    fn blinker(&mut self) -> &mut IndicatorBlinker<ConsoleIndicator> {
        &mut self.blinker
    }
}

#[derive(Serialize)]
struct ProbeReport {
    url: String,
    connected: bool,
    elapsed_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };

    logging::init_logging(&config.observability.log_level)?;

    match cli.command {
        Commands::Probe => probe_once(&config).await,
        Commands::Run(args) => {
            args.apply(&mut config);
            validate_config(&config).map_err(ConfigError::Validation)?;
            run(config).await
        }
    }
}

async fn probe_once(config: &MonitorConfig) -> Result<(), Box<dyn Error>> {
    let thresholds = ThresholdConfig::from(config);
    let probe = HttpProbe::new(&config.probe, thresholds.probe_timeout)?;

    tracing::debug!(url = %probe.url(), "Running single probe");
    let started = Instant::now();
    let outcome = probe.probe().await;
    let report = ProbeReport {
        url: probe.url().to_string(),
        connected: outcome == ProbeOutcome::Success,
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.connected {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(config: MonitorConfig) -> Result<(), Box<dyn Error>> {
    tracing::info!("connectivity-monitor v0.1.0 starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let thresholds = ThresholdConfig::from(&config);
    let probe = HttpProbe::new(&config.probe, thresholds.probe_timeout)?;

    tracing::info!(
        url = %probe.url(),
        interval_ms = config.check.interval_ms,
        success_threshold = thresholds.success_threshold,
        failure_threshold = thresholds.failure_threshold,
        "Configuration loaded"
    );

    let blink_period = Duration::from_millis(config.indicator.blink_interval_ms);
    let mut ui = UiLoop::new(Tray {
        blinker: IndicatorBlinker::new(ConsoleIndicator::new(), blink_period),
    });

    let dispatcher = NotificationDispatcher::new();
    subscribe_blinker(&dispatcher, Tray::blinker);
    dispatcher.subscribe(|_, _, event| {
        tracing::info!(connected = event.connected, "Connectivity notification delivered");
    });

    let monitor = Arc::new(ConnectivityMonitor::new(thresholds, probe, dispatcher.clone()));

    // Capture the UI context and start probing once the loop is up.
    {
        let monitor = monitor.clone();
        ui.on_idle_once(move |_, context| {
            dispatcher.attach(context);
            monitor.start();
        });
    }

    // The monitor is fully stopped before the UI loop exits.
    let ui_shutdown = Shutdown::new();
    let ui_signal = ui_shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        monitor.stop();
        monitor.wait().await;
        ui_shutdown.trigger();
    });

    let mut tray = ui.run(ui_signal).await;
    tray.blinker.stop();
    println!();

    tracing::info!("Shutdown complete");
    Ok(())
}
