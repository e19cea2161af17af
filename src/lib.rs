//! Internet connectivity monitor with a debounced, blinking indicator.

pub mod config;
pub mod connectivity;
pub mod dispatch;
pub mod indicator;
pub mod lifecycle;
pub mod observability;

pub use config::schema::MonitorConfig;
pub use connectivity::{ConnectivityChanged, ConnectivityMonitor, ConnectivityState, ThresholdConfig};
pub use dispatch::{NotificationDispatcher, UiLoop};
pub use indicator::IndicatorBlinker;
pub use lifecycle::Shutdown;
