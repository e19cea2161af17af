//! Single connectivity probe.
//!
//! # Responsibilities
//! - Short-circuit when the host has no route out
//! - GET a fixed endpoint with connection reuse disabled
//! - Enforce an explicit deadline, aborting the request on expiry
//!
//! # Design Decisions
//! - `probe()` is infallible; every fault maps to `ProbeOutcome::Failure`
//! - Only `200 OK` counts as success
//! - The deadline does not rely on transport timeouts; the request future is
//!   dropped when it loses the race, which closes its connection

use std::future::Future;
use std::net::UdpSocket;
use std::time::Duration;

use reqwest::header::CONNECTION;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::time;
use url::Url;

use crate::config::ProbeConfig;
use crate::connectivity::ProbeOutcome;

/// Public addresses used only for a local route lookup; nothing is sent.
const ROUTE_CHECK_V4: &str = "1.1.1.1:53";
const ROUTE_CHECK_V6: &str = "[2606:4700:4700::1111]:53";

/// Local check run before any network call; `false` fails the probe.
pub type RouteCheck = fn() -> bool;

/// A bounded-time reachability check.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Errors building a probe. Running one never fails.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid probe url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP(S) probe against a single well-known endpoint.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    url: Url,
    timeout: Duration,
    route_check: Option<RouteCheck>,
}

impl HttpProbe {
    pub fn new(config: &ProbeConfig, timeout: Duration) -> Result<Self, ProbeError> {
        let url = Url::parse(&config.url)?;
        let mut builder = Client::builder()
            .pool_max_idle_per_host(0)
            .user_agent(config.user_agent.as_str())
            .timeout(timeout);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        let route_check = config
            .require_active_interface
            .then_some(has_active_route as RouteCheck);

        Ok(Self {
            client,
            url,
            timeout,
            route_check,
        })
    }

    /// Replace the route check. Ignored when the config disabled it.
    pub fn with_route_check(mut self, check: RouteCheck) -> Self {
        if self.route_check.is_some() {
            self.route_check = Some(check);
        }
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Probe for HttpProbe {
    async fn probe(&self) -> ProbeOutcome {
        if self.route_check.is_some_and(|check| !check()) {
            tracing::debug!("Probe skipped: no active network interface");
            return ProbeOutcome::Failure;
        }

        let request = self
            .client
            .get(self.url.clone())
            .header(CONNECTION, "close")
            .send();

        match time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                let outcome = classify_status(response.status());
                if outcome == ProbeOutcome::Failure {
                    tracing::debug!(url = %self.url, status = %response.status(), "Probe failed: unexpected status");
                }
                outcome
            }
            Ok(Err(e)) => {
                tracing::debug!(url = %self.url, error = %e, "Probe failed: request error");
                ProbeOutcome::Failure
            }
            Err(_) => {
                tracing::debug!(url = %self.url, timeout_ms = self.timeout.as_millis() as u64, "Probe failed: timeout, request aborted");
                ProbeOutcome::Failure
            }
        }
    }
}

/// Map a response status to a probe outcome.
pub fn classify_status(status: StatusCode) -> ProbeOutcome {
    if status == StatusCode::OK {
        ProbeOutcome::Success
    } else {
        ProbeOutcome::Failure
    }
}

/// Whether any local interface has a route to the public internet.
///
/// Connecting a UDP socket only performs a routing table lookup, so this
/// never blocks.
pub fn has_active_route() -> bool {
    for (bind, target) in [("0.0.0.0:0", ROUTE_CHECK_V4), ("[::]:0", ROUTE_CHECK_V6)] {
        if let Ok(socket) = UdpSocket::bind(bind) {
            if socket.connect(target).is_ok() {
                return true;
            }
        }
    }
    false
}
