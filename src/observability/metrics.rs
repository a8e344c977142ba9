//! Metrics collection and exposition.
//!
//! # Metrics
//! - `prerender_decisions_total` (counter): classifier results by `decision`
//! - `prerender_relay_total` (counter): relay results by `outcome`
//! - `prerender_relay_duration_seconds` (histogram): rendering service latency
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::prerender::RelayOutcome;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_decision(rendered: bool) {
    let decision = if rendered { "render" } else { "pass_through" };
    ::metrics::counter!("prerender_decisions_total", "decision" => decision).increment(1);
}

pub fn record_relay(outcome: &RelayOutcome, start_time: Instant) {
    let label = match outcome {
        RelayOutcome::Redirect { .. } => "redirect",
        RelayOutcome::Rendered { .. } => "rendered",
    };
    ::metrics::counter!("prerender_relay_total", "outcome" => label).increment(1);
    ::metrics::histogram!("prerender_relay_duration_seconds")
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_relay_error(start_time: Instant) {
    ::metrics::counter!("prerender_relay_total", "outcome" => "error").increment(1);
    ::metrics::histogram!("prerender_relay_duration_seconds")
        .record(start_time.elapsed().as_secs_f64());
}
