//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Middleware and server produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Metrics are optional; recording is a no-op without a recorder

pub mod logging;
pub mod metrics;
