//! Prometheus metrics and structured logging for the XEMM bot.
//!
//! - Structured logging via `tracing` (JSON in production, pretty otherwise)
//! - Prometheus counters/gauges for maker quoting and hedging

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
