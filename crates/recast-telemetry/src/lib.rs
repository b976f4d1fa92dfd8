//! Telemetry primitives shared across the Recast workspace.
//!
//! This crate centralises logging and metrics so every consumer of the
//! pipeline core adopts a consistent observability story. Layout: `init.rs`
//! (tracing subscriber setup), `metrics.rs` (Prometheus-backed pipeline
//! counters).

pub mod init;
pub mod metrics;

pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging, log_format_from_config};
pub use metrics::{Metrics, MetricsSnapshot};
