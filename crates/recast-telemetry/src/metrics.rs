//! Prometheus-backed metrics registry for the recording pipeline.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters relevant to template matching and status
//!   aggregation; transport-level metrics belong to the consuming services.

use std::sync::Arc;

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

/// Prometheus-backed metrics registry shared across pipeline components.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    recordings_matched_total: IntCounter,
    recordings_unmapped_total: IntCounter,
    rematch_passes_total: IntCounter,
    status_transitions_total: IntCounterVec,
}

/// Snapshot of the pipeline counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Total recordings assigned to a template by re-match passes.
    pub recordings_matched_total: u64,
    /// Total recordings released by template deletions.
    pub recordings_unmapped_total: u64,
    /// Total re-match passes executed.
    pub rematch_passes_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let recordings_matched_total = IntCounter::with_opts(Opts::new(
            "recordings_matched_total",
            "Recordings assigned to a template by re-match passes",
        ))?;
        let recordings_unmapped_total = IntCounter::with_opts(Opts::new(
            "recordings_unmapped_total",
            "Recordings released by template deletions",
        ))?;
        let rematch_passes_total = IntCounter::with_opts(Opts::new(
            "rematch_passes_total",
            "Template re-match passes executed",
        ))?;
        let status_transitions_total = IntCounterVec::new(
            Opts::new(
                "status_transitions_total",
                "Aggregate status transitions by destination status",
            ),
            &["status"],
        )?;

        registry.register(Box::new(recordings_matched_total.clone()))?;
        registry.register(Box::new(recordings_unmapped_total.clone()))?;
        registry.register(Box::new(rematch_passes_total.clone()))?;
        registry.register(Box::new(status_transitions_total.clone()))?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                recordings_matched_total,
                recordings_unmapped_total,
                rematch_passes_total,
                status_transitions_total,
            }),
        })
    }

    /// Count one recording assigned to a template.
    pub fn record_recording_matched(&self) {
        self.inner.recordings_matched_total.inc();
    }

    /// Count recordings released by a template deletion.
    pub fn record_recordings_unmapped(&self, count: u64) {
        self.inner.recordings_unmapped_total.inc_by(count);
    }

    /// Count one completed re-match pass.
    pub fn record_rematch_pass(&self) {
        self.inner.rematch_passes_total.inc();
    }

    /// Count one aggregate status transition.
    pub fn record_status_transition(&self, status: &str) {
        self.inner
            .status_transitions_total
            .with_label_values(&[status])
            .inc();
    }

    /// Current counter values for health reporting.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            recordings_matched_total: self.inner.recordings_matched_total.get(),
            recordings_unmapped_total: self.inner.recordings_unmapped_total.get(),
            rematch_passes_total: self.inner.rematch_passes_total.get(),
        }
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding the metric families fails.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.inner.registry.gather(), &mut buffer)
            .context("failed to encode metrics")?;
        String::from_utf8(buffer).context("metrics output was not valid UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_snapshot() {
        let metrics = Metrics::new().expect("metrics");
        metrics.record_recording_matched();
        metrics.record_recording_matched();
        metrics.record_recordings_unmapped(3);
        metrics.record_rematch_pass();
        metrics.record_status_transition("ready");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.recordings_matched_total, 2);
        assert_eq!(snapshot.recordings_unmapped_total, 3);
        assert_eq!(snapshot.rematch_passes_total, 1);
    }

    #[test]
    fn render_exposes_registered_collectors() {
        let metrics = Metrics::new().expect("metrics");
        metrics.record_status_transition("transcribed");
        let rendered = metrics.render().expect("render");
        assert!(rendered.contains("recordings_matched_total"));
        assert!(rendered.contains("status_transitions_total"));
    }
}
