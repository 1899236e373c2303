//! Prometheus metrics for a deploy/test run
//!
//! - Step results by outcome and step duration
//! - Deployment phase durations
//! - Attempts consumed by each polling loop
//!
//! A run is a one-shot process, so nothing is served over HTTP; the text
//! exposition is written to a file for the node-exporter textfile collector.

use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::path::Path;

/// Run metrics registry
///
/// Clone is cheap (metric handles are reference counted).
#[derive(Clone)]
pub struct RunMetrics {
    registry: Registry,
    /// Assertion steps by outcome (passed, failed, errored)
    pub steps_total: IntCounterVec,
    /// Step duration in seconds
    pub step_duration_seconds: HistogramVec,
    /// Deployment phase duration in seconds
    pub deploy_phase_duration_seconds: HistogramVec,
    /// Attempts used by the last run of each poller
    pub poll_attempts: IntGaugeVec,
}

impl RunMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let steps_total = IntCounterVec::new(
            Opts::new(
                "storefront_steps_total",
                "Total number of API assertion steps by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(steps_total.clone()))?;

        let step_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "storefront_step_duration_seconds",
                "Duration of an API assertion step in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["step"],
        )?;
        registry.register(Box::new(step_duration_seconds.clone()))?;

        let deploy_phase_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "storefront_deploy_phase_duration_seconds",
                "Duration of a deployment phase in seconds",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
            &["phase"],
        )?;
        registry.register(Box::new(deploy_phase_duration_seconds.clone()))?;

        let poll_attempts = IntGaugeVec::new(
            Opts::new(
                "storefront_poll_attempts",
                "Attempts consumed by the most recent polling loop",
            ),
            &["poller"],
        )?;
        registry.register(Box::new(poll_attempts.clone()))?;

        Ok(Self {
            registry,
            steps_total,
            step_duration_seconds,
            deploy_phase_duration_seconds,
            poll_attempts,
        })
    }

    pub fn record_step(&self, step: &str, outcome: &str, duration_secs: f64) {
        self.steps_total.with_label_values(&[outcome]).inc();
        self.step_duration_seconds
            .with_label_values(&[step])
            .observe(duration_secs);
    }

    pub fn record_phase(&self, phase: &str, duration_secs: f64) {
        self.deploy_phase_duration_seconds
            .with_label_values(&[phase])
            .observe(duration_secs);
    }

    pub fn set_poll_attempts(&self, poller: &str, attempts: u32) {
        self.poll_attempts
            .with_label_values(&[poller])
            .set(i64::from(attempts));
    }

    /// Encode all metrics to Prometheus text format
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!("Failed to encode metrics as UTF-8: {}", e))
        })
    }

    /// Write the text exposition to `path`
    ///
    /// The body goes to a sibling `.prom.tmp` file first and is renamed into
    /// place, so the textfile collector never reads a partial file.
    pub fn write_textfile(&self, path: &Path) -> Result<(), prometheus::Error> {
        let body = self.encode()?;
        let staging = path.with_extension("prom.tmp");
        std::fs::write(&staging, body).map_err(prometheus::Error::Io)?;
        std::fs::rename(&staging, path).map_err(prometheus::Error::Io)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
#[path = "metrics_test.rs"]
mod tests;
