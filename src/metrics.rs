//! Prometheus metrics for HTTP traffic and dependency checks.
//!
//! This module provides:
//! - Request counts by path, method and status code
//! - Request latency histograms by path and method
//! - Dependency probe outcomes
//!
//! The recorder is owned by a [`MetricsCollector`] instead of being installed
//! globally, so every server (and every test) gets its own registry.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use metrics::{Key, KeyName, Label, Level, Metadata, Recorder, SharedString, Unit};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::probe::DependencyStatus;

// === Metric Name Constants ===

/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";
/// HTTP request duration metric name.
pub const METRIC_HTTP_REQUEST_DURATION: &str = "http_request_duration_seconds";
/// Dependency probe counter metric name.
pub const METRIC_DEPENDENCY_PROBES: &str = "dependency_probes_total";

/// Histogram buckets for request duration, in seconds.
pub const DURATION_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// How often buffered histogram samples are folded into the registry.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Content type of the text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Dimensions of one finished request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLabels {
    /// Matched route, or a fixed placeholder for unmatched requests.
    pub path: String,
    /// HTTP method.
    pub method: String,
    /// Status code written to the client.
    pub status: u16,
}

/// Thread-safe metrics registry shared by all request handlers.
///
/// Cloning is cheap; all clones record into the same registry.
#[derive(Clone)]
pub struct MetricsCollector {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsCollector").finish_non_exhaustive()
    }
}

impl MetricsCollector {
    /// Build a fresh registry with all metric descriptions registered.
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(METRIC_HTTP_REQUEST_DURATION.to_string()),
                &DURATION_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        let collector = Self {
            recorder: Arc::new(recorder),
            handle,
        };
        collector.describe();

        debug!("Metrics initialized");
        Ok(collector)
    }

    fn describe(&self) {
        self.recorder.describe_counter(
            KeyName::from_const_str(METRIC_HTTP_REQUESTS),
            None,
            SharedString::const_str("Total number of HTTP requests"),
        );
        self.recorder.describe_histogram(
            KeyName::from_const_str(METRIC_HTTP_REQUEST_DURATION),
            Some(Unit::Seconds),
            SharedString::const_str("HTTP request latency in seconds"),
        );
        self.recorder.describe_counter(
            KeyName::from_const_str(METRIC_DEPENDENCY_PROBES),
            None,
            SharedString::const_str("Total number of dependency probes by outcome"),
        );
    }

    /// Record one finished request: bump its counter and observe its latency.
    pub fn record_request(&self, labels: &RequestLabels, elapsed: Duration) {
        let path = Label::new("path", labels.path.clone());
        let method = Label::new("method", labels.method.clone());

        let counter_key = Key::from_parts(
            METRIC_HTTP_REQUESTS,
            vec![
                path.clone(),
                method.clone(),
                Label::new("status", labels.status.to_string()),
            ],
        );
        self.recorder
            .register_counter(&counter_key, &METADATA)
            .increment(1);

        let histogram_key = Key::from_parts(METRIC_HTTP_REQUEST_DURATION, vec![path, method]);
        self.recorder
            .register_histogram(&histogram_key, &METADATA)
            .record(elapsed.as_secs_f64());
    }

    /// Record the outcome of a dependency probe.
    pub fn record_probe(&self, status: &DependencyStatus) {
        let key = Key::from_parts(
            METRIC_DEPENDENCY_PROBES,
            vec![Label::new("outcome", status.label())],
        );
        self.recorder.register_counter(&key, &METADATA).increment(1);
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Fold buffered histogram samples into their distributions.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }

    /// Run [`Self::run_upkeep`] every `period` until the task is aborted.
    ///
    /// The recorder is not installed globally, so nothing else drains
    /// histogram samples between scrapes.
    pub fn spawn_upkeep(&self, period: Duration) -> JoinHandle<()> {
        let collector = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                collector.run_upkeep();
            }
        })
    }
}

/// Look up one sample in a text exposition.
///
/// Returns the value of the first series called `name` whose label set
/// contains every `(label, value)` pair given.
pub fn find_sample(exposition: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    exposition
        .lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            let (metric, label_set) = match series.split_once('{') {
                Some((metric, rest)) => (metric, rest.trim_end_matches('}')),
                None => (series, ""),
            };
            if metric != name {
                return None;
            }

            let all_match = labels.iter().all(|(key, expected)| {
                let wanted = format!("{key}=\"{expected}\"");
                label_set.split(',').any(|pair| pair == wanted)
            });
            if !all_match {
                return None;
            }

            value.parse().ok()
        })
}
