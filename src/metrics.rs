// SPDX-License-Identifier: MIT

//! Prometheus metrics for the operator, namespaced `clusterextension_io_*`.
//!
//! # Metrics
//!
//! - **Reconciliation metrics** — count and duration per controller/outcome.
//! - **Requeue metrics** — count of requeues by reason.

use std::sync::LazyLock;
use std::time::Duration;

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};

/// Namespace prefix for all metrics (prometheus-safe).
const METRICS_NAMESPACE: &str = "clusterextension_io";

/// Global Prometheus registry. All metrics below are registered here and
/// exposed via the `/metrics` HTTP route.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total reconciliations by controller and outcome.
///
/// Labels: `controller` (`clusterextension`, `clusterextensionrevision`,
/// `catalog_cache`), `outcome` (`success`, `error`, `requeue`).
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by controller and outcome",
    );
    let counter = CounterVec::new(opts, &["controller", "outcome"]).expect("valid metric opts");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric not already registered");
    counter
});

/// Duration of reconciliations in seconds, by controller.
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by controller",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["controller"]).expect("valid metric opts");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric not already registered");
    histogram
});

/// Total requeues by controller and reason.
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_requeues_total"),
        "Total number of requeues by controller and reason",
    );
    let counter = CounterVec::new(opts, &["controller", "reason"]).expect("valid metric opts");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric not already registered");
    counter
});

/// Thin, cloneable handle onto the metrics recorded for a reconcile.
#[derive(Clone, Copy, Debug, Default)]
pub struct Metrics;

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn record_reconciliation(&self, controller: &str, outcome: &str, duration: Duration) {
        RECONCILIATION_TOTAL.with_label_values(&[controller, outcome]).inc();
        RECONCILIATION_DURATION_SECONDS
            .with_label_values(&[controller])
            .observe(duration.as_secs_f64());
    }

    pub fn record_requeue(&self, controller: &str, reason: &str) {
        REQUEUE_TOTAL.with_label_values(&[controller, reason]).inc();
    }
}

/// Renders the registry in the Prometheus text exposition format.
pub fn render() -> Result<String, prometheus::Error> {
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
