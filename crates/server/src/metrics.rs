//! Prometheus metrics for the jukebox services.
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus scraping.
//! It should only be reachable from the scraper's network.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Resource metrics
pub static RESOURCES_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "jukebox_resources_uploaded_total",
        "Total number of resources stored together with their metadata",
    )
    .expect("metric creation failed")
});

pub static UPLOADS_REJECTED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "jukebox_uploads_rejected_total",
        "Total number of uploads rejected because the payload is not MPEG audio",
    )
    .expect("metric creation failed")
});

pub static UPLOAD_COMPENSATIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jukebox_upload_compensations_total",
            "Blob deletions after a failed metadata create, by result",
        ),
        &["result"],
    )
    .expect("metric creation failed")
});

pub static RESOURCES_DELETED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "jukebox_resources_deleted_total",
        "Total number of resources deleted",
    )
    .expect("metric creation failed")
});

pub static UPLOAD_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "jukebox_upload_duration_seconds",
            "Time taken to store a resource and its metadata",
        )
        .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
    )
    .expect("metric creation failed")
});

// Song service metrics
pub static SONG_SERVICE_ERRORS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jukebox_song_service_errors_total",
            "Failed song service calls by outcome",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

// Reconciliation metrics
pub static RECONCILE_PENDING: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "jukebox_reconcile_pending",
        "Resources waiting for their metadata outcome to be settled",
    )
    .expect("metric creation failed")
});

pub static RECONCILE_OUTCOMES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jukebox_reconcile_outcomes_total",
            "Reconciliation attempts by outcome",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent, so integration tests can build many routers.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(RESOURCES_UPLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOADS_REJECTED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_COMPENSATIONS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(RESOURCES_DELETED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_DURATION.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(SONG_SERVICE_ERRORS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(RECONCILE_PENDING.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(RECONCILE_OUTCOMES.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Helper to record compensating blob deletions by result.
pub fn record_compensation(result: &str) {
    UPLOAD_COMPENSATIONS.with_label_values(&[result]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        register_metrics();
        register_metrics();
        RESOURCES_UPLOADED.inc();

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&REGISTRY.gather(), &mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("jukebox_resources_uploaded_total"));
    }
}
