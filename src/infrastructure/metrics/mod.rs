//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, path, and status
//! - HTTP request latency histograms
//! - Messages distributed and mention notifications emitted
//! - Reaction toggles and optimistic-write conflicts
//! - Mentions transitioned to read, by source
//! - Notifications published and active WebSocket sessions

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

const NAMESPACE: &str = "chat_engine";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, path, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];
    HistogramVec::new(
        HistogramOpts::new("http_request_duration_seconds", "HTTP request latency in seconds")
            .namespace(NAMESPACE)
            .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Messages persisted and fanned out, by target kind
pub static MESSAGES_DISTRIBUTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("messages_distributed_total", "Messages persisted and distributed").namespace(NAMESPACE),
        &["kind"], // "channel", "direct"
    )
    .expect("Failed to create MESSAGES_DISTRIBUTED_TOTAL metric")
});

/// Mention notifications emitted, by target kind
pub static MENTIONS_EMITTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mentions_emitted_total", "Mention notifications emitted").namespace(NAMESPACE),
        &["kind"],
    )
    .expect("Failed to create MENTIONS_EMITTED_TOTAL metric")
});

/// Reaction toggles, by outcome
pub static REACTION_TOGGLES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reaction_toggles_total", "Reaction toggles applied").namespace(NAMESPACE),
        &["outcome"], // "added", "removed"
    )
    .expect("Failed to create REACTION_TOGGLES_TOTAL metric")
});

/// Lost optimistic reaction writes
pub static REACTION_CONFLICTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("reaction_conflicts_total", "Reaction writes that lost a version race").namespace(NAMESPACE),
    )
    .expect("Failed to create REACTION_CONFLICTS_TOTAL metric")
});

/// Mentions flipped to read, by source
pub static MENTIONS_MARKED_READ_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mentions_marked_read_total", "Mentions transitioned to read").namespace(NAMESPACE),
        &["source"], // "view", "bulk"
    )
    .expect("Failed to create MENTIONS_MARKED_READ_TOTAL metric")
});

/// Notifications handed to the sink, by event and audience
pub static NOTIFICATIONS_PUBLISHED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("notifications_published_total", "Notifications published to the gateway").namespace(NAMESPACE),
        &["event", "audience"], // audience: "everyone", "user"
    )
    .expect("Failed to create NOTIFICATIONS_PUBLISHED_TOTAL metric")
});

/// Active WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<GaugeVec> = Lazy::new(|| {
    GaugeVec::new(
        Opts::new("websocket_connections_active", "Number of active WebSocket connections").namespace(NAMESPACE),
        &["state"], // "connected", "authenticated"
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(MESSAGES_DISTRIBUTED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_DISTRIBUTED_TOTAL");
    registry
        .register(Box::new(MENTIONS_EMITTED_TOTAL.clone()))
        .expect("Failed to register MENTIONS_EMITTED_TOTAL");
    registry
        .register(Box::new(REACTION_TOGGLES_TOTAL.clone()))
        .expect("Failed to register REACTION_TOGGLES_TOTAL");
    registry
        .register(Box::new(REACTION_CONFLICTS_TOTAL.clone()))
        .expect("Failed to register REACTION_CONFLICTS_TOTAL");
    registry
        .register(Box::new(MENTIONS_MARKED_READ_TOTAL.clone()))
        .expect("Failed to register MENTIONS_MARKED_READ_TOTAL");
    registry
        .register(Box::new(NOTIFICATIONS_PUBLISHED_TOTAL.clone()))
        .expect("Failed to register NOTIFICATIONS_PUBLISHED_TOTAL");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

/// Helper to record one distributed message and its mention fan-out
pub fn record_message_distributed(kind: &str, mentions: usize) {
    MESSAGES_DISTRIBUTED_TOTAL.with_label_values(&[kind]).inc();
    MENTIONS_EMITTED_TOTAL
        .with_label_values(&[kind])
        .inc_by(mentions as u64);
}

pub fn record_reaction_toggle(outcome: &str) {
    REACTION_TOGGLES_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_reaction_conflict() {
    REACTION_CONFLICTS_TOTAL.inc();
}

pub fn record_mentions_marked_read(source: &str, count: u64) {
    MENTIONS_MARKED_READ_TOTAL
        .with_label_values(&[source])
        .inc_by(count);
}

pub fn record_notification_published(event: &str, audience: &str) {
    NOTIFICATIONS_PUBLISHED_TOTAL
        .with_label_values(&[event, audience])
        .inc();
}

/// Helper to update WebSocket connection count
pub fn set_websocket_connections(connected: i64, authenticated: i64) {
    WEBSOCKET_CONNECTIONS_ACTIVE
        .with_label_values(&["connected"])
        .set(connected as f64);
    WEBSOCKET_CONNECTIONS_ACTIVE
        .with_label_values(&["authenticated"])
        .set(authenticated as f64);
}
