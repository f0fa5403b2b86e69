// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};

// --- Metric Statics ---
// The collectors are initialized exactly once by `install`. Until then every
// sink method is a no-op.

static ENTITIES_REGISTERED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static PROPOSALS_CREATED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static VOTES_CAST_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static PROPOSALS_FINALIZED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static DOMAIN_EVENTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static SVC_DISPATCH_LATENCY_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static SVC_DISPATCH_ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

/// The Prometheus-backed sink. Obtain it through [`install`].
#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Increments a labeled counter if it has been installed.
macro_rules! inc_counter {
    ($metric:ident, $labels:expr) => {
        if let Some(counter) = $metric.get() {
            counter.with_label_values($labels).inc();
        }
    };
}

impl GovernanceMetricsSink for PrometheusSink {
    fn inc_entities_registered(&self, kind: &str) {
        inc_counter!(ENTITIES_REGISTERED_TOTAL, &[kind]);
    }
    fn inc_proposals_created(&self, kind: &str) {
        inc_counter!(PROPOSALS_CREATED_TOTAL, &[kind]);
    }
    fn inc_votes_cast(&self, kind: &str, support: bool) {
        let side = if support { "for" } else { "against" };
        inc_counter!(VOTES_CAST_TOTAL, &[kind, side]);
    }
    fn inc_proposals_finalized(&self, kind: &str, outcome: &'static str) {
        inc_counter!(PROPOSALS_FINALIZED_TOTAL, &[kind, outcome]);
    }
    fn inc_domain_events(&self, event_kind: &str) {
        inc_counter!(DOMAIN_EVENTS_TOTAL, &[event_kind]);
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        inc_counter!(ERRORS_TOTAL, &[kind, variant]);
    }
}

impl ServiceMetricsSink for PrometheusSink {
    fn observe_service_dispatch_latency(&self, service_id: &str, method: &str, duration_secs: f64) {
        if let Some(histogram) = SVC_DISPATCH_LATENCY_SECONDS.get() {
            histogram
                .with_label_values(&[service_id, method])
                .observe(duration_secs);
        }
    }
    fn inc_dispatch_error(&self, service_id: &str, method: &str, reason: &'static str) {
        inc_counter!(SVC_DISPATCH_ERRORS_TOTAL, &[service_id, method, reason]);
    }
}

fn set_once<T>(cell: &OnceCell<T>, value: T) -> Result<(), prometheus::Error> {
    cell.set(value).map_err(|_| prometheus::Error::AlreadyReg)
}

/// Registers all collectors with the default Prometheus registry and returns a
/// static reference to the sink. A second call fails with `AlreadyReg`.
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    set_once(
        &ENTITIES_REGISTERED_TOTAL,
        register_int_counter_vec!(
            "qgov_entities_registered_total",
            "Total number of entities registered, by kind.",
            &["kind"]
        )?,
    )?;
    set_once(
        &PROPOSALS_CREATED_TOTAL,
        register_int_counter_vec!(
            "qgov_proposals_created_total",
            "Total number of proposals created, by entity kind.",
            &["kind"]
        )?,
    )?;
    set_once(
        &VOTES_CAST_TOTAL,
        register_int_counter_vec!(
            "qgov_votes_cast_total",
            "Total number of votes accepted, by entity kind and side.",
            &["kind", "side"]
        )?,
    )?;
    set_once(
        &PROPOSALS_FINALIZED_TOTAL,
        register_int_counter_vec!(
            "qgov_proposals_finalized_total",
            "Total number of proposals finalized, by entity kind and outcome.",
            &["kind", "outcome"]
        )?,
    )?;
    set_once(
        &DOMAIN_EVENTS_TOTAL,
        register_int_counter_vec!(
            "qgov_domain_events_total",
            "Total number of domain events recorded, by event kind.",
            &["event_kind"]
        )?,
    )?;
    set_once(
        &ERRORS_TOTAL,
        register_int_counter_vec!(
            "qgov_errors_total",
            "Total number of errors, categorized by type and variant.",
            &["kind", "variant"]
        )?,
    )?;
    set_once(
        &SVC_DISPATCH_LATENCY_SECONDS,
        register_histogram_vec!(
            "qgov_service_dispatch_latency_seconds",
            "Latency of dispatched registry calls.",
            &["service_id", "method"],
            exponential_buckets(0.00001, 2.0, 16)?
        )?,
    )?;
    set_once(
        &SVC_DISPATCH_ERRORS_TOTAL,
        register_int_counter_vec!(
            "qgov_service_dispatch_errors_total",
            "Total errors returned from registry dispatch calls.",
            &["service_id", "method", "reason"]
        )?,
    )?;

    static SINK: PrometheusSink = PrometheusSink;
    Ok(&SINK)
}

/// Renders every metric in the default registry in the Prometheus text format.
pub fn encode_text() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buf = Vec::new();
    encoder.encode(&metric_families, &mut buf)?;
    String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
