//! Prometheus metrics for the push receiver.
//!
//! All metrics follow the naming convention: `pg_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Crate-local metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Parsed push messages by message type
    pub static ref MESSAGES_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("pg_push_messages_received_total", "Push messages parsed successfully"),
        &["type"]  // type: Notification/SubscriptionConfirmation/UnsubscribeConfirmation
    ).expect("metric creation failed");

    /// Rejected push messages by public reason
    pub static ref MESSAGES_REJECTED: CounterVec = CounterVec::new(
        Opts::new("pg_push_messages_rejected_total", "Push messages rejected"),
        &["reason"]  // reason: invalid_body/invalid_topic/invalid_signature/invalid_subscribe_url
    ).expect("metric creation failed");

    /// Signing certificate retrievals by outcome
    pub static ref CERTIFICATE_FETCHES: CounterVec = CounterVec::new(
        Opts::new("pg_certificate_fetches_total", "Signing certificate retrievals"),
        &["outcome"]  // outcome: fetched/cached/untrusted/unreachable/malformed
    ).expect("metric creation failed");

    /// Subscription confirmation calls by outcome
    pub static ref SUBSCRIPTION_CONFIRMATIONS: CounterVec = CounterVec::new(
        Opts::new("pg_subscription_confirmations_total", "Subscription confirmation calls"),
        &["outcome"]  // outcome: confirmed/failed
    ).expect("metric creation failed");
}

/// Register all metrics with the crate registry.
///
/// Safe to call more than once; collectors that are already registered are
/// left in place.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(MESSAGES_RECEIVED.clone()),
        Box::new(MESSAGES_REJECTED.clone()),
        Box::new(CERTIFICATE_FETCHES.clone()),
        Box::new(SUBSCRIPTION_CONFIRMATIONS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
