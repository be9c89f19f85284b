//! Prometheus metrics
//!
//! Exposes metrics for:
//! - Proposals created and stored
//! - Typed-data signatures produced, by primary type
//! - Signing failures
//! - Proposal cache size
//!
//! Serving them is left to the embedding process; [`render`] produces the
//! text exposition format.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, CounterVec, Encoder, Gauge,
    IntCounter, TextEncoder,
};
use tracing::warn;

lazy_static! {
    // Proposal metrics
    pub static ref PROPOSALS_CREATED: IntCounter = register_int_counter!(
        "erc8001_proposals_created_total",
        "Total swap proposals created and signed locally"
    ).unwrap();

    pub static ref PROPOSALS_STORED: CounterVec = register_counter_vec!(
        "erc8001_proposals_stored_total",
        "Total proposals received from other parties",
        &["verified"]
    ).unwrap();

    pub static ref CACHED_PROPOSALS: Gauge = register_gauge!(
        "erc8001_cached_proposals",
        "Proposals held across every client's local cache"
    ).unwrap();

    // Signing metrics
    pub static ref SIGNATURES: CounterVec = register_counter_vec!(
        "erc8001_signatures_total",
        "Total typed-data signatures produced",
        &["primary_type"]
    ).unwrap();

    pub static ref SIGNING_FAILURES: CounterVec = register_counter_vec!(
        "erc8001_signing_failures_total",
        "Total typed-data signing failures",
        &["primary_type"]
    ).unwrap();
}

pub fn record_signature(primary_type: &str) {
    SIGNATURES.with_label_values(&[primary_type]).inc();
}

pub fn record_signing_failure(primary_type: &str) {
    SIGNING_FAILURES.with_label_values(&[primary_type]).inc();
}

/// `new_entry` is false when the proposal replaced one already cached
pub fn record_proposal_created(new_entry: bool) {
    PROPOSALS_CREATED.inc();
    record_cache_insert(new_entry);
}

pub fn record_proposal_stored(verified: bool, new_entry: bool) {
    PROPOSALS_STORED
        .with_label_values(&[if verified { "true" } else { "false" }])
        .inc();
    record_cache_insert(new_entry);
}

fn record_cache_insert(new_entry: bool) {
    if new_entry {
        CACHED_PROPOSALS.inc();
    }
}

/// Text exposition of every registered metric
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
