//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Authentication Metrics
    pub static ref LOGIN_ATTEMPTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("quill_login_attempts_total", "Total number of sign-in attempts"),
        &["method", "outcome"]
    ).expect("metric can be created");
    pub static ref REGISTRATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("quill_registrations_total", "Total number of local registrations"),
        &["outcome"]
    ).expect("metric can be created");
    pub static ref FEDERATED_USERS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "quill_federated_users_created_total",
        "Total number of users created from a Google identity"
    ).expect("metric can be created");
    pub static ref SESSIONS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "quill_sessions_created_total",
        "Total number of sessions issued"
    ).expect("metric can be created");

    // Content Metrics
    pub static ref POSTS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "quill_posts_created_total",
        "Total number of posts composed"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("quill_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Record the outcome of a sign-in attempt.
pub fn observe_login(method: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    LOGIN_ATTEMPTS_TOTAL
        .with_label_values(&[method, outcome])
        .inc();
}

/// Initialize metrics registry.
///
/// Safe to call more than once; later calls leave the registry unchanged.
pub fn init_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(LOGIN_ATTEMPTS_TOTAL.clone()),
        Box::new(REGISTRATIONS_TOTAL.clone()),
        Box::new(FEDERATED_USERS_CREATED_TOTAL.clone()),
        Box::new(SESSIONS_CREATED_TOTAL.clone()),
        Box::new(POSTS_CREATED_TOTAL.clone()),
        Box::new(ERRORS_TOTAL.clone()),
    ];

    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(error) => tracing::warn!(%error, "Failed to register metric"),
        }
    }

    tracing::info!("Metrics registry initialized");
}
