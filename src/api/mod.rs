//! API layer
//!
//! HTTP handlers for:
//! - Blog pages (home, compose, posts)
//! - Metrics (Prometheus)

mod blog;
pub mod metrics;

pub use blog::blog_router;
pub use metrics::metrics_router;
