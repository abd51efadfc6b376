//! API middleware

pub mod metrics;

pub use metrics::metrics_middleware;
