//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_answer, record_entries_added,
    record_entry_deleted, record_generation, record_http_request, record_orphan_skipped,
    PrometheusMetrics,
};
