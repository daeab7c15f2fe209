//! Observability: tracing and Prometheus metrics.

pub mod metrics;
pub mod tracing;

pub use metrics::{
    record_asset_sync, record_auth_attempt, AuthOutcome, MetricsState, SyncOutcomeLabel,
};
pub use tracing::init_telemetry;
