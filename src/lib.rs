//! Cohort Flux - Batch compute engine for per-individual group and community metrics
//!
//! Flux reads a longitudinal panel of observations (who was in which group,
//! carrying which community color, at each time step) and computes one row of
//! behavioral metrics per individual through a deterministic pipeline:
//! record ingestion → shared indexes → metric columns → assembled report.
//!
//! ## Metrics
//!
//! absenteeism, inquisitiveness, community_stay, avg_num_peers, peer_synchrony,
//! group_size, group_homogeneity, individual_apparency, cyclicity, community_size

pub mod config;
pub mod encoder;
pub mod error;
pub mod index;
pub mod metrics;
pub mod pipeline;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{ColumnMap, MetricsConfig, NullCommunityPolicy};
pub use encoder::{MetricsEncoder, MetricsReport};
pub use error::ComputeError;
pub use index::PanelIndex;
pub use metrics::MetricColumn;
pub use pipeline::{compute_individual_metrics, records_to_metrics, MetricsProcessor};
pub use types::{IndividualMetrics, Label, MetricsTable, Observation, ObservationTable};

// Schema exports
pub use schema::{RecordAdapter, SCHEMA_VERSION};

/// Cohort Flux version embedded in all reports
pub const COHORT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "cohort-flux";
