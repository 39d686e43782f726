//! Metrics report encoder
//!
//! Encodes a computed [`MetricsTable`] into the JSON report payload, or into
//! NDJSON rows for line-oriented consumers.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ComputeError;
use crate::types::{IndividualMetrics, MetricsTable, PanelSummary, METRIC_COLUMNS};
use crate::{COHORT_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_VERSION: &str = "cohort.metrics.v1";

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    /// Name of the producing software
    pub name: String,
    /// Version of the producing software
    pub version: String,
    /// Unique instance identifier (UUID)
    pub instance_id: String,
}

/// Per-individual metrics report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Report schema version
    pub report_version: String,
    /// Producer metadata
    pub producer: ReportProducer,
    /// When the report was computed (RFC3339)
    pub computed_at_utc: String,
    /// Panel sizes
    pub summary: PanelSummary,
    /// Row column names, in order
    pub columns: Vec<String>,
    /// One row per individual, first-appearance order
    pub rows: Vec<IndividualMetrics>,
}

/// Metrics report encoder
pub struct MetricsEncoder {
    instance_id: String,
}

impl Default for MetricsEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a metrics table into a report
    pub fn encode(&self, metrics: &MetricsTable) -> MetricsReport {
        MetricsReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: COHORT_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            summary: metrics.summary,
            columns: METRIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: metrics.rows.clone(),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(&self, metrics: &MetricsTable) -> Result<String, ComputeError> {
        let report = self.encode(metrics);
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }

    /// Encode rows as NDJSON, one individual per line
    pub fn encode_rows_ndjson(metrics: &MetricsTable) -> Result<String, ComputeError> {
        let mut lines = Vec::with_capacity(metrics.rows.len());
        for row in &metrics.rows {
            let line = serde_json::to_string(row)
                .map_err(|e| ComputeError::EncodingError(e.to_string()))?;
            lines.push(line);
        }
        if lines.is_empty() {
            return Ok(String::new());
        }
        Ok(lines.join("\n") + "\n")
    }
}
