//! Metrics pipeline orchestration
//!
//! This module provides the public API for a metrics run. It orchestrates the
//! full pipeline from observation records to the encoded per-individual report:
//! records → observation table → shared indexes → metric columns → assembled rows.

use log::{debug, info};
use rayon::prelude::*;

use crate::config::MetricsConfig;
use crate::encoder::MetricsEncoder;
use crate::error::ComputeError;
use crate::index::PanelIndex;
use crate::metrics::{ColumnValues, MetricColumn};
use crate::schema::RecordAdapter;
use crate::types::{IndividualMetrics, MetricsTable, ObservationTable, PanelSummary};

/// Compute all metrics for a table with the default configuration.
pub fn compute_individual_metrics(table: &ObservationTable) -> Result<MetricsTable, ComputeError> {
    MetricsProcessor::new().compute(table)
}

/// Convert a JSON array of observation records to report JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report_json = records_to_metrics(records_json)?;
/// ```
pub fn records_to_metrics(records_json: String) -> Result<String, ComputeError> {
    MetricsProcessor::new().process_json(&records_json)
}

/// Configured metrics processor.
///
/// The processor holds no per-run state: computing the same table twice gives
/// identical results.
pub struct MetricsProcessor {
    config: MetricsConfig,
    encoder: MetricsEncoder,
}

impl Default for MetricsProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProcessor {
    /// Create a processor with default settings
    pub fn new() -> Self {
        Self::with_config(MetricsConfig::default())
    }

    /// Create a processor with a specific configuration
    pub fn with_config(config: MetricsConfig) -> Self {
        Self {
            config,
            encoder: MetricsEncoder::new(),
        }
    }

    /// Replace the report encoder
    pub fn with_encoder(mut self, encoder: MetricsEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Compute all ten metrics for every individual in the table
    pub fn compute(&self, table: &ObservationTable) -> Result<MetricsTable, ComputeError> {
        // Stage 1: Build shared indexes
        let index = PanelIndex::build(table);
        let summary = PanelSummary {
            observations: table.len(),
            individuals: index.individuals.len(),
            time_steps: index.time_ranks.len(),
            subgroups: index.subgroups.len(),
        };
        debug!(
            "indexed {} observations: {} individuals, {} time steps, {} subgroups",
            summary.observations, summary.individuals, summary.time_steps, summary.subgroups
        );

        // Stage 2: Evaluate metric columns
        let policy = self.config.null_community;
        let evaluate = |column: &MetricColumn| {
            debug!("evaluating {}", column.name());
            column.evaluate(&index, policy).map(|values| (*column, values))
        };
        let columns: Vec<(MetricColumn, ColumnValues)> = if self.config.parallel {
            MetricColumn::ALL
                .par_iter()
                .map(evaluate)
                .collect::<Result<_, _>>()?
        } else {
            MetricColumn::ALL
                .iter()
                .map(evaluate)
                .collect::<Result<_, _>>()?
        };

        // Stage 3: Assemble rows
        let rows = assemble(&index, &columns)?;
        info!(
            "computed {} metrics for {} individuals",
            columns.len(),
            rows.len()
        );

        Ok(MetricsTable { summary, rows })
    }

    /// Parse a JSON array of records, compute metrics and return report JSON
    pub fn process_json(&self, records_json: &str) -> Result<String, ComputeError> {
        let records = RecordAdapter::parse_array(records_json)?;
        self.process_records(&records)
    }

    /// Parse NDJSON records, compute metrics and return report JSON
    pub fn process_ndjson(&self, records_ndjson: &str) -> Result<String, ComputeError> {
        let records = RecordAdapter::parse_ndjson(records_ndjson)?;
        self.process_records(&records)
    }

    fn process_records(&self, records: &[serde_json::Value]) -> Result<String, ComputeError> {
        let table = RecordAdapter::to_table(records, &self.config.columns)?;
        let metrics = self.compute(&table)?;
        self.encoder.encode_to_json(&metrics)
    }
}

/// Join the individual identities with the metric columns
fn assemble(
    index: &PanelIndex<'_>,
    columns: &[(MetricColumn, ColumnValues)],
) -> Result<Vec<IndividualMetrics>, ComputeError> {
    let expected = index.individuals.len();
    for (column, values) in columns {
        if values.len() != expected {
            return Err(ComputeError::ColumnLengthMismatch {
                column: column.name(),
                expected,
                actual: values.len(),
            });
        }
    }

    let value = |wanted: MetricColumn| {
        columns
            .iter()
            .find(|(column, _)| *column == wanted)
            .map(|(_, values)| values)
            .ok_or(ComputeError::ColumnLengthMismatch {
                column: wanted.name(),
                expected,
                actual: 0,
            })
    };
    let absenteeism = value(MetricColumn::Absenteeism)?;
    let inquisitiveness = value(MetricColumn::Inquisitiveness)?;
    let community_stay = value(MetricColumn::CommunityStay)?;
    let avg_num_peers = value(MetricColumn::AvgNumPeers)?;
    let peer_synchrony = value(MetricColumn::PeerSynchrony)?;
    let group_size = value(MetricColumn::GroupSize)?;
    let group_homogeneity = value(MetricColumn::GroupHomogeneity)?;
    let individual_apparency = value(MetricColumn::IndividualApparency)?;
    let cyclicity = value(MetricColumn::Cyclicity)?.counts().ok_or(
        ComputeError::ColumnTypeMismatch {
            column: MetricColumn::Cyclicity.name(),
        },
    )?;
    let community_size = value(MetricColumn::CommunitySize)?;

    Ok(index
        .individuals
        .individuals()
        .iter()
        .enumerate()
        .map(|(i, individual)| IndividualMetrics {
            individual: (*individual).clone(),
            absenteeism: absenteeism.float(i),
            inquisitiveness: inquisitiveness.float(i),
            community_stay: community_stay.float(i),
            avg_num_peers: avg_num_peers.float(i),
            peer_synchrony: peer_synchrony.float(i),
            group_size: group_size.float(i),
            group_homogeneity: group_homogeneity.float(i),
            individual_apparency: individual_apparency.float(i),
            cyclicity: cyclicity[i],
            community_size: community_size.float(i),
        })
        .collect())
}
