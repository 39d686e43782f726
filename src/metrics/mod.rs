//! Per-individual metric algorithms
//!
//! Each metric is a pure function of the shared [`PanelIndex`] and yields
//! exactly one value per individual, in first-appearance order.
//!
//! Null handling differs per metric and is part of each metric's contract:
//!
//! | metric | rows considered |
//! |---|---|
//! | absenteeism | all rows (denominator) |
//! | inquisitiveness | rows with `icolor` |
//! | community_stay, cyclicity | all rows, nulls break runs |
//! | avg_num_peers | rows with `group` and `icolor` |
//! | peer_synchrony | all adjacent pairs, incomplete pairs count as 0.0 |
//! | group_size | rows with `group` |
//! | group_homogeneity | rows with `group`, `gcolor` and `icolor` |
//! | individual_apparency | distinct non-null `icolor` values |
//! | community_size | all rows, null `icolor` per [`NullCommunityPolicy`] |

mod groups;
mod peers;
mod presence;
mod stability;
pub mod util;

pub use groups::{community_size, group_homogeneity, group_size};
pub use peers::{avg_num_peers, peer_synchrony};
pub use presence::{absenteeism, inquisitiveness};
pub use stability::{community_stay, cyclicity, individual_apparency};

use serde::{Deserialize, Serialize};

use crate::config::NullCommunityPolicy;
use crate::error::ComputeError;
use crate::index::PanelIndex;

/// The ten metric columns, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricColumn {
    Absenteeism,
    Inquisitiveness,
    CommunityStay,
    AvgNumPeers,
    PeerSynchrony,
    GroupSize,
    GroupHomogeneity,
    IndividualApparency,
    Cyclicity,
    CommunitySize,
}

impl MetricColumn {
    pub const ALL: [MetricColumn; 10] = [
        MetricColumn::Absenteeism,
        MetricColumn::Inquisitiveness,
        MetricColumn::CommunityStay,
        MetricColumn::AvgNumPeers,
        MetricColumn::PeerSynchrony,
        MetricColumn::GroupSize,
        MetricColumn::GroupHomogeneity,
        MetricColumn::IndividualApparency,
        MetricColumn::Cyclicity,
        MetricColumn::CommunitySize,
    ];

    /// Output column name
    pub fn name(self) -> &'static str {
        match self {
            MetricColumn::Absenteeism => "absenteeism",
            MetricColumn::Inquisitiveness => "inquisitiveness",
            MetricColumn::CommunityStay => "community_stay",
            MetricColumn::AvgNumPeers => "avg_num_peers",
            MetricColumn::PeerSynchrony => "peer_synchrony",
            MetricColumn::GroupSize => "group_size",
            MetricColumn::GroupHomogeneity => "group_homogeneity",
            MetricColumn::IndividualApparency => "individual_apparency",
            MetricColumn::Cyclicity => "cyclicity",
            MetricColumn::CommunitySize => "community_size",
        }
    }

    /// Compute this column for every individual
    pub fn evaluate(
        self,
        index: &PanelIndex<'_>,
        policy: NullCommunityPolicy,
    ) -> Result<ColumnValues, ComputeError> {
        let values = match self {
            MetricColumn::Absenteeism => ColumnValues::Ratio(absenteeism(index)),
            MetricColumn::Inquisitiveness => ColumnValues::Ratio(inquisitiveness(index)),
            MetricColumn::CommunityStay => ColumnValues::Ratio(community_stay(index)),
            MetricColumn::AvgNumPeers => ColumnValues::Ratio(avg_num_peers(index)),
            MetricColumn::PeerSynchrony => ColumnValues::Ratio(peer_synchrony(index)),
            MetricColumn::GroupSize => ColumnValues::Ratio(group_size(index)),
            MetricColumn::GroupHomogeneity => ColumnValues::Ratio(group_homogeneity(index)),
            MetricColumn::IndividualApparency => ColumnValues::Ratio(individual_apparency(index)),
            MetricColumn::Cyclicity => ColumnValues::Count(cyclicity(index)),
            MetricColumn::CommunitySize => ColumnValues::Ratio(community_size(index, policy)?),
        };
        Ok(values)
    }
}

/// Values of one metric column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Ratio(Vec<f64>),
    Count(Vec<u32>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Ratio(values) => values.len(),
            ColumnValues::Count(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of the i-th individual as a float
    pub fn float(&self, i: usize) -> f64 {
        match self {
            ColumnValues::Ratio(values) => values[i],
            ColumnValues::Count(values) => values[i] as f64,
        }
    }

    /// The column's values when it holds counts
    pub fn counts(&self) -> Option<&[u32]> {
        match self {
            ColumnValues::Ratio(_) => None,
            ColumnValues::Count(values) => Some(values.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Observation, ObservationTable};

    #[test]
    fn test_column_names_match_output_order() {
        let names: Vec<&str> = MetricColumn::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, crate::types::METRIC_COLUMNS[1..].to_vec());
    }

    #[test]
    fn test_every_column_has_one_value_per_individual() {
        let table = ObservationTable::new(vec![
            Observation::new(1, "A", "x", "red", "red"),
            Observation::ungrouped(1, "y", None),
            Observation::new(2, "A", "x", "red", "blue"),
            Observation::new(2, "B", "z", "blue", "blue"),
        ]);
        let index = PanelIndex::build(&table);

        for column in MetricColumn::ALL {
            let values = column.evaluate(&index, NullCommunityPolicy::Skip).unwrap();
            assert_eq!(values.len(), 3, "column {}", column.name());
        }
    }

    #[test]
    fn test_empty_table_yields_empty_columns() {
        let table = ObservationTable::default();
        let index = PanelIndex::build(&table);

        for column in MetricColumn::ALL {
            let values = column.evaluate(&index, NullCommunityPolicy::Reject).unwrap();
            assert!(values.is_empty());
        }
    }

    #[test]
    fn test_only_count_columns_expose_counts() {
        let counts = ColumnValues::Count(vec![2, 0]);
        assert_eq!(counts.counts(), Some(&[2, 0][..]));
        assert_eq!(counts.float(0), 2.0);

        let ratios = ColumnValues::Ratio(vec![1.5]);
        assert_eq!(ratios.counts(), None);
    }

    #[test]
    fn test_column_serialization() {
        let json = serde_json::to_string(&MetricColumn::AvgNumPeers).unwrap();
        assert_eq!(json, "\"avg_num_peers\"");
    }
}
