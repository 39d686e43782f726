//! Core data types
//!
//! This module defines the observation table that flows into a metrics run and
//! the per-individual rows that come out of it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Output column order: identity first, then the ten metrics.
pub const METRIC_COLUMNS: [&str; 11] = [
    "individual",
    "absenteeism",
    "inquisitiveness",
    "community_stay",
    "avg_num_peers",
    "peer_synchrony",
    "group_size",
    "group_homogeneity",
    "individual_apparency",
    "cyclicity",
    "community_size",
];

/// Identifier used for time steps, groups, individuals and community colors.
///
/// Labels are compared by value only; time labels are never re-sorted, their
/// first-occurrence order in the table is what defines elapsed duration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Text(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(value) => write!(f, "{value}"),
            Label::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Text(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Text(value)
    }
}

/// One (individual, time) sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Time step
    pub time: Label,
    /// Group occupied at this time, if any
    pub group: Option<Label>,
    /// Tracked individual
    pub individual: Label,
    /// Dominant community color of the occupied group
    pub gcolor: Option<Label>,
    /// The individual's own community color at this time
    pub icolor: Option<Label>,
}

impl Observation {
    /// Create an observation with every optional field present
    pub fn new(
        time: impl Into<Label>,
        group: impl Into<Label>,
        individual: impl Into<Label>,
        gcolor: impl Into<Label>,
        icolor: impl Into<Label>,
    ) -> Self {
        Self {
            time: time.into(),
            group: Some(group.into()),
            individual: individual.into(),
            gcolor: Some(gcolor.into()),
            icolor: Some(icolor.into()),
        }
    }

    /// Create an observation of an individual outside any group
    pub fn ungrouped(
        time: impl Into<Label>,
        individual: impl Into<Label>,
        icolor: Option<Label>,
    ) -> Self {
        Self {
            time: time.into(),
            group: None,
            individual: individual.into(),
            gcolor: None,
            icolor,
        }
    }

    /// Replace the individual's community color
    pub fn with_icolor(mut self, icolor: Option<Label>) -> Self {
        self.icolor = icolor;
        self
    }
}

/// Immutable, ordered table of observations.
///
/// Row order is the chronological order of each individual's own series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationTable {
    rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Observation> for ObservationTable {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Metrics computed for one individual, fields in output column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualMetrics {
    /// Individual identifier
    pub individual: Label,
    /// Fraction of observations spent away from an existing group of one's own community
    pub absenteeism: f64,
    /// Fraction of colored observations spent in groups of another community
    pub inquisitiveness: f64,
    /// Mean length of consecutive same-community runs
    pub community_stay: f64,
    /// Mean number of same-community group mates
    pub avg_num_peers: f64,
    /// Mean fraction of current peers that were already peers one step earlier
    pub peer_synchrony: f64,
    /// Mean size of the occupied group
    pub group_size: f64,
    /// Mean fraction of group members matching the group's dominant color
    pub group_homogeneity: f64,
    /// Mean lifetime (in time steps) of the communities the individual held
    pub individual_apparency: f64,
    /// Number of returns to a previously left community
    pub cyclicity: u32,
    /// Mean number of individuals sharing the individual's community at each step
    pub community_size: f64,
}

/// Sizes of the panel a metrics run was computed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSummary {
    /// Number of observation rows
    pub observations: usize,
    /// Number of distinct individuals
    pub individuals: usize,
    /// Number of distinct time values
    pub time_steps: usize,
    /// Number of (time, group, community) subgroups
    pub subgroups: usize,
}

/// Output of a metrics run: one row per individual, first-appearance order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsTable {
    pub summary: PanelSummary,
    pub rows: Vec<IndividualMetrics>,
}

impl MetricsTable {
    /// Look up the row of an individual
    pub fn get(&self, individual: &Label) -> Option<&IndividualMetrics> {
        self.rows.iter().find(|row| &row.individual == individual)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
