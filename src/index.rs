//! Shared index builder
//!
//! Read-only structures derived once from an [`ObservationTable`] and borrowed
//! by every metric. Indexes hold references into the table, so the table must
//! outlive them and cannot change while a run is in progress.

use std::collections::{HashMap, HashSet};

use crate::types::{Label, Observation, ObservationTable};

/// Per-individual observation series, in first-appearance order of individuals.
///
/// Each series keeps the relative order of the individual's rows in the table.
#[derive(Debug, Default)]
pub struct IndividualIndex<'a> {
    individuals: Vec<&'a Label>,
    series: Vec<Vec<&'a Observation>>,
}

impl<'a> IndividualIndex<'a> {
    pub fn build(table: &'a ObservationTable) -> Self {
        let mut positions: HashMap<&'a Label, usize> = HashMap::new();
        let mut index = Self::default();

        for obs in table.iter() {
            let slot = *positions.entry(&obs.individual).or_insert_with(|| {
                index.individuals.push(&obs.individual);
                index.series.push(Vec::new());
                index.series.len() - 1
            });
            index.series[slot].push(obs);
        }

        index
    }

    /// Distinct individuals, first-appearance order
    pub fn individuals(&self) -> &[&'a Label] {
        &self.individuals
    }

    /// Iterate over (individual, series) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'a Label, &[&'a Observation])> + '_ {
        self.individuals
            .iter()
            .copied()
            .zip(self.series.iter().map(Vec::as_slice))
    }

    /// Apply `f` to every individual's series, one output per individual
    pub fn map_series<T, F>(&self, mut f: F) -> Vec<T>
    where
        F: FnMut(&[&'a Observation]) -> T,
    {
        self.series.iter().map(|series| f(series.as_slice())).collect()
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}

/// (time, group, community) key of a subgroup
pub type SubgroupKey<'a> = (&'a Label, &'a Label, &'a Label);

/// Individuals sharing a community color within a group at a time.
///
/// Built only from rows where both `group` and `icolor` are present.
#[derive(Debug, Default)]
pub struct SubgroupIndex<'a> {
    members: HashMap<SubgroupKey<'a>, HashSet<&'a Label>>,
}

impl<'a> SubgroupIndex<'a> {
    pub fn build(table: &'a ObservationTable) -> Self {
        let mut members: HashMap<SubgroupKey<'a>, HashSet<&'a Label>> = HashMap::new();
        for obs in table.iter() {
            if let Some(key) = Self::key_of(obs) {
                members.entry(key).or_default().insert(&obs.individual);
            }
        }
        Self { members }
    }

    /// Subgroup key of an observation, `None` when group or community is null
    pub fn key_of(obs: &'a Observation) -> Option<SubgroupKey<'a>> {
        Some((&obs.time, obs.group.as_ref()?, obs.icolor.as_ref()?))
    }

    /// Members of the subgroup at (time, group, community)
    pub fn get(&self, key: SubgroupKey<'a>) -> Option<&HashSet<&'a Label>> {
        self.members.get(&key)
    }

    /// Members of the subgroup an observation belongs to
    pub fn of(&self, obs: &'a Observation) -> Option<&HashSet<&'a Label>> {
        Self::key_of(obs).and_then(|key| self.get(key))
    }

    /// Number of distinct subgroups
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// 0-based rank of each distinct time value in first-occurrence order
#[derive(Debug, Default)]
pub struct TimeRankIndex<'a> {
    ranks: HashMap<&'a Label, usize>,
}

impl<'a> TimeRankIndex<'a> {
    pub fn build(table: &'a ObservationTable) -> Self {
        let mut ranks: HashMap<&'a Label, usize> = HashMap::new();
        for obs in table.iter() {
            let next = ranks.len();
            ranks.entry(&obs.time).or_insert(next);
        }
        Self { ranks }
    }

    pub fn rank(&self, time: &Label) -> Option<usize> {
        self.ranks.get(time).copied()
    }

    /// Number of distinct time values
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

/// All shared indexes of one metrics run
#[derive(Debug)]
pub struct PanelIndex<'a> {
    pub table: &'a ObservationTable,
    pub individuals: IndividualIndex<'a>,
    pub subgroups: SubgroupIndex<'a>,
    pub time_ranks: TimeRankIndex<'a>,
}

impl<'a> PanelIndex<'a> {
    pub fn build(table: &'a ObservationTable) -> Self {
        Self {
            table,
            individuals: IndividualIndex::build(table),
            subgroups: SubgroupIndex::build(table),
            time_ranks: TimeRankIndex::build(table),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> Label {
        Label::from(s)
    }

    fn sample_table() -> ObservationTable {
        ObservationTable::new(vec![
            Observation::new(5, "g1", "x", "red", "red"),
            Observation::new(5, "g1", "y", "red", "red"),
            Observation::new(5, "g1", "z", "red", "blue"),
            Observation::new(5, "g2", "w", "red", "red"),
            Observation::ungrouped(5, "v", Some(label("red"))),
            Observation::new(3, "g1", "x", "red", "red"),
            Observation::new(5, "g1", "u", "red", "red").with_icolor(None),
        ])
    }

    #[test]
    fn test_individual_order_and_series() {
        let table = sample_table();
        let index = IndividualIndex::build(&table);

        let names: Vec<String> = index.individuals().iter().map(|l| l.to_string()).collect();
        assert_eq!(names, vec!["x", "y", "z", "w", "v", "u"]);

        let (first, series) = index.iter().next().unwrap();
        assert_eq!(first, &label("x"));
        let times: Vec<&Label> = series.iter().map(|o| &o.time).collect();
        assert_eq!(times, vec![&Label::Int(5), &Label::Int(3)]);
    }

    #[test]
    fn test_subgroups_split_by_group_and_color() {
        let table = sample_table();
        let index = SubgroupIndex::build(&table);

        let t5 = Label::Int(5);
        let (g1, g2, red, blue) = (label("g1"), label("g2"), label("red"), label("blue"));

        let red_g1 = index.get((&t5, &g1, &red)).unwrap();
        assert_eq!(red_g1.len(), 2);
        assert!(red_g1.contains(&label("x")) && red_g1.contains(&label("y")));
        assert_eq!(index.get((&t5, &g1, &blue)).unwrap().len(), 1);
        assert_eq!(index.get((&t5, &g2, &red)).unwrap().len(), 1);

        // rows without group or without community contribute nothing
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_subgroup_of_null_community_is_none() {
        let table = sample_table();
        let index = SubgroupIndex::build(&table);
        assert!(index.of(&table.rows()[6]).is_none());
        assert!(index.of(&table.rows()[4]).is_none());
        assert_eq!(index.of(&table.rows()[0]).unwrap().len(), 2);
    }

    #[test]
    fn test_time_ranks_follow_first_occurrence() {
        let table = sample_table();
        let ranks = TimeRankIndex::build(&table);

        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks.rank(&Label::Int(5)), Some(0));
        assert_eq!(ranks.rank(&Label::Int(3)), Some(1));
        assert_eq!(ranks.rank(&Label::Int(9)), None);
    }

    #[test]
    fn test_empty_table() {
        let table = ObservationTable::default();
        let index = PanelIndex::build(&table);
        assert!(index.individuals.is_empty());
        assert!(index.subgroups.is_empty());
        assert!(index.time_ranks.is_empty());
    }
}
