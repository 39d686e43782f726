//! Presence metrics: absenteeism and inquisitiveness
//!
//! Both compare an individual's own community color (`icolor`) with the
//! dominant color of the group it currently occupies (`gcolor`).

use std::collections::{HashMap, HashSet};

use crate::index::PanelIndex;
use crate::metrics::util::ratio;
use crate::types::{Label, Observation};

/// Fraction of observations in which the individual is absent from its community.
///
/// An observation counts as absent when the individual's color differs from its
/// group's color while some group of the individual's color exists at that
/// time. The denominator is every observation of the individual, nulls included.
pub fn absenteeism(index: &PanelIndex<'_>) -> Vec<f64> {
    let mut colors_at: HashMap<&Label, HashSet<&Label>> = HashMap::new();
    for obs in index.table.iter() {
        if let Some(gcolor) = obs.gcolor.as_ref() {
            colors_at.entry(&obs.time).or_default().insert(gcolor);
        }
    }

    index.individuals.map_series(|series| {
        let absent = series
            .iter()
            .filter(|obs| is_absent(obs, &colors_at))
            .count();
        ratio(absent, series.len())
    })
}

fn is_absent(obs: &Observation, colors_at: &HashMap<&Label, HashSet<&Label>>) -> bool {
    let Some(own) = obs.icolor.as_ref() else {
        return false;
    };
    // a time without any colored group has no group to be absent from
    obs.gcolor.as_ref() != Some(own)
        && colors_at
            .get(&obs.time)
            .is_some_and(|colors| colors.contains(own))
}

/// Fraction of colored observations spent visiting a group of another community.
///
/// Only observations with a non-null `icolor` are counted. A visit needs a
/// group color to differ from, so rows without a `gcolor` are never visits.
pub fn inquisitiveness(index: &PanelIndex<'_>) -> Vec<f64> {
    index.individuals.map_series(|series| {
        let colored: Vec<&&Observation> = series.iter().filter(|obs| obs.icolor.is_some()).collect();
        let visiting = colored
            .iter()
            .filter(|obs| obs.gcolor.is_some() && obs.gcolor != obs.icolor)
            .count();
        ratio(visiting, colored.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObservationTable;
    use pretty_assertions::assert_eq;

    fn red() -> Option<Label> {
        Some(Label::from("red"))
    }

    #[test]
    fn test_absenteeism_scenario() {
        // group A (color A) holds X (A) and W (B); group D (color B) holds V (B)
        let table = ObservationTable::new(vec![
            Observation::new(1, "A", "X", "A", "A"),
            Observation::new(1, "A", "W", "A", "B"),
            Observation::new(1, "D", "V", "B", "B"),
        ]);
        let index = PanelIndex::build(&table);

        assert_eq!(absenteeism(&index), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_absenteeism_requires_a_group_of_own_color() {
        // W is in the wrong group but no blue group exists at t=1
        let table = ObservationTable::new(vec![
            Observation::new(1, "A", "X", "red", "red"),
            Observation::new(1, "A", "W", "red", "blue"),
            Observation::new(2, "A", "W", "red", "blue"),
            Observation::new(2, "B", "V", "blue", "blue"),
        ]);
        let index = PanelIndex::build(&table);

        assert_eq!(absenteeism(&index), vec![0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_absenteeism_counts_null_rows_in_denominator() {
        let table = ObservationTable::new(vec![
            Observation::new(1, "A", "X", "red", "red"),
            Observation::new(1, "B", "W", "blue", "red"),
            Observation::ungrouped(2, "W", red()),
            Observation::ungrouped(3, "W", None),
        ]);
        let index = PanelIndex::build(&table);

        let values = absenteeism(&index);
        // W: t1 absent, t2 no colored group exists, t3 no color
        assert_eq!(values[1], 1.0 / 3.0);
    }

    #[test]
    fn test_absenteeism_ungrouped_individual_is_absent() {
        let table = ObservationTable::new(vec![
            Observation::new(1, "A", "X", "red", "red"),
            Observation::ungrouped(1, "W", red()),
        ]);
        let index = PanelIndex::build(&table);

        assert_eq!(absenteeism(&index), vec![0.0, 1.0]);
    }

    #[test]
    fn test_inquisitiveness() {
        let table = ObservationTable::new(vec![
            Observation::new(1, "A", "X", "red", "red"),
            Observation::new(2, "B", "X", "blue", "red"),
            Observation::new(3, "B", "X", "blue", "red").with_icolor(None),
            Observation::ungrouped(4, "X", red()),
            Observation::new(1, "A", "Y", "red", "red"),
        ]);
        let index = PanelIndex::build(&table);

        // X: 3 colored rows, one visit
        assert_eq!(inquisitiveness(&index), vec![1.0 / 3.0, 0.0]);
    }

    #[test]
    fn test_inquisitiveness_without_colored_rows() {
        let table = ObservationTable::new(vec![Observation::ungrouped(1, "X", None)]);
        let index = PanelIndex::build(&table);

        assert_eq!(inquisitiveness(&index), vec![0.0]);
    }
}
