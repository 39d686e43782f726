//! Community stability metrics: community_stay, individual_apparency, cyclicity
//!
//! These read an individual's `icolor` sequence in table order. Runs are
//! computed with [`runs`], where a null color always stands alone.

use std::collections::{HashMap, HashSet};

use crate::index::PanelIndex;
use crate::metrics::util::{average, runs};
use crate::types::Label;

/// Mean length of maximal same-color runs; 0.0 for an empty series
pub fn community_stay(index: &PanelIndex<'_>) -> Vec<f64> {
    index.individuals.map_series(|series| {
        average(
            runs(series.iter().map(|obs| obs.icolor.as_ref()))
                .into_iter()
                .map(|run| run.len as f64),
        )
    })
}

/// Mean lifetime of the distinct communities an individual has held.
///
/// A community's lifetime is the rank of the latest time value carrying that
/// color minus the rank of the earliest one, plus one. Times are compared by
/// value and ranked by first occurrence, so the lifetime can be zero or
/// negative when the table does not list time values in ascending order.
pub fn individual_apparency(index: &PanelIndex<'_>) -> Vec<f64> {
    let mut spans: HashMap<&Label, (&Label, &Label)> = HashMap::new();
    for obs in index.table.iter() {
        let Some(icolor) = obs.icolor.as_ref() else {
            continue;
        };
        spans
            .entry(icolor)
            .and_modify(|(earliest, latest)| {
                *earliest = (*earliest).min(&obs.time);
                *latest = (*latest).max(&obs.time);
            })
            .or_insert((&obs.time, &obs.time));
    }

    let lifetime = |(earliest, latest): &(&Label, &Label)| -> Option<f64> {
        let first = index.time_ranks.rank(earliest)? as i64;
        let last = index.time_ranks.rank(latest)? as i64;
        Some((last - first + 1) as f64)
    };

    index.individuals.map_series(|series| {
        let mut seen = HashSet::new();
        average(
            series
                .iter()
                .filter_map(|obs| obs.icolor.as_ref())
                .filter(|icolor| seen.insert(*icolor))
                .filter_map(|icolor| spans.get(icolor))
                .filter_map(&lifetime),
        )
    })
}

/// Number of times an individual returned to a community it had left.
///
/// Counts the runs of non-null colors and subtracts the number of distinct
/// colors, so only re-entries beyond each color's first run remain.
pub fn cyclicity(index: &PanelIndex<'_>) -> Vec<u32> {
    index.individuals.map_series(|series| {
        let colored_runs = runs(series.iter().map(|obs| obs.icolor.as_ref()))
            .into_iter()
            .filter(|run| run.color.is_some())
            .count();
        let distinct = series
            .iter()
            .filter_map(|obs| obs.icolor.as_ref())
            .collect::<HashSet<_>>()
            .len();
        colored_runs.saturating_sub(distinct) as u32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Observation, ObservationTable};
    use pretty_assertions::assert_eq;

    fn series_table(individual: &str, colors: &[Option<&str>]) -> ObservationTable {
        colors
            .iter()
            .enumerate()
            .map(|(t, color)| {
                Observation::new(t as i64, "g", individual, "red", "red")
                    .with_icolor(color.map(Label::from))
            })
            .collect()
    }

    #[test]
    fn test_community_stay() {
        let table = series_table("x", &[Some("a"), Some("a"), Some("b"), Some("a")]);
        let index = PanelIndex::build(&table);
        // runs 2, 1, 1
        assert_eq!(community_stay(&index), vec![4.0 / 3.0]);
    }

    #[test]
    fn test_constant_color() {
        let table = series_table("x", &[Some("a"); 5]);
        let index = PanelIndex::build(&table);

        assert_eq!(community_stay(&index), vec![5.0]);
        assert_eq!(cyclicity(&index), vec![0]);
    }

    #[test]
    fn test_single_observation() {
        let table = series_table("x", &[Some("a")]);
        let index = PanelIndex::build(&table);

        assert_eq!(community_stay(&index), vec![1.0]);
        assert_eq!(cyclicity(&index), vec![0]);
        assert_eq!(individual_apparency(&index), vec![1.0]);
    }

    #[test]
    fn test_null_colors_form_their_own_runs() {
        let table = series_table("x", &[Some("a"), None, None, Some("a")]);
        let index = PanelIndex::build(&table);

        assert_eq!(community_stay(&index), vec![1.0]);
        // a, (gap), a is one return to a
        assert_eq!(cyclicity(&index), vec![1]);
    }

    #[test]
    fn test_cyclicity_counts_every_reentry() {
        let table = series_table(
            "x",
            &[Some("a"), Some("b"), Some("a"), Some("b"), Some("a"), Some("c")],
        );
        let index = PanelIndex::build(&table);

        // 6 runs, 3 distinct colors
        assert_eq!(cyclicity(&index), vec![3]);
    }

    #[test]
    fn test_cyclicity_color_seen_once_is_zero() {
        let table = series_table("x", &[Some("a"), Some("a"), Some("b"), Some("c")]);
        let index = PanelIndex::build(&table);

        assert_eq!(cyclicity(&index), vec![0]);
    }

    #[test]
    fn test_individual_apparency() {
        let table = ObservationTable::new(vec![
            Observation::new(10, "g", "x", "red", "red"),
            Observation::new(10, "g", "y", "red", "blue"),
            Observation::new(20, "g", "x", "red", "red"),
            Observation::new(30, "g", "y", "red", "red"),
            Observation::new(40, "g", "x", "red", "red").with_icolor(None),
        ]);
        let index = PanelIndex::build(&table);

        // red spans ranks 0..=2 (3), blue spans rank 0 only (1)
        assert_eq!(individual_apparency(&index), vec![3.0, 2.0]);
    }

    #[test]
    fn test_individual_apparency_with_interleaved_individuals() {
        // each series is chronological, but time 3 is seen before time 1
        let table = ObservationTable::new(vec![
            Observation::new(3, "g", "x", "red", "red"),
            Observation::new(4, "g", "x", "red", "red"),
            Observation::new(1, "h", "y", "red", "red"),
            Observation::new(2, "h", "y", "red", "red"),
        ]);
        let index = PanelIndex::build(&table);

        // red: earliest time 1 has rank 2, latest time 4 has rank 1
        assert_eq!(individual_apparency(&index), vec![0.0, 0.0]);
    }

    #[test]
    fn test_individual_apparency_compares_time_values() {
        let table = ObservationTable::new(vec![
            Observation::new(1, "g", "x", "red", "red"),
            Observation::new(2, "h", "y", "blue", "blue"),
            Observation::new(5, "g", "x", "red", "blue"),
            Observation::new(3, "h", "y", "blue", "red"),
        ]);
        let index = PanelIndex::build(&table);

        // ranks: 1 -> 0, 2 -> 1, 5 -> 2, 3 -> 3
        // red spans times 1..=3 (3 - 0 + 1), blue spans times 2..=5 (2 - 1 + 1)
        assert_eq!(individual_apparency(&index), vec![3.0, 3.0]);
    }

    #[test]
    fn test_individual_apparency_without_colors() {
        let table = series_table("x", &[None, None]);
        let index = PanelIndex::build(&table);

        assert_eq!(individual_apparency(&index), vec![0.0]);
        assert_eq!(cyclicity(&index), vec![0]);
        assert_eq!(community_stay(&index), vec![1.0]);
    }
}
