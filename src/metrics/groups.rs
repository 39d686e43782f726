//! Group-level metrics: group_size, group_homogeneity and community_size
//!
//! Each precomputes a table-wide statistic per (time, group) or
//! (time, community) and averages it over the individual's observations.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::config::NullCommunityPolicy;
use crate::error::ComputeError;
use crate::index::PanelIndex;
use crate::metrics::util::average;
use crate::types::Label;

/// Mean number of individuals in the occupied group, over grouped observations
pub fn group_size(index: &PanelIndex<'_>) -> Vec<f64> {
    let mut members: HashMap<(&Label, &Label), HashSet<&Label>> = HashMap::new();
    for obs in index.table.iter() {
        if let Some(group) = obs.group.as_ref() {
            members
                .entry((&obs.time, group))
                .or_default()
                .insert(&obs.individual);
        }
    }

    index.individuals.map_series(|series| {
        average(series.iter().filter_map(|obs| {
            let group = obs.group.as_ref()?;
            members
                .get(&(&obs.time, group))
                .map(|m| m.len() as f64)
        }))
    })
}

/// Mean fraction of group members whose own color matches the group color.
///
/// Only rows with group, `gcolor` and `icolor` all present take part, both in
/// the per-group fractions and in the individual's average.
pub fn group_homogeneity(index: &PanelIndex<'_>) -> Vec<f64> {
    let mut tallies: HashMap<(&Label, &Label), (usize, usize)> = HashMap::new();
    for obs in index.table.iter() {
        if let (Some(group), Some(gcolor), Some(icolor)) = (&obs.group, &obs.gcolor, &obs.icolor) {
            let tally = tallies.entry((&obs.time, group)).or_insert((0, 0));
            if gcolor == icolor {
                tally.0 += 1;
            }
            tally.1 += 1;
        }
    }

    index.individuals.map_series(|series| {
        average(series.iter().filter_map(|obs| {
            let group = obs.group.as_ref()?;
            obs.gcolor.as_ref()?;
            obs.icolor.as_ref()?;
            let (matching, total) = tallies.get(&(&obs.time, group))?;
            Some(*matching as f64 / *total as f64)
        }))
    })
}

/// Mean number of individuals sharing the individual's community at each step.
///
/// The average runs over every observation; observations without a community
/// color are resolved by `policy`.
pub fn community_size(
    index: &PanelIndex<'_>,
    policy: NullCommunityPolicy,
) -> Result<Vec<f64>, ComputeError> {
    let mut sizes: HashMap<(&Label, &Label), usize> = HashMap::new();
    for obs in index.table.iter() {
        if let Some(icolor) = obs.icolor.as_ref() {
            *sizes.entry((&obs.time, icolor)).or_insert(0) += 1;
        }
    }

    let mut uncolored = 0usize;
    let mut values = Vec::with_capacity(index.individuals.len());

    for (individual, series) in index.individuals.iter() {
        let mut counts = Vec::with_capacity(series.len());
        for obs in series {
            match (obs.icolor.as_ref(), policy) {
                (Some(icolor), _) => {
                    counts.push(sizes.get(&(&obs.time, icolor)).copied().unwrap_or(0) as f64)
                }
                (None, NullCommunityPolicy::Skip) => uncolored += 1,
                (None, NullCommunityPolicy::Zero) => {
                    uncolored += 1;
                    counts.push(0.0);
                }
                (None, NullCommunityPolicy::Reject) => {
                    return Err(ComputeError::MissingIndexEntry {
                        metric: "community_size",
                        individual: individual.to_string(),
                        time: obs.time.to_string(),
                    })
                }
            }
        }
        values.push(average(counts));
    }

    if uncolored > 0 {
        warn!(
            "community_size: {} observations without community color handled by {:?} policy",
            uncolored, policy
        );
    }

    Ok(values)
}
