//! Peer metrics: avg_num_peers and peer_synchrony
//!
//! Peers are the other members of an individual's subgroup, i.e. the
//! individuals sharing both its group and its community color at a time step.

use crate::index::PanelIndex;
use crate::metrics::util::{adjacent_pairs, average};

/// Mean number of peers over observations with both group and community present
pub fn avg_num_peers(index: &PanelIndex<'_>) -> Vec<f64> {
    index.individuals.map_series(|series| {
        average(
            series
                .iter()
                .filter_map(|obs| index.subgroups.of(*obs))
                .map(|members| members.len().saturating_sub(1) as f64),
        )
    })
}

/// Mean fraction of an individual's current peers that were already its peers
/// at the previous observation.
///
/// Every adjacent pair of observations contributes one value. A pair
/// contributes 0.0 when either side has no group or no community color, or
/// when the later subgroup holds only the individual itself.
pub fn peer_synchrony(index: &PanelIndex<'_>) -> Vec<f64> {
    index.individuals.map_series(|series| {
        average(adjacent_pairs(series).map(|(prev, curr)| {
            if prev.group.is_none() || curr.group.is_none() {
                return 0.0;
            }
            let (Some(before), Some(after)) = (index.subgroups.of(*prev), index.subgroups.of(*curr))
            else {
                return 0.0;
            };
            if after.len() <= 1 {
                return 0.0;
            }
            let shared = before.intersection(after).count();
            (shared as f64 - 1.0) / (after.len() as f64 - 1.0)
        }))
    })
}
