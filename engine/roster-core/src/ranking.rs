//! Weekend ranking and championship-point awards
//!
//! Entrants are ordered by weekend points, highest first. Ties keep the order the
//! entrants were given in (the store's enumeration order); there is no secondary key.

use serde::{Deserialize, Serialize};

/// Championship points by finishing place (0-based). Places past the end award 0.
pub const CHAMPIONSHIP_POINTS: [i64; 10] = [25, 18, 15, 12, 10, 8, 6, 4, 2, 1];

/// One entrant's finishing position for a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placing {
    /// 0-based finishing place
    pub place: usize,
    /// Position of this entrant in the input sequence
    pub index: usize,
    pub team_name: String,
    pub weekend_points: i64,
}

/// Rank entrants by weekend points, descending, with a stable tie-break on input order
pub fn rank<S: AsRef<str>>(entries: &[(S, i64)]) -> Vec<Placing> {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    // sort_by_key is stable, which is the whole tie-break
    order.sort_by_key(|&i| std::cmp::Reverse(entries[i].1));

    order
        .into_iter()
        .enumerate()
        .map(|(place, index)| Placing {
            place,
            index,
            team_name: entries[index].0.as_ref().to_string(),
            weekend_points: entries[index].1,
        })
        .collect()
}

/// Championship points for a 0-based place
pub fn award_for(place: usize) -> i64 {
    CHAMPIONSHIP_POINTS.get(place).copied().unwrap_or(0)
}
