//! Weekend scoring

use crate::catalog::Catalog;
use crate::roster::Roster;

/// Sum the points of every picked item in the round's catalogs.
///
/// Ids that no longer exist in the catalog (an item deleted after being picked) add 0.
/// The sum saturates at the `i64` bounds.
pub fn score_entrant(roster: &Roster, drivers: &Catalog, constructors: &Catalog) -> i64 {
    let driver_points = roster.drivers.iter().map(|id| drivers.points(*id));
    let constructor_points = roster.constructors.iter().map(|id| constructors.points(*id));
    driver_points.chain(constructor_points).fold(0i64, i64::saturating_add)
}
