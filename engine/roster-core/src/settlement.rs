//! Round settlement planning
//!
//! Settling a round is one state transition over the whole league:
//!
//! 1. Overwrite every catalog item's points with the round's values
//! 2. Score every entrant against the updated catalogs
//! 3. Rank entrants by that score
//! 4. Award championship points by place, on top of each entrant's pre-settlement total
//! 5. Reset every roster and weekend score
//! 6. Append a settlement record to history
//!
//! [`plan_settlement`] computes the whole transition as values. Committing it as one
//! all-or-nothing write is the caller's job.

use crate::catalog::{Catalog, CatalogId, ItemKind};
use crate::error::{Result, ValidationError};
use crate::league::Entrant;
use crate::ranking::{award_for, rank};
use crate::scoring::score_entrant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Largest magnitude of points one item can score in a round
pub const MAX_ROUND_POINTS: i64 = 10_000;

/// Settlement id: milliseconds since the Unix epoch, strictly increasing
pub type SettlementId = u64;

/// One entrant's line in a settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    /// Team name
    pub user_name: String,
    pub weekend_points: i64,
    pub championship_points_awarded: i64,
}

/// A settled round. Written once, never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    /// Event label, e.g. "GP de Interlagos"
    pub name: String,
    /// Results in finishing order
    pub results: Vec<SettlementResult>,
}

/// Points the operator entered for a round, by catalog id.
/// Items left out keep whatever points they currently hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPoints {
    pub drivers: BTreeMap<CatalogId, i64>,
    pub constructors: BTreeMap<CatalogId, i64>,
}

impl RoundPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ItemKind, id: CatalogId, points: i64) -> Self {
        self.of_mut(kind).insert(id, points);
        self
    }

    pub fn of(&self, kind: ItemKind) -> &BTreeMap<CatalogId, i64> {
        match kind {
            ItemKind::Driver => &self.drivers,
            ItemKind::Constructor => &self.constructors,
        }
    }

    fn of_mut(&mut self, kind: ItemKind) -> &mut BTreeMap<CatalogId, i64> {
        match kind {
            ItemKind::Driver => &mut self.drivers,
            ItemKind::Constructor => &mut self.constructors,
        }
    }

    /// Every id must exist in its catalog, every value within `±MAX_ROUND_POINTS`
    pub fn validate(&self, drivers: &Catalog, constructors: &Catalog) -> Result<()> {
        for catalog in [drivers, constructors] {
            let kind = catalog.kind();
            for (id, points) in self.of(kind) {
                if !catalog.contains(*id) {
                    return Err(ValidationError::UnknownItem { kind, id: *id });
                }
                if points.unsigned_abs() > MAX_ROUND_POINTS.unsigned_abs() {
                    return Err(ValidationError::PointsOutOfRange {
                        kind,
                        id: *id,
                        points: *points,
                        limit: MAX_ROUND_POINTS,
                    });
                }
            }
        }
        Ok(())
    }

    /// The catalog with this round's points written in
    pub fn apply(&self, catalog: &Catalog) -> Catalog {
        let mut updated = catalog.clone();
        for (id, points) in self.of(catalog.kind()) {
            if let Some(item) = updated.get_mut(*id) {
                item.points = *points;
            }
        }
        updated
    }
}

/// What a settlement does to one entrant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrantAward {
    pub name: String,
    pub weekend_points: i64,
    pub awarded: i64,
    /// Pre-settlement total plus `awarded`
    pub championship_points: i64,
}

/// The complete outcome of settling a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    pub drivers: Catalog,
    pub constructors: Catalog,
    /// In finishing order
    pub awards: Vec<EntrantAward>,
    pub settlement: Settlement,
}

/// Plan a settlement from the current league state.
///
/// `entrants` must be in the store's enumeration order: equal scores keep that order.
/// A blank label is rejected before anything else is looked at.
pub fn plan_settlement(
    label: &str,
    drivers: &Catalog,
    constructors: &Catalog,
    entrants: &[Entrant],
    points: &RoundPoints,
    settlement_id: SettlementId,
) -> Result<SettlementPlan> {
    let label = label.trim();
    if label.is_empty() {
        return Err(ValidationError::MissingLabel);
    }
    points.validate(drivers, constructors)?;

    let drivers = points.apply(drivers);
    let constructors = points.apply(constructors);

    let scores: Vec<(&str, i64)> = entrants
        .iter()
        .map(|entrant| {
            let score = entrant
                .team
                .roster()
                .map_or(0, |roster| score_entrant(&roster, &drivers, &constructors));
            (entrant.name.as_str(), score)
        })
        .collect();

    let placings = rank(&scores);

    let awards: Vec<EntrantAward> = placings
        .iter()
        .map(|placing| {
            let awarded = award_for(placing.place);
            EntrantAward {
                name: placing.team_name.clone(),
                weekend_points: placing.weekend_points,
                awarded,
                championship_points: entrants[placing.index].championship_points.saturating_add(awarded),
            }
        })
        .collect();

    let results = awards
        .iter()
        .map(|award| SettlementResult {
            user_name: award.name.clone(),
            weekend_points: award.weekend_points,
            championship_points_awarded: award.awarded,
        })
        .collect();

    debug!(label, entrants = entrants.len(), settlement_id, "Planned settlement");

    Ok(SettlementPlan {
        drivers,
        constructors,
        awards,
        settlement: Settlement { id: settlement_id, name: label.to_string(), results },
    })
}

/// Next settlement id: the current time, pushed past the newest existing id if needed
pub fn next_settlement_id(now_millis: u64, latest: Option<SettlementId>) -> SettlementId {
    match latest {
        Some(latest) if latest >= now_millis => latest + 1,
        _ => now_millis,
    }
}
