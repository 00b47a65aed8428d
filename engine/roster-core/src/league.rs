//! Entrants and league-wide settings

use crate::catalog::CatalogId;
use crate::roster::Roster;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Roster as stored on an entrant. Either list may be missing for an entrant that
/// has never picked a team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSheet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drivers: Option<Vec<CatalogId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructors: Option<Vec<CatalogId>>,
}

impl TeamSheet {
    /// Both lists present and empty
    pub fn empty() -> Self {
        Self { drivers: Some(Vec::new()), constructors: Some(Vec::new()) }
    }

    /// The roster, if both lists are present
    pub fn roster(&self) -> Option<Roster> {
        match (&self.drivers, &self.constructors) {
            (Some(drivers), Some(constructors)) => Some(Roster {
                drivers: drivers.iter().copied().collect(),
                constructors: constructors.iter().copied().collect(),
            }),
            _ => None,
        }
    }
}

impl From<&Roster> for TeamSheet {
    fn from(roster: &Roster) -> Self {
        Self {
            drivers: Some(roster.drivers.iter().copied().collect()),
            constructors: Some(roster.constructors.iter().copied().collect()),
        }
    }
}

/// A fantasy team in the league
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrant {
    /// Team name; unique and never changed once set
    pub name: String,
    #[serde(default)]
    pub team: TeamSheet,
    /// Only meaningful between the start of a settlement and the roster reset
    #[serde(default)]
    pub weekend_points: i64,
    /// Never decreases across settlements
    #[serde(default)]
    pub championship_points: i64,
}

impl Entrant {
    /// A new entrant with an empty roster and no points
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), team: TeamSheet::empty(), weekend_points: 0, championship_points: 0 }
    }

    /// The current roster, or an empty one if the entrant never picked
    pub fn roster(&self) -> Roster {
        self.team.roster().unwrap_or_default()
    }
}

/// League-wide settings, edited only by the operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueConfig {
    /// Rosters lock once this instant has passed
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Bumped by every settlement; a finalize that observed an older value is stale
    #[serde(default)]
    pub settlement_version: u64,
}

impl LeagueConfig {
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        crate::deadline::is_locked(now, self.deadline)
    }
}
