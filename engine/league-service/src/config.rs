//! Configuration for LeagueService

use serde::{Deserialize, Serialize};

/// LeagueService configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueServiceConfig {
    /// Seed the default catalogs on start when the store has none
    pub seed_on_start: bool,

    /// Reject roster saves once the deadline has passed
    pub enforce_deadline: bool,
}

impl Default for LeagueServiceConfig {
    fn default() -> Self {
        Self { seed_on_start: true, enforce_deadline: true }
    }
}

impl LeagueServiceConfig {
    /// Override fields from `LEAGUE_SEED_ON_START` and `LEAGUE_ENFORCE_DEADLINE`
    pub fn apply_env(&mut self) -> Result<(), crate::LeagueError> {
        self.seed_on_start = parse_flag("LEAGUE_SEED_ON_START", self.seed_on_start)?;
        self.enforce_deadline = parse_flag("LEAGUE_ENFORCE_DEADLINE", self.enforce_deadline)?;
        Ok(())
    }
}

fn parse_flag(name: &str, default: bool) -> Result<bool, crate::LeagueError> {
    match std::env::var(name) {
        Ok(value) => value.trim().parse::<bool>().map_err(|_| crate::LeagueError::InvalidConfig {
            message: format!("Invalid {name}: {value}"),
        }),
        Err(_) => Ok(default),
    }
}
