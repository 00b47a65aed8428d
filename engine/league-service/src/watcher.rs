//! Live league view, rebuilt on every pushed snapshot

use crate::state::{LeagueState, Subscriptions};
use crate::Result;
use chrono::{DateTime, Utc};
use persistence::Store;
use roster_core::{Clock, Decimal};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// What a dashboard shows at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueView {
    pub state: LeagueState,
    /// Team names by championship points, highest first
    pub standings: Vec<String>,
    /// Current roster cost by team name
    pub roster_costs: BTreeMap<String, Decimal>,
    pub locked: bool,
    pub taken_at: DateTime<Utc>,
}

impl LeagueView {
    pub fn build(state: LeagueState, now: DateTime<Utc>) -> Self {
        let standings = state.standings().iter().map(|entrant| entrant.name.clone()).collect();
        let roster_costs = state
            .entrants
            .iter()
            .map(|entrant| (entrant.name.clone(), entrant.roster().cost(&state.catalog)))
            .collect();
        let locked = state.config.is_locked(now);

        Self { state, standings, roster_costs, locked, taken_at: now }
    }
}

/// Follows a store and rebuilds the [`LeagueView`] whenever anything changes
pub struct LeagueWatcher {
    subscriptions: Subscriptions,
    clock: Arc<dyn Clock>,
}

impl LeagueWatcher {
    pub fn new(store: &dyn Store, clock: Arc<dyn Clock>) -> Self {
        Self { subscriptions: Subscriptions::new(store), clock }
    }

    /// The view as of the latest snapshots
    pub fn current(&mut self) -> Result<LeagueView> {
        let state = self.subscriptions.state_and_mark_seen()?;
        Ok(LeagueView::build(state, self.clock.now()))
    }

    /// Wait for the next pushed snapshot and rebuild
    pub async fn changed(&mut self) -> Result<LeagueView> {
        self.subscriptions.changed().await?;
        self.current()
    }

    /// Rebuild on the next pushed snapshot or after `tick`, whichever comes first.
    ///
    /// The tick re-evaluates the lock state, which changes with time alone.
    pub async fn next(&mut self, tick: Duration) -> Result<LeagueView> {
        tokio::select! {
            changed = self.subscriptions.changed() => changed?,
            _ = tokio::time::sleep(tick) => {}
        }
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LeagueService, LeagueServiceConfig};
    use persistence::InMemoryStore;
    use roster_core::ManualClock;

    #[tokio::test]
    async fn test_view_follows_commits() {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service =
            LeagueService::with_clock(store.clone(), clock.clone(), LeagueServiceConfig::default());
        let mut watcher = LeagueWatcher::new(store.as_ref(), clock.clone());

        assert!(watcher.current().unwrap().standings.is_empty());

        service.start().await.unwrap();
        service.register_team("Undercut").await.unwrap();

        let view = watcher.changed().await.unwrap();
        assert_eq!(view.standings, vec!["Undercut".to_string()]);
        assert_eq!(view.roster_costs["Undercut"], Decimal::ZERO);
        assert!(!view.locked);
    }

    #[tokio::test]
    async fn test_tick_reevaluates_lock() {
        let store = Arc::new(InMemoryStore::new());
        let start = Utc::now();
        let clock = Arc::new(ManualClock::new(start));
        let service =
            LeagueService::with_clock(store.clone(), clock.clone(), LeagueServiceConfig::default());
        service.start().await.unwrap();
        service.set_deadline(Some(start + chrono::Duration::minutes(5))).await.unwrap();

        let mut watcher = LeagueWatcher::new(store.as_ref(), clock.clone());
        assert!(!watcher.current().unwrap().locked);

        clock.advance(chrono::Duration::minutes(6));
        let view = watcher.next(Duration::from_millis(10)).await.unwrap();
        assert!(view.locked);
    }
}
