//! LeagueService: the league's write paths over an injected store

use crate::config::LeagueServiceConfig;
use crate::error::LeagueError;
use crate::seed::seed_batch;
use crate::state::{LeagueState, Subscriptions};
use crate::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use persistence::{Collection, Store, StoreError, WriteOp};
use roster_core::{
    CatalogId, Clock, Entrant, ItemKind, PriceEdit, Roster, Settlement, SystemClock,
    TeamSheet, ValidationError,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A price edit for one catalog item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceChange {
    pub kind: ItemKind,
    pub id: CatalogId,
    pub edit: PriceEdit,
}

impl PriceChange {
    pub fn new(kind: ItemKind, id: CatalogId, raw: impl Into<String>) -> Self {
        Self { kind, id, edit: PriceEdit::new(raw) }
    }
}

/// League operations
///
/// Reads come from the pushed snapshots. Each write is one atomic batch. Once the
/// store denies access, every later write is refused locally until
/// [`LeagueService::clear_access_block`] is called.
pub struct LeagueService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    config: LeagueServiceConfig,
    subscriptions: Subscriptions,
    access_block: RwLock<Option<String>>,
}

impl LeagueService {
    /// Create a new league service on the system clock
    pub fn new(store: Arc<dyn Store>, config: LeagueServiceConfig) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), config)
    }

    /// Create a new league service with an explicit clock
    pub fn with_clock(store: Arc<dyn Store>, clock: Arc<dyn Clock>, config: LeagueServiceConfig) -> Self {
        let subscriptions = Subscriptions::new(store.as_ref());
        Self { store, clock, config, subscriptions, access_block: RwLock::new(None) }
    }

    /// Seed the default catalogs if configured to
    pub async fn start(&self) -> Result<()> {
        if self.config.seed_on_start {
            self.seed_if_empty().await?;
        }
        info!("League service started");
        Ok(())
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn config(&self) -> &LeagueServiceConfig {
        &self.config
    }

    /// Typed state from the latest snapshots
    pub fn league_snapshot(&self) -> Result<LeagueState> {
        self.subscriptions.state()
    }

    /// Entrants by championship points, highest first
    pub fn standings(&self) -> Result<Vec<Entrant>> {
        let state = self.league_snapshot()?;
        Ok(state.standings().into_iter().cloned().collect())
    }

    /// All settlements, oldest first
    pub fn history(&self) -> Result<Vec<Settlement>> {
        Ok(self.league_snapshot()?.history)
    }

    pub fn latest_settlement(&self) -> Result<Option<Settlement>> {
        Ok(self.league_snapshot()?.history.pop())
    }

    /// Whether rosters are locked right now
    pub fn is_locked(&self) -> Result<bool> {
        Ok(self.league_snapshot()?.config.is_locked(self.clock.now()))
    }

    /// Why writes are blocked, if they are
    pub fn access_block(&self) -> Option<String> {
        self.access_block.read().clone()
    }

    /// Allow writes again after store access has been restored
    pub fn clear_access_block(&self) {
        if self.access_block.write().take().is_some() {
            info!("Store access block cleared");
        }
    }

    /// Write the default catalogs if the store holds none. An existing league
    /// config is left as it is.
    pub async fn seed_if_empty(&self) -> Result<bool> {
        if !self.subscriptions.has_no_drivers() {
            return Ok(false);
        }

        self.commit(seed_batch(!self.subscriptions.has_config())?).await?;
        info!("Seeded default driver and constructor catalogs");
        Ok(true)
    }

    /// Register a new team with an empty roster
    pub async fn register_team(&self, name: &str) -> Result<Entrant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankTeamName.into());
        }

        let state = self.league_snapshot()?;
        if state.name_taken(name) {
            return Err(ValidationError::DuplicateTeamName(name.to_string()).into());
        }

        let entrant = Entrant::new(name);
        self.commit(vec![
            WriteOp::expect(Collection::Users, name, "name", serde_json::Value::Null),
            WriteOp::set(Collection::Users, name, serde_json::to_value(&entrant)?),
        ])
        .await?;

        info!("Registered team {}", name);
        Ok(entrant)
    }

    /// Save a complete roster for an existing team
    pub async fn save_roster(&self, team_name: &str, roster: &Roster) -> Result<()> {
        let state = self.league_snapshot()?;
        roster.validate_for_save(&state.catalog)?;

        if self.config.enforce_deadline && state.config.is_locked(self.clock.now()) {
            if let Some(deadline) = state.config.deadline {
                return Err(LeagueError::RosterLocked { deadline });
            }
        }

        let existing = self
            .store
            .get_one(Collection::Users, team_name)
            .await
            .map_err(|err| self.store_failure(err))?;
        if existing.is_none() {
            return Err(LeagueError::EntrantNotFound(team_name.to_string()));
        }

        let team = serde_json::to_value(TeamSheet::from(roster))?;
        self.commit(vec![WriteOp::update(Collection::Users, team_name, json!({ "team": team }))?])
            .await?;

        info!("Saved roster for {} (cost {})", team_name, roster.cost(&state.catalog));
        Ok(())
    }

    /// Commit price edits. Every repriced item's points go back to zero.
    pub async fn update_prices(&self, changes: &[PriceChange]) -> Result<usize> {
        if changes.is_empty() {
            return Ok(0);
        }

        let state = self.league_snapshot()?;
        let mut ops = Vec::with_capacity(changes.len());

        for change in changes {
            let mut item = state
                .catalog
                .of(change.kind)
                .get(change.id)
                .cloned()
                .ok_or(ValidationError::UnknownItem { kind: change.kind, id: change.id })?;
            item.reprice(change.edit.commit());

            let doc = serde_json::to_value(&item)?;
            ops.push(WriteOp::update(
                collection_of(change.kind),
                item.id.to_string(),
                json!({ "price": doc["price"], "points": item.points }),
            )?);
        }

        let count = ops.len();
        self.commit(ops).await?;

        info!("Updated {} prices", count);
        Ok(count)
    }

    /// Set or clear the roster deadline
    pub async fn set_deadline(&self, deadline: Option<DateTime<Utc>>) -> Result<()> {
        self.commit(vec![WriteOp::merge(
            Collection::Config,
            Collection::CONFIG_KEY,
            json!({ "deadline": deadline }),
        )?])
        .await?;

        match deadline {
            Some(deadline) => info!("Roster deadline set to {}", deadline),
            None => info!("Roster deadline cleared"),
        }
        Ok(())
    }

    /// Send one batch to the store, tracking access denial
    pub(crate) async fn commit(&self, ops: Vec<WriteOp>) -> Result<()> {
        if let Some(reason) = self.access_block() {
            warn!("Refusing write while store access is blocked");
            return Err(LeagueError::AccessBlocked(reason));
        }

        self.store.atomic_batch(ops).await.map_err(|err| self.store_failure(err))
    }

    /// Classify a store error, entering blocked mode on access denial
    fn store_failure(&self, err: StoreError) -> LeagueError {
        if err.is_access_denied() {
            let reason = err.to_string();
            error!("Store denied access, blocking further writes: {}", reason);
            *self.access_block.write() = Some(reason.clone());
            return LeagueError::AccessDenied(reason);
        }
        err.into()
    }
}

pub(crate) fn collection_of(kind: ItemKind) -> Collection {
    match kind {
        ItemKind::Driver => Collection::Drivers,
        ItemKind::Constructor => Collection::Constructors,
    }
}
