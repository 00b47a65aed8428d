//! Typed league state rebuilt from pushed collection snapshots

use crate::Result;
use persistence::{Collection, CollectionSnapshot, Store, Value};
use roster_core::{
    Catalog, CatalogItem, Entrant, ItemKind, LeagueCatalog, LeagueConfig, Settlement,
};
use tokio::sync::watch;

/// Everything the league knows, as of the latest snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueState {
    pub catalog: LeagueCatalog,
    /// In store enumeration order (key order)
    pub entrants: Vec<Entrant>,
    /// Ascending by id
    pub history: Vec<Settlement>,
    pub config: LeagueConfig,

    /// Raw entrant documents, for preconditions on the exact stored values
    pub(crate) users: CollectionSnapshot,
    /// Raw `settlementVersion` as stored (null when absent)
    pub(crate) version_token: Value,
}

impl LeagueState {
    /// Decode the five collections into typed state
    pub fn from_snapshots(
        drivers: &CollectionSnapshot,
        constructors: &CollectionSnapshot,
        users: &CollectionSnapshot,
        history: &CollectionSnapshot,
        config: &CollectionSnapshot,
    ) -> Result<Self> {
        let catalog = LeagueCatalog::new(
            Catalog::from_items(ItemKind::Driver, drivers.decode::<CatalogItem>()?),
            Catalog::from_items(ItemKind::Constructor, constructors.decode::<CatalogItem>()?),
        );

        let entrants = users.decode::<Entrant>()?;

        let mut history = history.decode::<Settlement>()?;
        history.sort_by_key(|settlement| settlement.id);

        let config_doc = config.get(Collection::CONFIG_KEY);
        let version_token = config_doc
            .and_then(|doc| doc.get("settlementVersion"))
            .cloned()
            .unwrap_or(Value::Null);
        let config = config.decode_one::<LeagueConfig>(Collection::CONFIG_KEY)?.unwrap_or_default();

        Ok(Self { catalog, entrants, history, config, users: users.clone(), version_token })
    }

    pub fn entrant(&self, name: &str) -> Option<&Entrant> {
        self.entrants.iter().find(|entrant| entrant.name == name)
    }

    /// Entrants by championship points, highest first; ties keep store order
    pub fn standings(&self) -> Vec<&Entrant> {
        let mut standings: Vec<&Entrant> = self.entrants.iter().collect();
        standings.sort_by_key(|entrant| std::cmp::Reverse(entrant.championship_points));
        standings
    }

    pub fn latest_settlement(&self) -> Option<&Settlement> {
        self.history.last()
    }

    /// Whether a team name is taken, ignoring case and surrounding whitespace
    pub fn name_taken(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.entrants.iter().any(|entrant| entrant.name.trim().to_lowercase() == wanted)
    }

    /// Stored value of one field of an entrant document (null when absent)
    pub(crate) fn entrant_field(&self, name: &str, field: &str) -> Value {
        self.users
            .get(name)
            .and_then(|doc| doc.get(field))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

/// One live subscription per league collection
pub struct Subscriptions {
    drivers: watch::Receiver<CollectionSnapshot>,
    constructors: watch::Receiver<CollectionSnapshot>,
    users: watch::Receiver<CollectionSnapshot>,
    history: watch::Receiver<CollectionSnapshot>,
    config: watch::Receiver<CollectionSnapshot>,
}

impl Subscriptions {
    /// Subscribe to every collection of a store
    pub fn new(store: &dyn Store) -> Self {
        Self {
            drivers: store.subscribe(Collection::Drivers),
            constructors: store.subscribe(Collection::Constructors),
            users: store.subscribe(Collection::Users),
            history: store.subscribe(Collection::RaceHistory),
            config: store.subscribe(Collection::Config),
        }
    }

    /// State from the latest snapshots
    pub fn state(&self) -> Result<LeagueState> {
        LeagueState::from_snapshots(
            &self.drivers.borrow(),
            &self.constructors.borrow(),
            &self.users.borrow(),
            &self.history.borrow(),
            &self.config.borrow(),
        )
    }

    /// State from the latest snapshots, marking them all as seen
    pub fn state_and_mark_seen(&mut self) -> Result<LeagueState> {
        LeagueState::from_snapshots(
            &self.drivers.borrow_and_update(),
            &self.constructors.borrow_and_update(),
            &self.users.borrow_and_update(),
            &self.history.borrow_and_update(),
            &self.config.borrow_and_update(),
        )
    }

    /// Wait until any collection has a snapshot not yet seen
    pub async fn changed(&mut self) -> Result<()> {
        let result = tokio::select! {
            result = self.drivers.changed() => result,
            result = self.constructors.changed() => result,
            result = self.users.changed() => result,
            result = self.history.changed() => result,
            result = self.config.changed() => result,
        };
        result.map_err(|_| persistence::StoreError::unavailable("store dropped its snapshot channels"))?;
        Ok(())
    }

    /// No driver catalog yet; a fresh league
    pub fn has_no_drivers(&self) -> bool {
        self.drivers.borrow().is_empty()
    }

    /// Whether the league config document exists
    pub fn has_config(&self) -> bool {
        self.config.borrow().get(Collection::CONFIG_KEY).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(collection: Collection, docs: Vec<(&str, Value)>) -> CollectionSnapshot {
        let mut snapshot = CollectionSnapshot::empty(collection);
        for (key, doc) in docs {
            snapshot.documents.insert(key.to_string(), doc);
        }
        snapshot
    }

    #[test]
    fn test_from_snapshots() {
        let drivers = snapshot(
            Collection::Drivers,
            vec![("1", json!({"id": 1, "name": "Max Verstappen", "price": 30.0, "points": 12}))],
        );
        let constructors = snapshot(Collection::Constructors, vec![]);
        let users = snapshot(
            Collection::Users,
            vec![
                ("Alpha", json!({"name": "Alpha", "championshipPoints": 18})),
                ("Beta", json!({"name": "Beta", "championshipPoints": 25, "team": {"drivers": [1], "constructors": []}})),
                ("Gamma", json!({"name": "Gamma", "championshipPoints": 18})),
            ],
        );
        let history = snapshot(
            Collection::RaceHistory,
            vec![
                ("2000", json!({"id": 2000, "name": "Monaco", "results": []})),
                ("1000", json!({"id": 1000, "name": "Bahrain", "results": []})),
            ],
        );
        let config = snapshot(Collection::Config, vec![("main", json!({"deadline": null}))]);

        let state = LeagueState::from_snapshots(&drivers, &constructors, &users, &history, &config).unwrap();

        assert_eq!(state.catalog.drivers.points(1), 12);
        assert_eq!(state.entrants.len(), 3);
        assert_eq!(state.history.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1000, 2000]);
        assert_eq!(state.latest_settlement().unwrap().name, "Monaco");
        assert_eq!(state.config.settlement_version, 0);
        assert_eq!(state.version_token, Value::Null);

        let standings: Vec<_> = state.standings().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(standings, vec!["Beta", "Alpha", "Gamma"]);

        assert!(state.name_taken(" alpha "));
        assert!(!state.name_taken("Delta"));
        assert_eq!(state.entrant_field("Alpha", "team"), Value::Null);
        assert_eq!(state.entrant_field("Beta", "championshipPoints"), json!(25));
    }

    #[test]
    fn test_bad_document_is_reported() {
        let empty = |c| CollectionSnapshot::empty(c);
        let users = snapshot(Collection::Users, vec![("X", json!({"championshipPoints": "lots"}))]);
        let err = LeagueState::from_snapshots(
            &empty(Collection::Drivers),
            &empty(Collection::Constructors),
            &users,
            &empty(Collection::RaceHistory),
            &empty(Collection::Config),
        )
        .unwrap_err();
        assert!(err.to_string().contains("users/X"));
    }
}
