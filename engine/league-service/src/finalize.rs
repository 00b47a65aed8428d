//! Round finalization
//!
//! The whole settlement is planned locally and committed as one batch, guarded by
//! preconditions on everything the plan was computed from:
//!
//! - `config/main.settlementVersion` must still hold the value that was read
//! - every entrant's stored `championshipPoints` and `team` must be unchanged
//!
//! If any of these moved, the store rejects the batch and nothing is written.

use crate::service::{collection_of, LeagueService};
use crate::state::LeagueState;
use crate::Result;
use persistence::{Collection, WriteOp};
use roster_core::{
    next_settlement_id, plan_settlement, Catalog, RoundPoints, Settlement, SettlementPlan,
    TeamSheet, ValidationError,
};
use serde_json::json;
use tracing::info;

impl LeagueService {
    /// Settle a round: score, rank, award, reset rosters, and record history
    pub async fn finalize_round(&self, label: &str, points: &RoundPoints) -> Result<Settlement> {
        if label.trim().is_empty() {
            return Err(ValidationError::MissingLabel.into());
        }

        let state = self.league_snapshot()?;
        let now_millis = u64::try_from(self.clock().now().timestamp_millis()).unwrap_or_default();
        let settlement_id = next_settlement_id(now_millis, state.latest_settlement().map(|s| s.id));

        let plan = plan_settlement(
            label,
            &state.catalog.drivers,
            &state.catalog.constructors,
            &state.entrants,
            points,
            settlement_id,
        )?;

        let ops = settlement_batch(&state, &plan)?;
        self.commit(ops).await?;

        info!(
            "Finalized round '{}' as settlement {} for {} entrants",
            plan.settlement.name,
            plan.settlement.id,
            plan.awards.len()
        );

        Ok(plan.settlement)
    }
}

/// All writes of a settlement, preconditions first
pub(crate) fn settlement_batch(state: &LeagueState, plan: &SettlementPlan) -> Result<Vec<WriteOp>> {
    let mut ops = vec![WriteOp::expect(
        Collection::Config,
        Collection::CONFIG_KEY,
        "settlementVersion",
        state.version_token.clone(),
    )];

    for award in &plan.awards {
        for field in ["championshipPoints", "team"] {
            ops.push(WriteOp::expect(
                Collection::Users,
                award.name.as_str(),
                field,
                state.entrant_field(&award.name, field),
            ));
        }
    }

    push_points(&mut ops, &plan.drivers)?;
    push_points(&mut ops, &plan.constructors)?;

    let empty_team = serde_json::to_value(TeamSheet::empty())?;
    for award in &plan.awards {
        ops.push(WriteOp::update(
            Collection::Users,
            award.name.as_str(),
            json!({
                "championshipPoints": award.championship_points,
                "weekendPoints": 0,
                "team": empty_team,
            }),
        )?);
    }

    ops.push(WriteOp::set(
        Collection::RaceHistory,
        plan.settlement.id.to_string(),
        serde_json::to_value(&plan.settlement)?,
    ));

    ops.push(WriteOp::merge(
        Collection::Config,
        Collection::CONFIG_KEY,
        json!({ "settlementVersion": state.config.settlement_version + 1 }),
    )?);

    Ok(ops)
}

fn push_points(ops: &mut Vec<WriteOp>, catalog: &Catalog) -> Result<()> {
    let collection = collection_of(catalog.kind());
    for item in catalog.iter() {
        ops.push(WriteOp::update(collection, item.id.to_string(), json!({ "points": item.points }))?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeagueServiceConfig;
    use crate::error::{ErrorKind, LeagueError};
    use chrono::Utc;
    use persistence::{CollectionSnapshot, InMemoryStore, Store, Value};
    use roster_core::{ItemKind, ManualClock};
    use std::sync::Arc;

    /// Seeded league with two rostered teams, A and B
    async fn league() -> (InMemoryStore, LeagueService) {
        let store = InMemoryStore::new();
        let service = LeagueService::with_clock(
            Arc::new(store.clone()),
            Arc::new(ManualClock::new(Utc::now())),
            LeagueServiceConfig::default(),
        );
        service.start().await.unwrap();

        let team = |drivers: [u32; 5]| json!({"drivers": drivers, "constructors": [1, 2]});
        store
            .atomic_batch(vec![
                WriteOp::set(
                    Collection::Users,
                    "A",
                    json!({"name": "A", "championshipPoints": 10, "weekendPoints": 0, "team": team([1, 2, 3, 4, 5])}),
                ),
                WriteOp::set(
                    Collection::Users,
                    "B",
                    json!({"name": "B", "championshipPoints": 4, "weekendPoints": 0, "team": team([6, 7, 8, 9, 10])}),
                ),
            ])
            .await
            .unwrap();
        (store, service)
    }

    fn planned(state: &LeagueState) -> SettlementPlan {
        let points = RoundPoints::new().with(ItemKind::Driver, 1, 25).with(ItemKind::Driver, 6, 18);
        plan_settlement(
            "Imola",
            &state.catalog.drivers,
            &state.catalog.constructors,
            &state.entrants,
            &points,
            7,
        )
        .unwrap()
    }

    async fn assert_stale(store: &InMemoryStore, service: &LeagueService, ops: Vec<WriteOp>) {
        let before = store.dump().await;
        let err = service.commit(ops).await.unwrap_err();
        assert!(matches!(err, LeagueError::StaleState(_)));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.dump().await, before);
    }

    #[tokio::test]
    async fn test_old_plan_rejected_after_points_change() {
        let (store, service) = league().await;
        let state = service.league_snapshot().unwrap();
        let plan = planned(&state);

        store
            .atomic_batch(vec![WriteOp::update(Collection::Users, "B", json!({"championshipPoints": 40})).unwrap()])
            .await
            .unwrap();

        assert_stale(&store, &service, settlement_batch(&state, &plan).unwrap()).await;
    }

    #[tokio::test]
    async fn test_old_plan_rejected_after_roster_change() {
        let (store, service) = league().await;
        let state = service.league_snapshot().unwrap();
        let plan = planned(&state);

        let team = json!({"drivers": [11, 12, 13, 14, 15], "constructors": [3, 4]});
        store
            .atomic_batch(vec![WriteOp::update(Collection::Users, "B", json!({"team": team})).unwrap()])
            .await
            .unwrap();

        assert_stale(&store, &service, settlement_batch(&state, &plan).unwrap()).await;
    }

    #[tokio::test]
    async fn test_old_plan_rejected_after_another_settlement() {
        let (store, service) = league().await;
        let state = service.league_snapshot().unwrap();
        let plan = planned(&state);

        // only the version moves; every entrant document is untouched
        store
            .atomic_batch(vec![WriteOp::merge(
                Collection::Config,
                Collection::CONFIG_KEY,
                json!({"settlementVersion": state.config.settlement_version + 1}),
            )
            .unwrap()])
            .await
            .unwrap();

        assert_stale(&store, &service, settlement_batch(&state, &plan).unwrap()).await;
    }

    #[tokio::test]
    async fn test_fresh_plan_commits() {
        let (_store, service) = league().await;
        let state = service.league_snapshot().unwrap();
        let plan = planned(&state);

        service.commit(settlement_batch(&state, &plan).unwrap()).await.unwrap();

        let after = service.league_snapshot().unwrap();
        assert_eq!(after.config.settlement_version, state.config.settlement_version + 1);
        assert_eq!(after.entrant("A").unwrap().championship_points, 35);
        assert_eq!(after.entrant("B").unwrap().championship_points, 22);
        assert_eq!(after.latest_settlement().unwrap().id, 7);
    }

    #[test]
    fn test_batch_guards_come_first() {
        let mut users = CollectionSnapshot::empty(Collection::Users);
        users
            .documents
            .insert("A".into(), json!({"name": "A", "championshipPoints": 7, "team": {"drivers": [], "constructors": []}}));
        let empty = CollectionSnapshot::empty;
        let state = LeagueState::from_snapshots(
            &empty(Collection::Drivers),
            &empty(Collection::Constructors),
            &users,
            &empty(Collection::RaceHistory),
            &empty(Collection::Config),
        )
        .unwrap();

        let plan = plan_settlement(
            "Sprint",
            &state.catalog.drivers,
            &state.catalog.constructors,
            &state.entrants,
            &RoundPoints::new(),
            5,
        )
        .unwrap();

        let ops = settlement_batch(&state, &plan).unwrap();
        assert_eq!(
            ops[0],
            WriteOp::expect(Collection::Config, "main", "settlementVersion", Value::Null)
        );
        assert_eq!(ops[1], WriteOp::expect(Collection::Users, "A", "championshipPoints", json!(7)));
        assert!(!ops[2].is_write());
        assert!(ops[3..].iter().all(WriteOp::is_write));

        let last = ops.last().unwrap();
        assert_eq!(
            last,
            &WriteOp::merge(Collection::Config, "main", json!({"settlementVersion": 1})).unwrap()
        );
    }
}
