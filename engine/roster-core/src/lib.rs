//! Roster Core - pure rules of the fantasy league
//!
//! This crate holds the league rules that need no I/O:
//!
//! - **Catalog**: drivers and constructors with a price and per-round points
//! - **Roster validation**: slot quotas and the spending cap
//! - **Scoring**: an entrant's weekend total from the catalog's points
//! - **Ranking**: weekend order and the championship-point table
//! - **Settlement planning**: the full end-of-round transition as values
//! - **Deadline gate**: whether roster edits are locked
//!
//! Persistence and orchestration live in the `persistence` and `league-service` crates;
//! functions here take snapshots as arguments and hand back new values.

pub mod catalog;
pub mod deadline;
pub mod edit;
pub mod error;
pub mod league;
pub mod ranking;
pub mod roster;
pub mod scoring;
pub mod settlement;

pub use catalog::{Catalog, CatalogId, CatalogItem, ItemKind, LeagueCatalog, MAX_PRICE, PRICE_SCALE};
pub use deadline::{is_locked, Clock, ManualClock, SystemClock};
pub use edit::{parse_points, PriceEdit};
pub use error::{Result, ValidationError};
pub use league::{Entrant, LeagueConfig, TeamSheet};
pub use ranking::{award_for, rank, Placing, CHAMPIONSHIP_POINTS};
pub use roster::{Roster, BUDGET, CONSTRUCTOR_SLOTS, DRIVER_SLOTS};
pub use scoring::score_entrant;
pub use settlement::{
    next_settlement_id, plan_settlement, EntrantAward, RoundPoints, Settlement, SettlementId,
    SettlementPlan, SettlementResult, MAX_ROUND_POINTS,
};

/// Re-export the decimal type used for prices
pub use rust_decimal::Decimal;
