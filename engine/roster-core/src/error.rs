//! Validation errors for roster and settlement rules

use crate::catalog::{CatalogId, ItemKind};
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias for rule checks
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Local, synchronous rule violations. None of these ever involve the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All {limit} {kind} slots are already filled")]
    QuotaExceeded { kind: ItemKind, limit: usize },

    #[error("Budget exceeded: roster costs {cost}, adding {price} would pass the cap of {budget}")]
    BudgetExceeded { cost: Decimal, price: Decimal, budget: Decimal },

    #[error("Settlement label must not be blank")]
    MissingLabel,

    #[error("Team name already taken: {0}")]
    DuplicateTeamName(String),

    #[error("Team name must not be blank")]
    BlankTeamName,

    #[error("Roster must have exactly 5 drivers and 2 constructors (has {drivers} and {constructors})")]
    IncompleteRoster { drivers: usize, constructors: usize },

    #[error("Unknown {kind} id: {id}")]
    UnknownItem { kind: ItemKind, id: CatalogId },

    #[error("Points for {kind} {id} out of range: {points} (limit ±{limit})")]
    PointsOutOfRange { kind: ItemKind, id: CatalogId, points: i64, limit: i64 },
}
