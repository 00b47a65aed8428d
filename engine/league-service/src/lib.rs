//! League Service - the fantasy league's write paths
//!
//! This crate wires the pure rules in `roster-core` to an injected `persistence::Store`.
//! Every operation reads the latest pushed snapshots, decides locally, and crosses
//! the store boundary at most once, as a single atomic batch.

pub mod config;
pub mod error;
pub mod finalize;
pub mod seed;
pub mod service;
pub mod state;
pub mod watcher;

pub use config::LeagueServiceConfig;
pub use error::{ErrorKind, LeagueError};
pub use service::{LeagueService, PriceChange};
pub use state::{LeagueState, Subscriptions};
pub use watcher::{LeagueView, LeagueWatcher};

// Re-export commonly used types
pub use roster_core::{
    Entrant, ItemKind, LeagueCatalog, PriceEdit, Roster, RoundPoints, Settlement,
    SettlementResult, ValidationError,
};

// Result type alias
pub type Result<T> = std::result::Result<T, LeagueError>;
