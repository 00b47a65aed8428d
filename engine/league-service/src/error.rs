//! Error types for LeagueService

use chrono::{DateTime, Utc};
use persistence::StoreError;
use roster_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeagueError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Store access denied: {0}")]
    AccessDenied(String),

    #[error("Writes blocked until store access is restored: {0}")]
    AccessBlocked(String),

    #[error("League changed since it was read, reload and try again: {0}")]
    StaleState(String),

    #[error("Rosters are locked since {deadline}")]
    RosterLocked { deadline: DateTime<Utc> },

    #[error("Entrant not found: {0}")]
    EntrantNotFound(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// How a failure should be reported to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally, nothing was written
    Validation,
    /// The store refuses us; stop and fix access
    Access,
    /// Someone else changed the league first
    Conflict,
    /// The write failed as a whole and may be retried by hand
    Transient,
}

impl LeagueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LeagueError::Validation(_)
            | LeagueError::RosterLocked { .. }
            | LeagueError::EntrantNotFound(_)
            | LeagueError::InvalidConfig { .. } => ErrorKind::Validation,
            LeagueError::AccessDenied(_) | LeagueError::AccessBlocked(_) => ErrorKind::Access,
            LeagueError::StaleState(_) => ErrorKind::Conflict,
            LeagueError::Store(_) | LeagueError::Serialization(_) => ErrorKind::Transient,
        }
    }
}

impl From<StoreError> for LeagueError {
    fn from(err: StoreError) -> Self {
        if err.is_access_denied() {
            return LeagueError::AccessDenied(err.to_string());
        }
        match err {
            StoreError::PreconditionFailed(msg) => LeagueError::StaleState(msg),
            other => LeagueError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_classification() {
        let err: LeagueError = StoreError::permission_denied("rules").into();
        assert_eq!(err.kind(), ErrorKind::Access);

        let err: LeagueError = StoreError::PreconditionFailed("version".into()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err: LeagueError = StoreError::unavailable("timeout").into();
        assert_eq!(err.kind(), ErrorKind::Transient);

        let err: LeagueError = ValidationError::MissingLabel.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Settlement label must not be blank");
    }
}
