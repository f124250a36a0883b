//! Facade-level error taxonomy.
//!
//! # Responsibility
//! - Give callers one typed error for every runtime-store operation.
//! - Separate recoverable validation rejections from persistence failures.
//!
//! # Invariants
//! - A validation error means nothing was applied, in memory or on disk.
//! - `Persistence` is only returned when the backing file refused an
//!   open/read/write; the in-memory tier is left as it was before the call.

use crate::model::entity::EntityKind;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Identity is not one of the seven known agents.
    UnknownAgent(String),
    /// Event is missing id/timestamp or names an unknown source.
    InvalidEvent(String),
    /// Notification draft is missing title/message/priority/source.
    InvalidNotification(String),
    /// Preference patch carries out-of-range values.
    InvalidPreferences(String),
    /// Update/delete referenced a durable entity that does not exist.
    NotFound { kind: EntityKind, id: Uuid },
    /// Backing-file open/read/write failure.
    Persistence(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAgent(identity) => write!(f, "unknown agent: `{identity}`"),
            Self::InvalidEvent(reason) => write!(f, "invalid event: {reason}"),
            Self::InvalidNotification(reason) => write!(f, "invalid notification: {reason}"),
            Self::InvalidPreferences(reason) => {
                write!(f, "invalid notification preferences: {reason}")
            }
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::Persistence(err) => write!(f, "persistence failure: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Persistence(other),
        }
    }
}

impl From<crate::db::DbError> for StoreError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Persistence(RepoError::Db(value))
    }
}

impl StoreError {
    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownAgent(_) => "unknown_agent",
            Self::InvalidEvent(_) => "invalid_event",
            Self::InvalidNotification(_) => "invalid_notification",
            Self::InvalidPreferences(_) => "invalid_preferences",
            Self::NotFound { .. } => "not_found",
            Self::Persistence(_) => "persistence_failure",
        }
    }
}
