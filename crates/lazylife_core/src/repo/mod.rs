//! Durable entity store: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the durable tier.
//! - Isolate SQL details from the facade.
//!
//! # Invariants
//! - Every write executes against the backing file before returning
//!   (write-through, no buffering).
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::entity::{EntityId, EntityKind};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod entity_repo;
pub mod settings_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for durable persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound { kind: EntityKind, id: EntityId },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
