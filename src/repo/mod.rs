//! Query interface over the workspace database. Handlers and the table
//! engine consume these instead of touching SQL directly.

pub mod attendance;
pub mod homework;
pub mod submissions;
pub mod students;
pub mod timetable;
pub mod transport;
pub(crate) mod validate;

use crate::table::{Column, Record};
use rusqlite::ErrorCode;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl RepoError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        RepoError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RepoError::Validation { .. } => "bad_params",
            RepoError::NotFound(_) => "not_found",
            RepoError::Conflict(_) => "conflict",
            RepoError::Db(_) => "db_query_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            RepoError::Validation { field, .. } => Some(json!({ "field": field })),
            RepoError::NotFound(entity) => Some(json!({ "entity": entity })),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RepoError>;

/// Turns a unique-constraint failure into `Conflict(message)`.
pub(crate) fn conflict_on_unique(e: rusqlite::Error, message: &str) -> RepoError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == ErrorCode::ConstraintViolation
                && f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::Conflict(message.to_string())
        }
        _ => RepoError::Db(e),
    }
}

pub(crate) fn now_stamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

pub trait Repository {
    type Item;
    type Criteria;
    type Input;

    fn list(&self, criteria: &Self::Criteria) -> Result<Vec<Self::Item>>;
    fn create(&self, input: Self::Input) -> Result<Self::Item>;
}

/// Something that can be shown as a row in a data table.
pub trait Tabular {
    fn to_record(&self) -> Record;
    fn columns() -> Vec<Column>;
}

pub(crate) fn active_label(v: Option<&crate::table::Value>) -> String {
    match v {
        Some(crate::table::Value::Bool(true)) => "Active".to_string(),
        _ => "Inactive".to_string(),
    }
}
