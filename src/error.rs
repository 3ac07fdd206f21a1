//! Error types for the library.
//!
//! Loader failures name the offending file and abort the whole batch.
//! Team failures split into user-input errors, which are reported and never
//! reach the database, and store errors.

use std::path::PathBuf;

/// Missing or unusable database location. Fatal at startup.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("no database configured: pass --database or set DB_URL")]
    MissingDatabase,

    #[error("invalid database location '{0}'")]
    InvalidDatabase(String),
}

/// Errors that abort a loader run. Nothing from the run is persisted.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read data directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {file:?}: {source}")]
    ReadFile {
        file: PathBuf,
        source: std::io::Error,
    },

    /// Malformed JSON or a missing required key
    #[error("invalid monster document {file:?}: {source}")]
    Document {
        file: PathBuf,
        source: serde_json::Error,
    },

    #[error("duplicate monster slug '{slug}' in {file:?}")]
    DuplicateSlug { file: PathBuf, slug: String },

    #[error("database error while loading {file:?}: {source}")]
    Database {
        file: PathBuf,
        source: rusqlite::Error,
    },

    /// Opening or committing the batch transaction failed
    #[error("load transaction failed: {0}")]
    Transaction(#[from] rusqlite::Error),
}

/// Team builder errors.
#[derive(thiserror::Error, Debug)]
pub enum TeamError {
    #[error("team name must not be empty")]
    EmptyName,

    #[error("a team needs at least one monster")]
    NoMembers,

    #[error("a team may have at most {max} monsters")]
    TooManyMembers { max: usize },

    #[error("unknown monster '{0}'")]
    UnknownMonster(String),

    #[error("team {0} not found")]
    NotFound(i64),

    #[error("team storage error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl TeamError {
    /// True for errors caused by the user's input rather than storage
    pub fn is_user_error(&self) -> bool {
        !matches!(self, TeamError::Store(_))
    }
}
