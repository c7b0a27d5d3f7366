//! SQLite backend error types

use tabula_content::ContentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("URI {0} does not name a table")]
    MissingTable(String),

    #[error("URI {uri} belongs to authority {found}, backend serves {expected}")]
    ForeignAuthority {
        uri: String,
        expected: String,
        found: String,
    },

    #[error("Update of {0} has no values to set")]
    EmptyUpdate(String),

    #[error("Migration version {0} is declared twice")]
    DuplicateMigration(i32),

    #[error("Migration v{version} failed: {source}")]
    Migration {
        version: i32,
        #[source]
        source: rusqlite::Error,
    },
}

impl From<SqliteError> for ContentError {
    fn from(err: SqliteError) -> Self {
        ContentError::backend(err)
    }
}
