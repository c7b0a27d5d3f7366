//! Content error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Invalid content URI: {0}")]
    InvalidUri(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column {column} holds {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Cursor is not positioned on a row")]
    NotPositioned,

    #[error("Row has {found} values but the cursor has {expected} columns")]
    RowWidth { expected: usize, found: usize },

    #[error("Backend returned no row id for insert into {0}")]
    MissingId(String),

    #[error("Backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ContentError {
    /// Wrap a backend-specific failure, keeping it as the error source.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ContentError::Backend(Box::new(err))
    }
}
