//! tabula Content Contracts
//!
//! The vocabulary shared by the storage facade and every backend:
//! - `ContentUri` addresses a table (`content://authority/path`) or a row
//! - `ContentValues` is the ordered field map a record writes
//! - `Cursor` is the positionable row handle a query returns
//! - `Backend` is the query/insert/update/delete/notify surface

mod backend;
mod cursor;
mod error;
mod selection;
mod uri;
mod value;

pub use backend::{Backend, ObserverToken};
pub use cursor::{Cursor, RowSet};
pub use error::ContentError;
pub use selection::Selection;
pub use uri::{ContentUri, SCHEME};
pub use value::{ContentValues, Value};

/// Column holding the backend-assigned internal id of every row.
pub const ID_COLUMN: &str = "_id";

pub type Result<T> = std::result::Result<T, ContentError>;
