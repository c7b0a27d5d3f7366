//! tabula SQLite Backend
//!
//! SQLite-backed implementation of the content `Backend` contract.
//! Tables are addressed as `content://{authority}/{table}`; every table is
//! expected to carry an `_id INTEGER PRIMARY KEY` column, created by the
//! migrations the application supplies.

mod database;
mod error;
mod migrations;
mod observers;
mod sql;

pub use database::SqliteBackend;
pub use error::SqliteError;
pub use migrations::Migration;

pub type Result<T> = std::result::Result<T, SqliteError>;
