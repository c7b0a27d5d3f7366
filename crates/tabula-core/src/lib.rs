//! tabula Core
//!
//! Typed CRUD and query operations over any content `Backend`.
//! Record types declare the content path of their table; the storage facade
//! resolves it once per type, issues the backend call and hydrates rows back
//! into records.

mod config;
mod error;
mod record;
mod resolver;
mod storage;

pub use config::Config;
pub use error::CoreError;
pub use record::{hydrate, Record, WriteContext};
pub use resolver::AddressResolver;
pub use storage::{Storage, Upsert};

// Re-export the content contracts records and backends are written against
pub use tabula_content::{
    Backend, ContentError, ContentUri, ContentValues, Cursor, ObserverToken, RowSet, Selection,
    Value, ID_COLUMN,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging. Returns false if a global subscriber was already set.
pub fn init_logging() -> bool {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
