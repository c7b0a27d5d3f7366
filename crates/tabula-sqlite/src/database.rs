//! Database connection and content backend operations

use parking_lot::Mutex;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::sync::Arc;

use tabula_content::{
    Backend, ContentUri, ContentValues, ObserverToken, RowSet, Selection, Value,
};

use crate::error::SqliteError;
use crate::migrations::{run_migrations, Migration};
use crate::observers::ObserverRegistry;
use crate::sql;
use crate::Result;

pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
    authority: String,
    observers: ObserverRegistry,
}

impl SqliteBackend {
    pub fn open<P: AsRef<Path>>(
        path: P,
        authority: impl Into<String>,
        migrations: &[Migration],
    ) -> Result<Self> {
        let mut conn = Connection::open(path)?;

        // Enable foreign keys
        conn.pragma_update(None, "foreign_keys", "ON")?;

        // WAL mode for better concurrent performance
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&mut conn, migrations)?;

        Ok(Self::from_connection(conn, authority.into()))
    }

    pub fn open_in_memory(authority: impl Into<String>, migrations: &[Migration]) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        run_migrations(&mut conn, migrations)?;

        Ok(Self::from_connection(conn, authority.into()))
    }

    fn from_connection(conn: Connection, authority: String) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            authority,
            observers: ObserverRegistry::default(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Register `callback` for changes to `uri`, and to every URI below it
    /// when `notify_for_descendants` is set.
    pub fn register_observer<F>(
        &self,
        uri: &ContentUri,
        notify_for_descendants: bool,
        callback: F,
    ) -> ObserverToken
    where
        F: Fn(&ContentUri) + Send + Sync + 'static,
    {
        self.observers
            .register(uri.clone(), notify_for_descendants, Arc::new(callback))
    }

    pub fn unregister_observer(&self, token: ObserverToken) -> bool {
        self.observers.unregister(token)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.count()
    }

    /// Table named by `uri`, checked against this backend's authority.
    fn table_of<'u>(&self, uri: &'u ContentUri) -> Result<&'u str> {
        if uri.authority() != self.authority {
            return Err(SqliteError::ForeignAuthority {
                uri: uri.to_string(),
                expected: self.authority.clone(),
                found: uri.authority().to_string(),
            });
        }

        uri.table()
            .ok_or_else(|| SqliteError::MissingTable(uri.to_string()))
    }

    fn run_query(&self, table: &str, selection: &Selection) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
        let sql = sql::select(table, selection)?;

        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

            let mut rows = stmt.query(params_from_iter(selection.args()))?;
            let mut values = Vec::new();
            while let Some(row) = rows.next()? {
                let mut record = Vec::with_capacity(columns.len());
                for index in 0..columns.len() {
                    record.push(sql::from_sql(row.get_ref(index)?));
                }
                values.push(record);
            }

            Ok((columns, values))
        })
    }
}

impl Backend for SqliteBackend {
    type Cursor = RowSet;

    fn query(
        &self,
        uri: &ContentUri,
        selection: &Selection,
    ) -> tabula_content::Result<Option<RowSet>> {
        let table = self.table_of(uri)?;
        let (columns, rows) = self.run_query(table, selection)?;

        tracing::trace!(uri = %uri, rows = rows.len(), "Query");

        Ok(Some(RowSet::with_rows(columns, rows)?))
    }

    fn insert(
        &self,
        uri: &ContentUri,
        values: &ContentValues,
    ) -> tabula_content::Result<ContentUri> {
        let table = self.table_of(uri)?;
        let sql = sql::insert(table, values.keys())?;

        let id = self.with_connection(|conn| {
            conn.execute(&sql, params_from_iter(values.values().map(sql::to_sql)))?;
            Ok(conn.last_insert_rowid())
        })?;

        tracing::trace!(uri = %uri, id, "Insert");

        ContentUri::for_path(&self.authority, table)?.with_appended_id(id)
    }

    fn update(
        &self,
        uri: &ContentUri,
        values: &ContentValues,
        clause: Option<&str>,
        args: &[String],
    ) -> tabula_content::Result<usize> {
        let table = self.table_of(uri)?;
        let sql = sql::update(table, values.keys(), clause)?;

        let params = values
            .values()
            .map(sql::to_sql)
            .chain(args.iter().map(|a| rusqlite::types::Value::Text(a.clone())));

        let count = self.with_connection(|conn| Ok(conn.execute(&sql, params_from_iter(params))?))?;

        tracing::trace!(uri = %uri, count, "Update");

        Ok(count)
    }

    fn delete(
        &self,
        uri: &ContentUri,
        clause: Option<&str>,
        args: &[String],
    ) -> tabula_content::Result<usize> {
        let table = self.table_of(uri)?;
        let sql = sql::delete(table, clause)?;

        let count = self.with_connection(|conn| Ok(conn.execute(&sql, params_from_iter(args))?))?;

        tracing::trace!(uri = %uri, count, "Delete");

        Ok(count)
    }

    fn notify_change(&self, uri: &ContentUri, origin: Option<ObserverToken>) {
        let notified = self.observers.notify(uri, origin);
        tracing::trace!(uri = %uri, notified, "Notified observers");
    }
}

impl Clone for SqliteBackend {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            authority: self.authority.clone(),
            observers: self.observers.clone(),
        }
    }
}
