//! Common test utilities.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use tabula_core::{
    Backend, ContentError, ContentUri, ContentValues, Cursor, ObserverToken, Record, RowSet,
    Selection, Value, WriteContext, ID_COLUMN,
};

pub const AUTHORITY: &str = "com.example.people";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
}

impl Person {
    pub fn new(name: &str, age: Option<i64>) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            age,
        }
    }
}

impl Record for Person {
    fn content_path() -> &'static str {
        "people"
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_content_values(&self, _ctx: &WriteContext<'_>) -> ContentValues {
        ContentValues::new()
            .with("name", self.name.as_str())
            .with("age", self.age)
    }

    fn fill_from_cursor(&mut self, cursor: &dyn Cursor) -> Result<(), ContentError> {
        self.name = cursor.get_string("name")?;
        self.age = cursor.get_opt_i64("age")?;
        Ok(())
    }
}

/// Shares the `people` table but expects a column it never has.
#[derive(Debug, Default)]
pub struct Broken {
    pub id: i64,
    pub nickname: String,
}

impl Record for Broken {
    fn content_path() -> &'static str {
        "people"
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_content_values(&self, _ctx: &WriteContext<'_>) -> ContentValues {
        ContentValues::new().with("name", self.nickname.as_str())
    }

    fn fill_from_cursor(&mut self, cursor: &dyn Cursor) -> Result<(), ContentError> {
        self.nickname = cursor.get_string("nickname")?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Undeclared {
    pub id: i64,
}

impl Record for Undeclared {
    fn content_path() -> &'static str {
        ""
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn to_content_values(&self, _ctx: &WriteContext<'_>) -> ContentValues {
        ContentValues::new()
    }

    fn fill_from_cursor(&mut self, _cursor: &dyn Cursor) -> Result<(), ContentError> {
        Ok(())
    }
}

/// Cursor that counts its own release.
pub struct TrackedCursor {
    rows: RowSet,
    released: Arc<AtomicUsize>,
    forward_only: bool,
}

impl Cursor for TrackedCursor {
    fn count(&self) -> usize {
        self.rows.count()
    }

    fn position(&self) -> isize {
        self.rows.position()
    }

    fn move_to_first(&mut self) -> bool {
        self.rows.move_to_first()
    }

    fn move_to_next(&mut self) -> bool {
        self.rows.move_to_next()
    }

    fn move_to_previous(&mut self) -> bool {
        !self.forward_only && self.rows.move_to_previous()
    }

    fn column_names(&self) -> &[String] {
        self.rows.column_names()
    }

    fn value(&self, column: usize) -> Result<&Value, ContentError> {
        self.rows.value(column)
    }
}

impl Drop for TrackedCursor {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory backend double that records every call.
///
/// Filters support no clause or a single `column = ?` equality; ordering is
/// insertion order.
#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<ContentValues>>>,
    next_id: AtomicI64,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
    pub queries: AtomicUsize,
    pub opened: AtomicUsize,
    pub released: Arc<AtomicUsize>,
    pub notifications: Mutex<Vec<(String, Option<ObserverToken>)>>,
    no_cursor: bool,
    no_row_ids: bool,
    forward_only: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query answers with no cursor at all.
    pub fn without_cursors() -> Self {
        Self {
            no_cursor: true,
            ..Self::default()
        }
    }

    /// Inserts answer with the table URI instead of a row URI.
    pub fn without_row_ids() -> Self {
        Self {
            no_row_ids: true,
            ..Self::default()
        }
    }

    /// Cursors refuse to step backwards.
    pub fn forward_only() -> Self {
        Self {
            forward_only: true,
            ..Self::default()
        }
    }

    /// Store a row as-is, id included.
    pub fn insert_raw(&self, table: &str, row: ContentValues) {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn open_cursors(&self) -> usize {
        Self::count(&self.opened) - Self::count(&self.released)
    }

    fn table(uri: &ContentUri) -> String {
        uri.table().unwrap_or_default().to_string()
    }

    fn matches(row: &ContentValues, clause: Option<&str>, args: &[String]) -> bool {
        let Some(clause) = clause else {
            return true;
        };

        let column = clause
            .strip_suffix(" = ?")
            .unwrap_or_else(|| panic!("unsupported filter: {}", clause));

        let expected = &args[0];
        match row.get(column) {
            Some(Value::Integer(v)) => v.to_string() == *expected,
            Some(Value::Text(v)) => v == expected,
            _ => false,
        }
    }
}

impl Backend for MemoryBackend {
    type Cursor = TrackedCursor;

    fn query(
        &self,
        uri: &ContentUri,
        selection: &Selection,
    ) -> Result<Option<TrackedCursor>, ContentError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.no_cursor {
            return Ok(None);
        }

        let tables = self.tables.lock();
        let rows: Vec<&ContentValues> = tables
            .get(&Self::table(uri))
            .map(|rows| {
                rows.iter()
                    .filter(|r| Self::matches(r, selection.where_clause(), selection.args()))
                    .collect()
            })
            .unwrap_or_default();

        let mut columns = vec![ID_COLUMN.to_string()];
        if let Some(first) = rows.first() {
            columns.extend(first.keys().filter(|k| *k != ID_COLUMN).map(String::from));
        }

        let values: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(c).cloned().unwrap_or(Value::Null))
                    .collect::<Vec<_>>()
            })
            .collect();

        self.opened.fetch_add(1, Ordering::SeqCst);

        Ok(Some(TrackedCursor {
            rows: RowSet::with_rows(columns, values)?,
            released: Arc::clone(&self.released),
            forward_only: self.forward_only,
        }))
    }

    fn insert(&self, uri: &ContentUri, values: &ContentValues) -> Result<ContentUri, ContentError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut row = ContentValues::new().with(ID_COLUMN, id);
        for (key, value) in values.iter() {
            row.put(key, value.clone());
        }
        self.insert_raw(&Self::table(uri), row);

        if self.no_row_ids {
            Ok(uri.clone())
        } else {
            uri.with_appended_id(id)
        }
    }

    fn update(
        &self,
        uri: &ContentUri,
        values: &ContentValues,
        clause: Option<&str>,
        args: &[String],
    ) -> Result<usize, ContentError> {
        self.updates.fetch_add(1, Ordering::SeqCst);

        let mut tables = self.tables.lock();
        let mut count = 0;
        for row in tables.entry(Self::table(uri)).or_default() {
            if Self::matches(row, clause, args) {
                for (key, value) in values.iter() {
                    row.put(key, value.clone());
                }
                count += 1;
            }
        }
        Ok(count)
    }

    fn delete(
        &self,
        uri: &ContentUri,
        clause: Option<&str>,
        args: &[String],
    ) -> Result<usize, ContentError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);

        let mut tables = self.tables.lock();
        let rows = tables.entry(Self::table(uri)).or_default();
        let before = rows.len();
        rows.retain(|r| !Self::matches(r, clause, args));
        Ok(before - rows.len())
    }

    fn notify_change(&self, uri: &ContentUri, origin: Option<ObserverToken>) {
        self.notifications.lock().push((uri.to_string(), origin));
    }
}
