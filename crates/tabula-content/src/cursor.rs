//! Row handles
//!
//! A cursor starts before the first row (position -1). Stepping past the last
//! row leaves it after the last row (position == count) and reports `false`;
//! stepping back from there lands on the last row. Dropping a cursor releases
//! it.

use crate::error::ContentError;
use crate::value::Value;
use crate::Result;

pub trait Cursor {
    /// Number of rows in the result.
    fn count(&self) -> usize;

    /// Current position: -1 before the first row, `count` after the last.
    fn position(&self) -> isize;

    fn move_to_first(&mut self) -> bool;

    fn move_to_next(&mut self) -> bool;

    fn move_to_previous(&mut self) -> bool;

    fn column_names(&self) -> &[String];

    /// Value at `column` of the current row.
    fn value(&self, column: usize) -> Result<&Value>;

    fn column_count(&self) -> usize {
        self.column_names().len()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names().iter().position(|c| c == name)
    }

    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn get(&self, name: &str) -> Result<&Value> {
        let index = self
            .column_index(name)
            .ok_or_else(|| ContentError::ColumnNotFound(name.to_string()))?;
        self.value(index)
    }

    fn get_i64(&self, name: &str) -> Result<i64> {
        self.get_opt_i64(name)?
            .ok_or_else(|| mismatch(name, "integer", &Value::Null))
    }

    fn get_opt_i64(&self, name: &str) -> Result<Option<i64>> {
        match self.get(name)? {
            Value::Null => Ok(None),
            Value::Integer(v) => Ok(Some(*v)),
            other => Err(mismatch(name, "integer", other)),
        }
    }

    fn get_f64(&self, name: &str) -> Result<f64> {
        self.get_opt_f64(name)?
            .ok_or_else(|| mismatch(name, "real", &Value::Null))
    }

    fn get_opt_f64(&self, name: &str) -> Result<Option<f64>> {
        match self.get(name)? {
            Value::Null => Ok(None),
            other => other
                .as_f64()
                .map(Some)
                .ok_or_else(|| mismatch(name, "real", other)),
        }
    }

    fn get_string(&self, name: &str) -> Result<String> {
        self.get_opt_string(name)?
            .ok_or_else(|| mismatch(name, "text", &Value::Null))
    }

    fn get_opt_string(&self, name: &str) -> Result<Option<String>> {
        match self.get(name)? {
            Value::Null => Ok(None),
            Value::Text(v) => Ok(Some(v.clone())),
            other => Err(mismatch(name, "text", other)),
        }
    }

    /// Integers read as booleans; zero is false.
    fn get_bool(&self, name: &str) -> Result<bool> {
        self.get_i64(name).map(|v| v != 0)
    }

    fn get_blob(&self, name: &str) -> Result<Vec<u8>> {
        match self.get(name)? {
            Value::Blob(v) => Ok(v.clone()),
            other => Err(mismatch(name, "blob", other)),
        }
    }
}

fn mismatch(column: &str, expected: &'static str, found: &Value) -> ContentError {
    ContentError::TypeMismatch {
        column: column.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// Fully materialized query result.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    position: isize,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            position: -1,
        }
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut set = Self::new(columns);
        for row in rows {
            set.push_row(row)?;
        }
        Ok(set)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ContentError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Move to `position`, clamping to the before-first/after-last slots.
    pub fn move_to(&mut self, position: isize) -> bool {
        let count = self.rows.len() as isize;

        if position >= count {
            self.position = count;
            false
        } else if position < 0 {
            self.position = -1;
            false
        } else {
            self.position = position;
            true
        }
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

impl Cursor for RowSet {
    fn count(&self) -> usize {
        self.rows.len()
    }

    fn position(&self) -> isize {
        self.position
    }

    fn move_to_first(&mut self) -> bool {
        self.move_to(0)
    }

    fn move_to_next(&mut self) -> bool {
        self.move_to(self.position + 1)
    }

    fn move_to_previous(&mut self) -> bool {
        self.move_to(self.position - 1)
    }

    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn value(&self, column: usize) -> Result<&Value> {
        let row = usize::try_from(self.position)
            .ok()
            .and_then(|p| self.rows.get(p))
            .ok_or(ContentError::NotPositioned)?;

        row.get(column)
            .ok_or_else(|| ContentError::ColumnNotFound(format!("#{}", column)))
    }
}
