//! SQL statement building
//!
//! Identifiers are validated and double-quoted; every value travels as a
//! bound parameter. Where-clauses and order-by clauses are passed through as
//! written by the caller.

use tabula_content::{Selection, Value};

use crate::error::SqliteError;
use crate::Result;

pub fn quote_identifier(name: &str) -> Result<String> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest {
        return Err(SqliteError::InvalidIdentifier(name.to_string()));
    }

    Ok(format!("\"{}\"", name))
}

pub fn select(table: &str, selection: &Selection) -> Result<String> {
    let columns = match &selection.projection {
        Some(columns) if !columns.is_empty() => columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Result<Vec<_>>>()?
            .join(", "),
        _ => "*".to_string(),
    };

    let mut sql = format!("SELECT {} FROM {}", columns, quote_identifier(table)?);
    push_where(&mut sql, selection.where_clause());

    if let Some(order) = selection.order() {
        sql.push_str(" ORDER BY ");
        sql.push_str(order);
    }

    Ok(sql)
}

pub fn insert<'a>(table: &str, columns: impl Iterator<Item = &'a str>) -> Result<String> {
    let columns = columns.map(quote_identifier).collect::<Result<Vec<_>>>()?;
    let table = quote_identifier(table)?;

    if columns.is_empty() {
        return Ok(format!("INSERT INTO {} DEFAULT VALUES", table));
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    ))
}

pub fn update<'a>(
    table: &str,
    columns: impl Iterator<Item = &'a str>,
    clause: Option<&str>,
) -> Result<String> {
    let assignments = columns
        .map(|c| quote_identifier(c).map(|c| format!("{} = ?", c)))
        .collect::<Result<Vec<_>>>()?;

    if assignments.is_empty() {
        return Err(SqliteError::EmptyUpdate(table.to_string()));
    }

    let mut sql = format!(
        "UPDATE {} SET {}",
        quote_identifier(table)?,
        assignments.join(", ")
    );
    push_where(&mut sql, clause);
    Ok(sql)
}

pub fn delete(table: &str, clause: Option<&str>) -> Result<String> {
    let mut sql = format!("DELETE FROM {}", quote_identifier(table)?);
    push_where(&mut sql, clause);
    Ok(sql)
}

fn push_where(sql: &mut String, clause: Option<&str>) {
    if let Some(clause) = clause.filter(|c| !c.trim().is_empty()) {
        sql.push_str(" WHERE ");
        sql.push_str(clause);
    }
}

pub fn to_sql(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;

    match value {
        Value::Null => Sql::Null,
        Value::Integer(v) => Sql::Integer(*v),
        Value::Real(v) => Sql::Real(*v),
        Value::Text(v) => Sql::Text(v.clone()),
        Value::Blob(v) => Sql::Blob(v.clone()),
    }
}

pub fn from_sql(value: rusqlite::types::ValueRef<'_>) -> Value {
    use rusqlite::types::ValueRef;

    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        // SQLite does not enforce encoding; keep undecodable text as raw bytes
        ValueRef::Text(v) => match std::str::from_utf8(v) {
            Ok(text) => Value::Text(text.to_string()),
            Err(_) => Value::Blob(v.to_vec()),
        },
        ValueRef::Blob(v) => Value::Blob(v.to_vec()),
    }
}
