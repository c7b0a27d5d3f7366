//! Query selection: projection, where-clause with positional args, ordering

use crate::ID_COLUMN;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Columns to return; `None` means every column.
    pub projection: Option<Vec<String>>,
    /// SQL-like filter with `?` placeholders.
    pub clause: Option<String>,
    /// Values bound to the placeholders, in order.
    pub args: Vec<String>,
    pub order_by: Option<String>,
}

impl Selection {
    /// Every row, backend default order.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter<I, S>(clause: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            clause: Some(clause.into()),
            args: args.into_iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    /// `_id = ?` bound to `id`.
    pub fn by_id(id: i64) -> Self {
        Self::filter(format!("{} = ?", ID_COLUMN), [id])
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn where_clause(&self) -> Option<&str> {
        self.clause.as_deref()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn order(&self) -> Option<&str> {
        self.order_by.as_deref()
    }
}
