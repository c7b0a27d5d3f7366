//! Record contract and row hydration

use chrono::{DateTime, Utc};

use tabula_content::{ContentError, ContentValues, Cursor, ID_COLUMN};

/// An application entity stored as one row of one table.
///
/// The internal id is assigned by the backend: `<= 0` means the record has
/// never been stored. `Default` is the zero-argument construction path used
/// when hydrating rows.
pub trait Record: Default + 'static {
    /// Content path of the table holding records of this type.
    fn content_path() -> &'static str;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// Fields to write, in column order. The id column is not included.
    fn to_content_values(&self, ctx: &WriteContext<'_>) -> ContentValues;

    /// Read application fields from the current row of `cursor`.
    fn fill_from_cursor(&mut self, cursor: &dyn Cursor) -> Result<(), ContentError>;

    /// Read the id column (when the result carries it), then the fields.
    fn populate_from(&mut self, cursor: &dyn Cursor) -> Result<(), ContentError> {
        if cursor.column_index(ID_COLUMN).is_some() {
            self.set_id(cursor.get_i64(ID_COLUMN)?);
        }
        self.fill_from_cursor(cursor)
    }

    fn is_stored(&self) -> bool {
        self.id() > 0
    }
}

/// What a record may consult while serializing itself for a write.
#[derive(Debug, Clone, Copy)]
pub struct WriteContext<'a> {
    authority: &'a str,
    timestamp: DateTime<Utc>,
}

impl<'a> WriteContext<'a> {
    pub fn new(authority: &'a str) -> Self {
        Self::at(authority, Utc::now())
    }

    pub fn at(authority: &'a str, timestamp: DateTime<Utc>) -> Self {
        Self {
            authority,
            timestamp,
        }
    }

    pub fn authority(&self) -> &'a str {
        self.authority
    }

    /// When the write was issued.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Build a new `R` from the current row of `cursor`.
pub fn hydrate<R: Record>(cursor: &dyn Cursor) -> Result<R, ContentError> {
    let mut record = R::default();
    record.populate_from(cursor)?;
    Ok(record)
}
