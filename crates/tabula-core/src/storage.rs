//! Storage facade
//!
//! Typed record operations over a content backend. Each call resolves the
//! record type's table URI, issues one backend call and, for reads, hydrates
//! rows into records. Cursors opened here are dropped before the call
//! returns; only `get_as_cursor` hands one to the caller.

use std::any::type_name;

use tabula_content::{Backend, ContentError, ContentUri, Cursor, ObserverToken, Selection};

use crate::config::Config;
use crate::error::CoreError;
use crate::record::{hydrate, Record, WriteContext};
use crate::resolver::AddressResolver;
use crate::Result;

/// Outcome of `Storage::add_or_update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

impl Upsert {
    pub fn was_inserted(&self) -> bool {
        matches!(self, Upsert::Inserted)
    }
}

pub struct Storage<B: Backend> {
    backend: B,
    resolver: AddressResolver,
}

impl<B: Backend> Storage<B> {
    pub fn new(backend: B, config: &Config) -> Result<Self> {
        Self::with_authority(backend, config.authority.as_str())
    }

    pub fn with_authority(backend: B, authority: &str) -> Result<Self> {
        Ok(Self {
            backend,
            resolver: AddressResolver::new(authority)?,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    /// Table URI records of type `R` live at.
    pub fn uri_for<R: Record>(&self) -> Result<ContentUri> {
        self.resolver.uri_for::<R>()
    }

    /// Insert `record` and store the backend-assigned id on it.
    pub fn add<R: Record>(&self, record: &mut R) -> Result<()> {
        let uri = self.resolver.uri_for::<R>()?;
        let values = record.to_content_values(&WriteContext::new(self.resolver.authority()));

        let row_uri = self.backend.insert(&uri, &values)?;
        let id = row_uri
            .parse_id()
            .filter(|id| *id > 0)
            .ok_or_else(|| ContentError::MissingId(row_uri.to_string()))?;

        record.set_id(id);

        tracing::debug!(uri = %uri, id, "Added record");

        Ok(())
    }

    /// Write `record` over its stored row. Returns the number of rows
    /// updated, which exceeds 1 only if the table holds duplicate ids.
    pub fn update<R: Record>(&self, record: &R) -> Result<usize> {
        if !record.is_stored() {
            return Err(CoreError::InvalidState(format!(
                "{} with internal id {} can not be updated because it was never stored",
                type_name::<R>(),
                record.id()
            )));
        }

        let uri = self.resolver.uri_for::<R>()?;
        let values = record.to_content_values(&WriteContext::new(self.resolver.authority()));
        let selection = Selection::by_id(record.id());

        let count = self.backend.update(
            &uri,
            &values,
            selection.where_clause(),
            selection.args(),
        )?;

        tracing::debug!(uri = %uri, id = record.id(), count, "Updated record");

        Ok(count)
    }

    pub fn add_or_update<R: Record>(&self, record: &mut R) -> Result<Upsert> {
        if record.is_stored() {
            self.update(record)?;
            Ok(Upsert::Updated)
        } else {
            self.add(record)?;
            Ok(Upsert::Inserted)
        }
    }

    pub fn get_by_internal_id<R: Record>(&self, id: i64) -> Result<Option<R>> {
        self.get_first(&Selection::by_id(id))
    }

    /// Every matching record, in cursor order. Never fails on an empty result.
    pub fn get_as_list<R: Record>(&self, selection: &Selection) -> Result<Vec<R>> {
        let Some(mut cursor) = self.get_as_cursor::<R>(selection)? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::with_capacity(cursor.count());

        if cursor.move_to_first() {
            loop {
                records.push(hydrate::<R>(&cursor)?);
                if !cursor.move_to_next() {
                    break;
                }
            }
        }

        tracing::debug!(
            record = type_name::<R>(),
            count = records.len(),
            "Loaded records"
        );

        Ok(records)
    }

    /// Every record of type `R`, backend default order.
    pub fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        self.get_as_list(&Selection::all())
    }

    /// Raw query result for `R`'s table.
    ///
    /// The caller owns the returned cursor and releases it by dropping it.
    pub fn get_as_cursor<R: Record>(&self, selection: &Selection) -> Result<Option<B::Cursor>> {
        let uri = self.resolver.uri_for::<R>()?;
        Ok(self.backend.query(&uri, selection)?)
    }

    pub fn get_first<R: Record>(&self, selection: &Selection) -> Result<Option<R>> {
        let Some(mut cursor) = self.get_as_cursor::<R>(selection)? else {
            return Ok(None);
        };

        if !cursor.move_to_first() {
            return Ok(None);
        }

        Ok(Some(hydrate(&cursor)?))
    }

    pub fn get_first_of<R: Record>(&self) -> Result<Option<R>> {
        self.get_first(&Selection::all())
    }

    /// Last record of the result.
    ///
    /// Walks forward until the cursor is exhausted and steps back once, so
    /// it needs nothing from the backend beyond single-step movement in both
    /// directions. A cursor that refuses to step back is a backend defect.
    pub fn get_last<R: Record>(&self, selection: &Selection) -> Result<Option<R>> {
        let Some(mut cursor) = self.get_as_cursor::<R>(selection)? else {
            return Ok(None);
        };

        if !cursor.move_to_first() {
            return Ok(None);
        }

        while cursor.move_to_next() {}

        if !cursor.move_to_previous() {
            return Err(ContentError::NotPositioned.into());
        }

        Ok(Some(hydrate(&cursor)?))
    }

    pub fn get_last_of<R: Record>(&self) -> Result<Option<R>> {
        self.get_last(&Selection::all())
    }

    /// Delete the row(s) carrying `record`'s id.
    ///
    /// Returns the number of rows removed: 0, 1, or more if several rows
    /// share the id.
    pub fn remove<R: Record>(&self, record: &R) -> Result<usize> {
        self.remove_where::<R>(&Selection::by_id(record.id()))
    }

    /// Delete every row of `R`'s table matching `selection`. Projection and
    /// ordering are ignored.
    pub fn remove_where<R: Record>(&self, selection: &Selection) -> Result<usize> {
        let uri = self.resolver.uri_for::<R>()?;
        let count = self
            .backend
            .delete(&uri, selection.where_clause(), selection.args())?;

        tracing::debug!(uri = %uri, count, "Removed records");

        Ok(count)
    }

    pub fn remove_all_of_type<R: Record>(&self) -> Result<usize> {
        self.remove_where::<R>(&Selection::all())
    }

    /// Whether a row with `record`'s id is stored.
    pub fn contains<R: Record>(&self, record: &R) -> Result<bool> {
        Ok(self
            .get_as_cursor::<R>(&Selection::by_id(record.id()))?
            .is_some_and(|mut cursor| cursor.move_to_first()))
    }

    pub fn count_of_items<R: Record>(&self) -> Result<usize> {
        Ok(self
            .get_as_cursor::<R>(&Selection::all())?
            .map_or(0, |cursor| cursor.count()))
    }

    /// Tell the backend `R`'s table changed. `origin`, if given, is the
    /// observer that made the change and is left out of the notification.
    pub fn notify_change<R: Record>(&self, origin: Option<ObserverToken>) -> Result<()> {
        let uri = self.resolver.uri_for::<R>()?;
        self.backend.notify_change(&uri, origin);
        Ok(())
    }
}

impl<B: Backend + Clone> Clone for Storage<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            resolver: self.resolver.clone(),
        }
    }
}
