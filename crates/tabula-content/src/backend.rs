//! Backend contract
//!
//! Everything the storage facade needs from a tabular content store. Calls
//! are synchronous and treated as atomic: a backend either succeeds or
//! reports an error, there is no partial result.

use crate::cursor::Cursor;
use crate::selection::Selection;
use crate::uri::ContentUri;
use crate::value::ContentValues;
use crate::Result;

/// Identifies a registered change observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u64);

impl ObserverToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

pub trait Backend: Send + Sync {
    type Cursor: Cursor;

    /// Run a query against the table at `uri`.
    ///
    /// The cursor must support stepping backwards as well as forwards.
    /// `None` means the backend had nothing to hand back, which callers treat
    /// as an empty result.
    fn query(&self, uri: &ContentUri, selection: &Selection) -> Result<Option<Self::Cursor>>;

    /// Insert a row and return its row URI (`uri` with the new id appended).
    fn insert(&self, uri: &ContentUri, values: &ContentValues) -> Result<ContentUri>;

    fn update(
        &self,
        uri: &ContentUri,
        values: &ContentValues,
        clause: Option<&str>,
        args: &[String],
    ) -> Result<usize>;

    fn delete(&self, uri: &ContentUri, clause: Option<&str>, args: &[String]) -> Result<usize>;

    /// Tell observers of `uri` that its data changed, skipping `origin`.
    fn notify_change(&self, uri: &ContentUri, origin: Option<ObserverToken>);
}
