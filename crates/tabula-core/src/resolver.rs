//! Address resolution
//!
//! Maps a record type to the content path it declares, validated once and
//! cached per type for the life of the resolver, and composes the full table
//! URI under the configured authority.

use parking_lot::RwLock;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tabula_content::ContentUri;

use crate::error::CoreError;
use crate::record::Record;
use crate::Result;

pub struct AddressResolver {
    authority: String,
    /// Record type -> validated content path
    cache: Arc<RwLock<HashMap<TypeId, &'static str>>>,
}

impl AddressResolver {
    pub fn new(authority: impl Into<String>) -> Result<Self> {
        let authority = authority.into();

        if authority.trim().is_empty() {
            return Err(CoreError::Configuration(
                "content authority cannot be empty".to_string(),
            ));
        }

        let root = ContentUri::for_path(&authority, "").map_err(|e| {
            CoreError::Configuration(format!("unusable content authority {:?}: {}", authority, e))
        })?;

        // Must come back unchanged as the host of a bare root URI
        if root.authority() != authority || !root.segments().is_empty() {
            return Err(CoreError::Configuration(format!(
                "content authority {:?} is not a bare host name",
                authority
            )));
        }

        Ok(Self {
            authority,
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Content path declared by `R`.
    ///
    /// The declaration is read and validated on first use only; later calls
    /// are served from the cache.
    pub fn resolve<R: Record>(&self) -> Result<&'static str> {
        let key = TypeId::of::<R>();

        if let Some(path) = self.cache.read().get(&key).copied() {
            return Ok(path);
        }

        // Racing threads may both validate; the value is the same either way
        let declared = validate_content_path(type_name::<R>(), R::content_path())?;
        let path = *self.cache.write().entry(key).or_insert(declared);

        tracing::debug!(
            record = type_name::<R>(),
            content_path = path,
            "Resolved content path"
        );

        Ok(path)
    }

    /// Table URI for `R`: `content://{authority}/{content_path}`.
    pub fn uri_for<R: Record>(&self) -> Result<ContentUri> {
        let path = self.resolve::<R>()?;
        Ok(ContentUri::for_path(&self.authority, path)?)
    }

    /// Number of record types resolved so far.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }
}

impl Clone for AddressResolver {
    fn clone(&self) -> Self {
        Self {
            authority: self.authority.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

fn validate_content_path(record: &str, path: &'static str) -> Result<&'static str> {
    if path.is_empty() {
        return Err(CoreError::Configuration(format!(
            "{} does not declare a content path",
            record
        )));
    }

    let valid = !matches!(path, "." | "..")
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if !valid {
        return Err(CoreError::Configuration(format!(
            "{} declares invalid content path {:?}",
            record, path
        )));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::WriteContext;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tabula_content::{ContentError, ContentValues, Cursor};

    macro_rules! test_record {
        ($name:ident, $path:expr) => {
            test_record!($name, $path, |_| {});
        };
        ($name:ident, $path:expr, $on_read:expr) => {
            #[derive(Default)]
            struct $name {
                id: i64,
            }

            impl Record for $name {
                fn content_path() -> &'static str {
                    ($on_read)(());
                    $path
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

                fn fill_from_cursor(
                    &mut self,
                    _cursor: &dyn Cursor,
                ) -> std::result::Result<(), ContentError> {
                    Ok(())
                }
            }
        };
    }

    static COUNTED_READS: AtomicUsize = AtomicUsize::new(0);

    test_record!(Counted, "counted", |_| {
        COUNTED_READS.fetch_add(1, Ordering::SeqCst);
    });
    test_record!(Person, "people");
    test_record!(Note, "notes");
    test_record!(Undeclared, "");
    test_record!(Nested, "people/archive");
    test_record!(Spaced, "my people");
    test_record!(Current, ".");
    test_record!(Parent, "..");
    test_record!(Dotted, "people.v2");

    #[test]
    fn test_resolve_reads_declaration_once() {
        let resolver = AddressResolver::new("com.example.app").unwrap();

        assert_eq!(resolver.resolve::<Counted>().unwrap(), "counted");
        assert_eq!(resolver.resolve::<Counted>().unwrap(), "counted");
        assert_eq!(COUNTED_READS.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached_len(), 1);
    }

    #[test]
    fn test_uri_for() {
        let resolver = AddressResolver::new("com.example.app").unwrap();
        let uri = resolver.uri_for::<Note>().unwrap();
        assert_eq!(uri.as_str(), "content://com.example.app/notes");
    }

    #[test]
    fn test_invalid_declarations() {
        let resolver = AddressResolver::new("com.example.app").unwrap();

        assert!(matches!(
            resolver.resolve::<Undeclared>(),
            Err(CoreError::Configuration(_))
        ));
        assert!(matches!(
            resolver.resolve::<Nested>(),
            Err(CoreError::Configuration(_))
        ));
        assert!(matches!(
            resolver.uri_for::<Spaced>(),
            Err(CoreError::Configuration(_))
        ));

        // Dot segments would be normalised out of the URI, leaving no table
        assert!(matches!(
            resolver.uri_for::<Current>(),
            Err(CoreError::Configuration(_))
        ));
        assert!(matches!(
            resolver.uri_for::<Parent>(),
            Err(CoreError::Configuration(_))
        ));
        assert_eq!(resolver.cached_len(), 0);

        let uri = resolver.uri_for::<Dotted>().unwrap();
        assert_eq!(uri.table(), Some("people.v2"));
    }

    #[test]
    fn test_invalid_authority() {
        assert!(matches!(
            AddressResolver::new("  "),
            Err(CoreError::Configuration(_))
        ));
        assert!(matches!(
            AddressResolver::new("bad authority"),
            Err(CoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_authority_must_be_bare_host() {
        for authority in [
            "com.example.app/extra",
            "com.example.app:8080",
            "user@com.example.app",
        ] {
            assert!(
                matches!(
                    AddressResolver::new(authority),
                    Err(CoreError::Configuration(_))
                ),
                "accepted {}",
                authority
            );
        }

        let resolver = AddressResolver::new("com.example.app").unwrap();
        assert_eq!(
            resolver.uri_for::<Person>().unwrap().table(),
            Some("people")
        );
    }

    #[test]
    fn test_concurrent_resolution() {
        let resolver = Arc::new(AddressResolver::new("com.example.app").unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let resolver = Arc::clone(&resolver);
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| {
                            if i % 2 == 0 {
                                resolver.uri_for::<Note>().unwrap().to_string()
                            } else {
                                resolver.resolve::<Person>().unwrap().to_string()
                            }
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let expected = if i % 2 == 0 {
                "content://com.example.app/notes"
            } else {
                "people"
            };
            assert!(handle.join().unwrap().iter().all(|v| v == expected));
        }

        assert_eq!(resolver.cached_len(), 2);
    }
}
