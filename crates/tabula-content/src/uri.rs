//! Content URIs
//!
//! A table lives at `content://{authority}/{path}`; a single row at
//! `content://{authority}/{path}/{id}`.

use url::Url;

use crate::error::ContentError;
use crate::Result;

pub const SCHEME: &str = "content";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri(Url);

impl ContentUri {
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)
            .map_err(|e| ContentError::InvalidUri(format!("{}: {}", input, e)))?;

        if url.scheme() != SCHEME {
            return Err(ContentError::InvalidUri(format!(
                "{}: scheme must be {}",
                input, SCHEME
            )));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(ContentError::InvalidUri(format!(
                "{}: missing authority",
                input
            )));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(ContentError::InvalidUri(format!(
                "{}: query and fragment are not allowed",
                input
            )));
        }

        Ok(Self(url))
    }

    /// Build the table URI for `path` under `authority`.
    pub fn for_path(authority: &str, path: &str) -> Result<Self> {
        Self::parse(&format!("{}://{}/{}", SCHEME, authority, path))
    }

    pub fn authority(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// Non-empty path segments, in order.
    pub fn segments(&self) -> Vec<&str> {
        self.0
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// The table this URI points into (its first path segment).
    pub fn table(&self) -> Option<&str> {
        self.segments().first().copied()
    }

    /// Row URI for `id` under this URI.
    pub fn with_appended_id(&self, id: i64) -> Result<Self> {
        Self::parse(&format!("{}/{}", self.0.as_str().trim_end_matches('/'), id))
    }

    /// Parse the last path segment as a row id.
    pub fn parse_id(&self) -> Option<i64> {
        self.segments().last().and_then(|s| s.parse().ok())
    }

    /// True when `other` lives strictly below this URI.
    pub fn is_ancestor_of(&self, other: &ContentUri) -> bool {
        if self.authority() != other.authority() {
            return false;
        }

        let mine = self.segments();
        let theirs = other.segments();
        theirs.len() > mine.len() && theirs.starts_with(&mine)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ContentUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentUri {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
