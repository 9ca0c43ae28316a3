//! Pool data model and the stored-record wire encoding

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Placeholder url of the null photo, returned when nothing is available
pub const NO_PHOTO_URL: &str = "/static/no_photo.png";

/// Version tag written into every stored record
const RECORD_VERSION: u8 = 1;

/// One photo in the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    /// Opaque identifier, unique within the pool
    pub url: String,

    /// Remaining-shows budget; a record reaching 0 is evicted
    pub shows: u32,

    /// Category names this photo is tagged with (may be empty)
    pub categories: BTreeSet<String>,
}

/// On-wire form of a record; the `v` tag guards against stale encodings
#[derive(Serialize, Deserialize)]
struct StoredRecord {
    v: u8,
    url: String,
    shows: u32,
    categories: BTreeSet<String>,
}

impl PhotoRecord {
    /// Build a record from parts
    pub fn new(url: impl Into<String>, shows: u32, categories: BTreeSet<String>) -> Self {
        Self {
            url: url.into(),
            shows,
            categories,
        }
    }

    /// The null photo: placeholder url, no shows, no categories.
    ///
    /// Signals "nothing available" to callers; it is never stored.
    pub fn null_object() -> Self {
        Self {
            url: NO_PHOTO_URL.to_string(),
            shows: 0,
            categories: BTreeSet::new(),
        }
    }

    /// Whether this is the null photo
    pub fn is_null(&self) -> bool {
        self.url == NO_PHOTO_URL
    }

    /// Serialize for the photo table
    pub fn encode(&self) -> Result<String> {
        let stored = StoredRecord {
            v: RECORD_VERSION,
            url: self.url.clone(),
            shows: self.shows,
            categories: self.categories.clone(),
        };
        serde_json::to_string(&stored).map_err(|e| Error::Record(e.to_string()))
    }

    /// Reconstruct a record from its stored form, rejecting unknown versions
    pub fn decode(raw: &str) -> Result<Self> {
        let stored: StoredRecord =
            serde_json::from_str(raw).map_err(|e| Error::Record(e.to_string()))?;
        if stored.v != RECORD_VERSION {
            return Err(Error::Record(format!(
                "unsupported record version {}",
                stored.v
            )));
        }
        Ok(Self {
            url: stored.url,
            shows: stored.shows,
            categories: stored.categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_encode_decode() {
        let record = PhotoRecord::new("a.png", 2, categories(&["cats", "dogs"]));
        let decoded = PhotoRecord::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let raw = r#"{"v":99,"url":"a.png","shows":1,"categories":[]}"#;
        assert!(matches!(PhotoRecord::decode(raw), Err(Error::Record(_))));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            PhotoRecord::decode("PhotoRecord { url: 'a.png' }"),
            Err(Error::Record(_))
        ));
    }

    #[test]
    fn test_null_object() {
        let null = PhotoRecord::null_object();
        assert!(null.is_null());
        assert_eq!(null.url, NO_PHOTO_URL);
        assert_eq!(null.shows, 0);
        assert!(null.categories.is_empty());

        let real = PhotoRecord::new("a.png", 1, BTreeSet::new());
        assert!(!real.is_null());
    }
}
