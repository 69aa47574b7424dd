//! Type-safe identifiers for points of interest.
//!
//! Identifiers use Arc<str> so records and guesses can share them without
//! reallocating on every tick.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identifier of a stop or route. Unique within one POI snapshot.
#[derive(Clone, Debug)]
pub struct PoiIdentifier(Arc<str>);

impl PoiIdentifier {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for PoiIdentifier {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for PoiIdentifier {}

impl Hash for PoiIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for PoiIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PoiIdentifier {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for PoiIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<u64> for PoiIdentifier {
    fn from(id: u64) -> Self {
        Self::new(id.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PoiIdentifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PoiIdentifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}
