//! Opaque entity identifiers.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identifier for an entity.
///
/// An entity has no intrinsic payload. It exists only by virtue of being a
/// key in the attribute store or the relation index. Identifiers handed out
/// by the allocator have the form `<kind>-<counter>`, but any string is a
/// valid identifier.
///
/// Cloning is O(1).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityId(Arc<str>);

impl EntityId {
    /// Creates an identifier from an allocator kind and counter.
    #[must_use]
    pub fn allocated(kind: &str, counter: u64) -> Self {
        Self(format!("{kind}-{counter}").into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the kind prefix of an allocated identifier.
    ///
    /// This is the text before the last `-`. Identifiers without a `-`
    /// return the whole string.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.0.rsplit_once('-').map_or(&self.0, |(kind, _)| kind)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
