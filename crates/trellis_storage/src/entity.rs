//! Entity identifier allocation.
//!
//! The `EntityAllocator` hands out identifiers of the form `<kind>-<counter>`.
//! Each kind has its own counter starting at 1. Identifiers are never reused.

use std::collections::HashMap;

use trellis_foundation::EntityId;

/// Allocates unique entity identifiers per kind.
#[derive(Debug, Clone, Default)]
pub struct EntityAllocator {
    /// Last counter issued for each kind.
    counters: HashMap<String, u64>,
}

impl EntityAllocator {
    /// Creates a new allocator with every counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next identifier for `kind`.
    pub fn create(&mut self, kind: &str) -> EntityId {
        let counter = self.counters.entry(kind.to_string()).or_insert(0);
        *counter += 1;
        let id = EntityId::allocated(kind, *counter);
        tracing::trace!(entity = %id, "entity created");
        id
    }

    /// Returns the number of identifiers issued for `kind`.
    #[must_use]
    pub fn issued(&self, kind: &str) -> u64 {
        self.counters.get(kind).copied().unwrap_or(0)
    }
}
