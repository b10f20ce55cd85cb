//! Multi-valued attribute storage.
//!
//! Attributes are stored as `kind -> entity -> [values]`. Each list keeps
//! insertion order and may hold duplicates. Both map levels keep insertion
//! order as well, so entity queries return entities in the order they first
//! received an attribute of that kind.
//!
//! A list that becomes empty is removed outright: an absent key and an empty
//! list are the same observable state.

use indexmap::IndexMap;

use trellis_foundation::{Criteria, EntityId, Value};

/// Stores every attribute value for every entity.
#[derive(Clone, Debug, Default)]
pub struct AttributeStore {
    /// Attribute data: kind -> entity -> ordered values.
    data: IndexMap<String, IndexMap<EntityId, Vec<Value>>>,
}

impl AttributeStore {
    /// Creates a new empty attribute store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to the list for `(kind, entity)`.
    pub fn add(&mut self, entity: &EntityId, kind: &str, value: Value) {
        tracing::trace!(%entity, kind, ?value, "attribute added");
        self.data
            .entry(kind.to_string())
            .or_default()
            .entry(entity.clone())
            .or_default()
            .push(value);
    }

    /// Gets the value at `index`, or `None` if the slot does not exist.
    #[must_use]
    pub fn get(&self, entity: &EntityId, kind: &str, index: usize) -> Option<&Value> {
        self.get_all(entity, kind).get(index)
    }

    /// Gets every value for `(kind, entity)` in insertion order.
    #[must_use]
    pub fn get_all(&self, entity: &EntityId, kind: &str) -> &[Value] {
        self.data
            .get(kind)
            .and_then(|by_entity| by_entity.get(entity))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Replaces the value at `index`.
    ///
    /// When both the existing value and `value` are records, the fields of
    /// `value` are merged over the existing record. Otherwise the value is
    /// replaced wholesale. Missing slots are left untouched.
    pub fn update(&mut self, entity: &EntityId, kind: &str, value: Value, index: usize) {
        let Some(slot) = self
            .data
            .get_mut(kind)
            .and_then(|by_entity| by_entity.get_mut(entity))
            .and_then(|values| values.get_mut(index))
        else {
            return;
        };

        let updated = match (&*slot, value) {
            (Value::Record(current), Value::Record(fields)) => Value::Record(current.merge(&fields)),
            (_, replacement) => replacement,
        };
        tracing::trace!(%entity, kind, index, value = ?updated, "attribute updated");
        *slot = updated;
    }

    /// Removes the value at `index`, returning it.
    ///
    /// The `(kind, entity)` entry is deleted once its list is empty.
    pub fn remove(&mut self, entity: &EntityId, kind: &str, index: usize) -> Option<Value> {
        let by_entity = self.data.get_mut(kind)?;
        let values = by_entity.get_mut(entity)?;
        if index >= values.len() {
            return None;
        }

        let removed = values.remove(index);
        if values.is_empty() {
            by_entity.shift_remove(entity);
        }
        tracing::trace!(%entity, kind, index, value = ?removed, "attribute removed");
        Some(removed)
    }

    /// Returns the index of the first value matching `criteria`.
    #[must_use]
    pub fn index_of(&self, entity: &EntityId, kind: &str, criteria: &Criteria) -> Option<usize> {
        self.get_all(entity, kind)
            .iter()
            .position(|value| criteria.matches(value))
    }

    /// Updates the first value matching `criteria`. Later matches are untouched.
    pub fn update_by(&mut self, entity: &EntityId, kind: &str, criteria: &Criteria, value: Value) {
        if let Some(index) = self.index_of(entity, kind, criteria) {
            self.update(entity, kind, value, index);
        }
    }

    /// Removes the first value matching `criteria`. Later matches are untouched.
    pub fn remove_by(&mut self, entity: &EntityId, kind: &str, criteria: &Criteria) -> Option<Value> {
        let index = self.index_of(entity, kind, criteria)?;
        self.remove(entity, kind, index)
    }

    /// Returns every entity holding at least one `kind` value matching `criteria`.
    #[must_use]
    pub fn entities_matching(&self, kind: &str, criteria: &Criteria) -> Vec<EntityId> {
        self.data
            .get(kind)
            .into_iter()
            .flat_map(|by_entity| by_entity.iter())
            .filter(|(_, values)| values.iter().any(|value| criteria.matches(value)))
            .map(|(entity, _)| entity.clone())
            .collect()
    }

    /// Deletes every attribute of `entity` across all kinds.
    ///
    /// Returns true if anything was removed.
    pub fn purge(&mut self, entity: &EntityId) -> bool {
        let mut removed = false;
        for by_entity in self.data.values_mut() {
            removed |= by_entity.shift_remove(entity).is_some();
        }
        if removed {
            tracing::trace!(%entity, "attributes purged");
        }
        removed
    }

    /// Returns true if `entity` holds any attribute.
    #[must_use]
    pub fn contains(&self, entity: &EntityId) -> bool {
        self.data
            .values()
            .any(|by_entity| by_entity.contains_key(entity))
    }

    /// Iterates over every attribute kind ever written.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Iterates over the entities currently holding `kind`.
    pub fn entities(&self, kind: &str) -> impl Iterator<Item = &EntityId> {
        self.data
            .get(kind)
            .into_iter()
            .flat_map(IndexMap::keys)
    }
}
