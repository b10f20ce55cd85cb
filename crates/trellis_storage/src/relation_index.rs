//! Bidirectional index over relation entities.
//!
//! For every relation kind the index keeps two maps, one keyed by the
//! source endpoint and one keyed by the target endpoint, each mapping an
//! entity to the relation entities it participates in under that role.
//!
//! This is pure bookkeeping. The [`World`](crate::World) keeps it in step
//! with the `relationDetails` attributes it mirrors.

use indexmap::IndexMap;

use trellis_foundation::EntityId;

/// Which end of a relation an entity occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The entity the relation points from.
    Source,
    /// The entity the relation points to.
    Target,
}

impl Role {
    /// Returns the other role.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Source => Self::Target,
            Self::Target => Self::Source,
        }
    }
}

type Participation = IndexMap<EntityId, Vec<EntityId>>;

/// Per-kind pair of participation maps.
#[derive(Clone, Debug, Default)]
struct KindIndex {
    by_source: Participation,
    by_target: Participation,
}

impl KindIndex {
    fn side(&self, role: Role) -> &Participation {
        match role {
            Role::Source => &self.by_source,
            Role::Target => &self.by_target,
        }
    }

    fn side_mut(&mut self, role: Role) -> &mut Participation {
        match role {
            Role::Source => &mut self.by_source,
            Role::Target => &mut self.by_target,
        }
    }
}

/// Drops `relation` from `entity`'s list, deleting the list once empty.
fn detach(side: &mut Participation, entity: &EntityId, relation: &EntityId) {
    if let Some(relations) = side.get_mut(entity) {
        relations.retain(|id| id != relation);
        if relations.is_empty() {
            side.shift_remove(entity);
        }
    }
}

/// Index from entities to the relation entities they participate in.
#[derive(Clone, Debug, Default)]
pub struct RelationIndex {
    kinds: IndexMap<String, KindIndex>,
}

impl RelationIndex {
    /// Creates a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `relation` under both of its endpoints.
    pub fn add(&mut self, kind: &str, source: &EntityId, target: &EntityId, relation: &EntityId) {
        let index = self.kinds.entry(kind.to_string()).or_default();
        index
            .by_source
            .entry(source.clone())
            .or_default()
            .push(relation.clone());
        index
            .by_target
            .entry(target.clone())
            .or_default()
            .push(relation.clone());
    }

    /// Unregisters `relation` from both of its endpoints.
    ///
    /// Missing kinds, endpoints, and relation ids are ignored.
    pub fn remove(&mut self, kind: &str, source: &EntityId, target: &EntityId, relation: &EntityId) {
        if let Some(index) = self.kinds.get_mut(kind) {
            detach(&mut index.by_source, source, relation);
            detach(&mut index.by_target, target, relation);
        }
    }

    /// Unregisters `relation` from a single endpoint list.
    pub fn remove_entry(&mut self, kind: &str, role: Role, entity: &EntityId, relation: &EntityId) {
        if let Some(index) = self.kinds.get_mut(kind) {
            detach(index.side_mut(role), entity, relation);
        }
    }

    /// Moves `relation` to new endpoints.
    ///
    /// Either endpoint may be left as `None` to keep the old one. Changing
    /// both in one call relocates both.
    pub fn relocate(
        &mut self,
        kind: &str,
        relation: &EntityId,
        old_source: &EntityId,
        old_target: &EntityId,
        new_source: Option<&EntityId>,
        new_target: Option<&EntityId>,
    ) {
        let source = new_source.unwrap_or(old_source);
        let target = new_target.unwrap_or(old_target);
        if source == old_source && target == old_target {
            return;
        }

        self.remove(kind, old_source, old_target, relation);
        self.add(kind, source, target, relation);
        tracing::trace!(%relation, kind, %source, %target, "relation relocated");
    }

    /// Returns the relations in which `entity` plays `role` for `kind`.
    #[must_use]
    pub fn relations(&self, kind: &str, role: Role, entity: &EntityId) -> &[EntityId] {
        self.kinds
            .get(kind)
            .and_then(|index| index.side(role).get(entity))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Removes and returns `entity`'s whole list for `kind` and `role`.
    pub fn take(&mut self, kind: &str, role: Role, entity: &EntityId) -> Vec<EntityId> {
        self.kinds
            .get_mut(kind)
            .and_then(|index| index.side_mut(role).shift_remove(entity))
            .unwrap_or_default()
    }

    /// Returns true if `entity` appears as an endpoint under any kind.
    #[must_use]
    pub fn contains(&self, entity: &EntityId) -> bool {
        self.kinds
            .values()
            .any(|index| index.by_source.contains_key(entity) || index.by_target.contains_key(entity))
    }

    /// Iterates over every relation kind ever indexed.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    /// Iterates over every `(kind, role, entity, relations)` list.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Role, &EntityId, &[EntityId])> {
        self.kinds.iter().flat_map(|(kind, index)| {
            [Role::Source, Role::Target].into_iter().flat_map(move |role| {
                index
                    .side(role)
                    .iter()
                    .map(move |(entity, relations)| (kind.as_str(), role, entity, relations.as_slice()))
            })
        })
    }
}
