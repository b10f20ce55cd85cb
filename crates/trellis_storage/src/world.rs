//! The owned store of entities, attributes, and relations.
//!
//! The `World` is the unified interface to all storage systems. It owns the
//! attribute store, the relation index, and the entity allocator, and it is
//! the only thing that writes relation details, so the index always mirrors
//! the stored `relationDetails` records:
//!
//! - every relation `R` with details `(s, t, k)` is listed under
//!   `index[k].by_source[s]` and `index[k].by_target[t]` and nowhere else
//!   for kind `k`;
//! - destroying an entity removes all of its attributes and unhooks every
//!   relation it takes part in from the opposite endpoint.

use indexmap::IndexSet;

use trellis_foundation::{Criteria, EntityId, Value};

use crate::attribute::AttributeStore;
use crate::entity::EntityAllocator;
use crate::relation::{RELATION_DETAILS, RELATION_ENTITY_KIND, RelationDetails};
use crate::relation_index::{RelationIndex, Role};

/// Attribute kind used by the role helpers.
pub const ROLE: &str = "role";

/// Entity, attribute, and relation state.
///
/// Independent worlds share nothing, so each test or simulation can own
/// its own instance.
#[derive(Clone, Debug, Default)]
pub struct World {
    attributes: AttributeStore,
    relations: RelationIndex,
    allocator: EntityAllocator,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the attribute store.
    #[must_use]
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Read access to the relation index.
    #[must_use]
    pub fn relations(&self) -> &RelationIndex {
        &self.relations
    }

    /// Allocates a new entity identifier of the given kind.
    pub fn create_entity(&mut self, kind: &str) -> EntityId {
        self.allocator.create(kind)
    }

    /// Returns true if `entity` holds an attribute or takes part in a relation.
    #[must_use]
    pub fn exists(&self, entity: &EntityId) -> bool {
        self.attributes.contains(entity) || self.relations.contains(entity)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Appends an attribute value.
    pub fn add_attribute(&mut self, entity: &EntityId, kind: &str, value: impl Into<Value>) {
        self.attributes.add(entity, kind, value.into());
    }

    /// Gets the first attribute value of `kind`.
    #[must_use]
    pub fn get_attribute(&self, entity: &EntityId, kind: &str) -> Option<&Value> {
        self.attributes.get(entity, kind, 0)
    }

    /// Gets the attribute value of `kind` at `index`.
    #[must_use]
    pub fn get_attribute_at(&self, entity: &EntityId, kind: &str, index: usize) -> Option<&Value> {
        self.attributes.get(entity, kind, index)
    }

    /// Gets every attribute value of `kind` in insertion order.
    #[must_use]
    pub fn get_attributes(&self, entity: &EntityId, kind: &str) -> &[Value] {
        self.attributes.get_all(entity, kind)
    }

    /// Updates the first attribute value of `kind`.
    ///
    /// Records are shallow-merged; anything else is replaced.
    pub fn update_attribute(&mut self, entity: &EntityId, kind: &str, value: impl Into<Value>) {
        self.attributes.update(entity, kind, value.into(), 0);
    }

    /// Updates the attribute value of `kind` at `index`.
    pub fn update_attribute_at(
        &mut self,
        entity: &EntityId,
        kind: &str,
        value: impl Into<Value>,
        index: usize,
    ) {
        self.attributes.update(entity, kind, value.into(), index);
    }

    /// Updates the first attribute value of `kind` matching `criteria`.
    pub fn update_attribute_by_criteria(
        &mut self,
        entity: &EntityId,
        kind: &str,
        criteria: impl Into<Criteria>,
        value: impl Into<Value>,
    ) {
        self.attributes
            .update_by(entity, kind, &criteria.into(), value.into());
    }

    /// Removes the first attribute value of `kind`.
    pub fn remove_attribute(&mut self, entity: &EntityId, kind: &str) -> Option<Value> {
        self.attributes.remove(entity, kind, 0)
    }

    /// Removes the attribute value of `kind` at `index`.
    pub fn remove_attribute_at(&mut self, entity: &EntityId, kind: &str, index: usize) -> Option<Value> {
        self.attributes.remove(entity, kind, index)
    }

    /// Removes the first attribute value of `kind` matching `criteria`.
    pub fn remove_attribute_by_criteria(
        &mut self,
        entity: &EntityId,
        kind: &str,
        criteria: impl Into<Criteria>,
    ) -> Option<Value> {
        self.attributes.remove_by(entity, kind, &criteria.into())
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// Adds a named role.
    pub fn add_role(&mut self, entity: &EntityId, role: &str) {
        self.add_attribute(entity, ROLE, role);
    }

    /// Gets every role value of an entity.
    #[must_use]
    pub fn get_roles(&self, entity: &EntityId) -> &[Value] {
        self.get_attributes(entity, ROLE)
    }

    /// Returns true if the entity holds the named role.
    #[must_use]
    pub fn has_role(&self, entity: &EntityId, role: &str) -> bool {
        self.get_roles(entity)
            .iter()
            .any(|value| value.as_str() == Some(role))
    }

    /// Removes the first occurrence of the named role.
    pub fn remove_role(&mut self, entity: &EntityId, role: &str) {
        self.remove_attribute_by_criteria(entity, ROLE, role);
    }

    /// Renames the first occurrence of a role in place.
    pub fn update_role(&mut self, entity: &EntityId, old_role: &str, new_role: &str) {
        self.update_attribute_by_criteria(entity, ROLE, old_role, new_role);
    }

    /// Returns a predicate testing entities for the named role.
    pub fn role_filter<'a>(&'a self, role: &'a str) -> impl Fn(&EntityId) -> bool + 'a {
        move |entity| self.has_role(entity, role)
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Creates a relation entity from `source` to `target` and returns its id.
    ///
    /// Neither endpoint has to exist beforehand.
    pub fn add_relation(
        &mut self,
        source: &EntityId,
        kind: &str,
        target: &EntityId,
        info: Option<Value>,
    ) -> EntityId {
        let relation = self.allocator.create(RELATION_ENTITY_KIND);
        let details = RelationDetails {
            source: source.clone(),
            target: target.clone(),
            kind: kind.to_string(),
            info,
        };

        self.attributes
            .add(&relation, RELATION_DETAILS, details.to_value());
        self.relations.add(kind, source, target, &relation);
        relation
    }

    /// Gets the details of a relation entity.
    #[must_use]
    pub fn get_relation(&self, relation: &EntityId) -> Option<RelationDetails> {
        self.attributes
            .get(relation, RELATION_DETAILS, 0)
            .and_then(RelationDetails::from_value)
    }

    /// Changes the endpoints and/or payload of a relation.
    ///
    /// Only supplied fields change. A new payload replaces the old one
    /// wholesale. Endpoint changes are mirrored into the index. Unknown
    /// relations are ignored.
    pub fn update_relation(
        &mut self,
        relation: &EntityId,
        new_source: Option<&EntityId>,
        new_target: Option<&EntityId>,
        new_info: Option<Value>,
    ) {
        let Some(mut details) = self.get_relation(relation) else {
            return;
        };
        let old_source = details.source.clone();
        let old_target = details.target.clone();

        let moved_source = new_source.filter(|source| **source != old_source);
        let moved_target = new_target.filter(|target| **target != old_target);

        if let Some(source) = moved_source {
            details.source = source.clone();
        }
        if let Some(target) = moved_target {
            details.target = target.clone();
        }
        if let Some(info) = new_info {
            details.info = Some(info);
        }

        self.attributes
            .update(relation, RELATION_DETAILS, details.to_value(), 0);

        if moved_source.is_some() || moved_target.is_some() {
            self.relations.relocate(
                &details.kind,
                relation,
                &old_source,
                &old_target,
                moved_source,
                moved_target,
            );
        }
    }

    /// Removes a relation and destroys its entity. Unknown relations are ignored.
    pub fn remove_relation(&mut self, relation: &EntityId) {
        let Some(details) = self.get_relation(relation) else {
            return;
        };
        self.relations
            .remove(&details.kind, &details.source, &details.target, relation);
        self.destroy_entity(relation);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns entities holding a `kind` value that matches `criteria`.
    #[must_use]
    pub fn query_entities_by_attribute(
        &self,
        kind: &str,
        criteria: impl Into<Criteria>,
    ) -> Vec<EntityId> {
        self.attributes.entities_matching(kind, &criteria.into())
    }

    /// Returns entities holding the named role.
    #[must_use]
    pub fn query_entities_by_role(&self, role: &str) -> Vec<EntityId> {
        self.query_entities_by_attribute(ROLE, role)
    }

    /// Returns every one-hop neighbour of `entity`, across all kinds and
    /// both directions, without duplicates.
    #[must_use]
    pub fn query_entities_in_relation_to(&self, entity: &EntityId) -> Vec<EntityId> {
        let mut neighbours = IndexSet::new();
        for kind in self.relations.kinds() {
            for role in [Role::Source, Role::Target] {
                neighbours.extend(self.opposite_endpoints(kind, entity, role));
            }
        }
        neighbours.into_iter().collect()
    }

    /// Returns the opposite endpoints of `kind` relations in which `entity`
    /// plays `role`.
    ///
    /// With `Role::Source` this yields targets; with `Role::Target` it
    /// yields sources.
    #[must_use]
    pub fn query_entities_by_relation_to(
        &self,
        kind: &str,
        entity: &EntityId,
        role: Role,
    ) -> Vec<EntityId> {
        self.opposite_endpoints(kind, entity, role).collect()
    }

    fn opposite_endpoints<'a>(
        &'a self,
        kind: &'a str,
        entity: &'a EntityId,
        role: Role,
    ) -> impl Iterator<Item = EntityId> + 'a {
        self.relations
            .relations(kind, role, entity)
            .iter()
            .filter_map(|relation| self.get_relation(relation))
            .map(move |details| details.endpoint(role.opposite()).clone())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Destroys an entity and unhooks every relation it takes part in.
    ///
    /// For each such relation the entry under the opposite endpoint is
    /// removed and the relation's details are deleted. The relation entity
    /// itself keeps any other attributes. Afterwards `entity` holds no
    /// attributes and appears in no index list.
    pub fn destroy_entity(&mut self, entity: &EntityId) {
        // A relation entity destroyed directly leaves its own endpoints first
        if let Some(details) = self.get_relation(entity) {
            self.relations
                .remove(&details.kind, &details.source, &details.target, entity);
        }

        let kinds: Vec<String> = self.relations.kinds().map(str::to_string).collect();
        for kind in &kinds {
            for role in [Role::Source, Role::Target] {
                for relation in self.relations.take(kind, role, entity) {
                    let Some(details) = self.get_relation(&relation) else {
                        continue;
                    };
                    let opposite = role.opposite();
                    self.relations
                        .remove_entry(kind, opposite, details.endpoint(opposite), &relation);
                    self.attributes.remove(&relation, RELATION_DETAILS, 0);
                }
            }
        }

        self.attributes.purge(entity);
        tracing::trace!(%entity, "entity destroyed");
    }
}
