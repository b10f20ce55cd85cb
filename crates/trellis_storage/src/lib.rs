//! Entity allocation, attribute storage, relation indices, and world state for Trellis.
//!
//! This crate provides:
//! - [`EntityAllocator`] - Per-kind monotonic entity identifiers
//! - [`AttributeStore`] - Multi-valued attributes keyed by kind and entity
//! - [`RelationIndex`] - Bidirectional index over relation entities
//! - [`World`] - The owned store that keeps attributes and relations consistent
//!
//! Every operation here is total. Lookups on missing keys return empty
//! results and conditional writes on missing keys are silent no-ops.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attribute;
pub mod entity;
pub mod relation;
pub mod relation_index;
pub mod world;

pub use attribute::AttributeStore;
pub use entity::EntityAllocator;
pub use relation::{RELATION_DETAILS, RELATION_ENTITY_KIND, RelationDetails};
pub use relation_index::{RelationIndex, Role};
pub use world::{ROLE, World};
