//! Relation detail records.
//!
//! A relation is an ordinary entity whose defining attribute is a single
//! `relationDetails` record naming its source, target, kind, and optional
//! payload.

use trellis_foundation::{EntityId, Record, Value};

use crate::relation_index::Role;

/// Attribute kind holding a relation's details.
pub const RELATION_DETAILS: &str = "relationDetails";

/// Allocator kind used for relation entities.
pub const RELATION_ENTITY_KIND: &str = "Relation";

/// The directed, typed edge recorded by a relation entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationDetails {
    /// Entity the relation points from.
    pub source: EntityId,
    /// Entity the relation points to.
    pub target: EntityId,
    /// Relation kind.
    pub kind: String,
    /// Optional payload.
    pub info: Option<Value>,
}

impl RelationDetails {
    /// Creates details without a payload.
    #[must_use]
    pub fn new(source: EntityId, kind: impl Into<String>, target: EntityId) -> Self {
        Self {
            source,
            target,
            kind: kind.into(),
            info: None,
        }
    }

    /// Builder method to attach a payload.
    #[must_use]
    pub fn with_info(mut self, info: Value) -> Self {
        self.info = Some(info);
        self
    }

    /// Returns the endpoint occupying `role`.
    #[must_use]
    pub fn endpoint(&self, role: Role) -> &EntityId {
        match role {
            Role::Source => &self.source,
            Role::Target => &self.target,
        }
    }

    /// Encodes the details as the record stored under [`RELATION_DETAILS`].
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut record = Record::new()
            .with("source", &self.source)
            .with("target", &self.target)
            .with("kind", self.kind.as_str());
        if let Some(info) = &self.info {
            record.insert("info", info.clone());
        }
        Value::Record(record)
    }

    /// Decodes a stored record. Returns `None` if the value is not a
    /// well-formed details record.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_record()?;
        Some(Self {
            source: record.get("source")?.as_entity()?.clone(),
            target: record.get("target")?.as_entity()?.clone(),
            kind: record.get("kind")?.as_str()?.to_string(),
            info: record.get("info").cloned(),
        })
    }
}
