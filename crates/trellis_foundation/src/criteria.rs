//! Match predicates for attribute lookups.
//!
//! Scalar criteria require exact equality. Record criteria require the
//! candidate to be a record containing every criteria field with an equal
//! value; extra fields on the candidate are ignored.

use std::sync::Arc;

use crate::entity::EntityId;
use crate::record::Record;
use crate::value::Value;

/// A predicate over attribute values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Criteria {
    /// The candidate must equal this value.
    Equals(Value),
    /// The candidate must be a record containing all of these fields.
    Subset(Record),
}

impl Criteria {
    /// Returns true if `candidate` satisfies this predicate.
    ///
    /// An empty subset matches every candidate, records or not.
    #[must_use]
    pub fn matches(&self, candidate: &Value) -> bool {
        match self {
            Self::Equals(expected) => candidate == expected,
            Self::Subset(fields) if fields.is_empty() => true,
            Self::Subset(fields) => candidate
                .as_record()
                .is_some_and(|record| record.contains_all(fields)),
        }
    }
}

impl From<Value> for Criteria {
    fn from(value: Value) -> Self {
        match value {
            Value::Record(fields) => Self::Subset(fields),
            other => Self::Equals(other),
        }
    }
}

impl From<Record> for Criteria {
    fn from(fields: Record) -> Self {
        Self::Subset(fields)
    }
}

/// Scalars convert through [`Value`] into an equality predicate.
macro_rules! equals_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Criteria {
                fn from(scalar: $ty) -> Self {
                    Self::Equals(Value::from(scalar))
                }
            }
        )*
    };
}

equals_from!(bool, i64, i32, u32, f64, &str, String, Arc<str>, EntityId, &EntityId);
