use roster_types::{field_value, Entity, Fields};
use serde_json::Value;

/// Conjunction of exact-equality terms over entity fields.
///
/// An empty filter matches every entity. A term naming a field the type
/// does not declare matches nothing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    terms: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `field == value` term.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[(String, Value)] {
        &self.terms
    }

    /// Returns `true` if every term equals the entity's field value.
    pub fn matches<T: Entity>(&self, entity: &T) -> bool {
        self.terms
            .iter()
            .all(|(field, expected)| field_value(entity, field).as_ref() == Some(expected))
    }
}

impl From<Fields> for Filter {
    fn from(fields: Fields) -> Self {
        Self {
            terms: fields.into_iter().collect(),
        }
    }
}
