use std::any::TypeId;

use serde_json::Value;

use crate::error::ValidationError;
use crate::fields::{take_timestamp, Fields};
use crate::id::EntityId;
use crate::temporal::Timestamp;

/// Field names starting with this character are private: they are kept in
/// snapshots but left out of public serialization.
pub const PRIVATE_MARKER: char = '_';

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// One entry of a type's declared field table.
pub struct FieldDef<T> {
    /// Field name as it appears in serialized form.
    pub name: &'static str,
    /// Accessor returning the current value as JSON.
    pub get: fn(&T) -> Value,
}

impl<T> FieldDef<T> {
    pub const fn new(name: &'static str, get: fn(&T) -> Value) -> Self {
        Self { name, get }
    }

    pub fn is_private(&self) -> bool {
        self.name.starts_with(PRIVATE_MARKER)
    }
}

/// Identity and timestamps shared by every entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityMeta {
    pub id: EntityId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EntityMeta {
    /// A fresh header: generated id, both timestamps set to now.
    pub fn new() -> Self {
        let now = Timestamp::now();
        Self {
            id: EntityId::generate(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Take the header fields out of `fields`.
    ///
    /// A missing or null `id` is generated. Missing timestamps default to
    /// now; supplied ones must parse with the fixed format.
    pub fn from_fields(fields: &mut Fields) -> Result<Self, ValidationError> {
        let id = match fields.remove(ID_FIELD) {
            None | Some(Value::Null) => EntityId::generate(),
            Some(Value::String(raw)) => {
                EntityId::new(raw).map_err(|e| ValidationError::InvalidField {
                    field: ID_FIELD.to_string(),
                    reason: e.to_string(),
                })?
            }
            Some(_) => {
                return Err(ValidationError::InvalidField {
                    field: ID_FIELD.to_string(),
                    reason: "expected string".to_string(),
                })
            }
        };

        let now = Timestamp::now();
        let created_at = take_timestamp(fields, CREATED_AT_FIELD)?.unwrap_or(now);
        let updated_at = take_timestamp(fields, UPDATED_AT_FIELD)?.unwrap_or(now);
        if created_at > updated_at {
            return Err(ValidationError::TimestampOrder {
                created_at: created_at.to_string(),
                updated_at: updated_at.to_string(),
            });
        }

        Ok(Self {
            id,
            created_at,
            updated_at,
        })
    }

    /// Mark the entity as updated now. `updated_at` never moves backward.
    pub fn touch(&mut self) {
        let now = Timestamp::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// A declared record type.
///
/// Implementors own an [`EntityMeta`] plus their typed fields, and publish a
/// static table of [`FieldDef`]s that drives serialization and search.
/// Construction from a field map goes through [`construct`], which handles
/// the header before handing the remaining fields to [`Entity::from_parts`].
pub trait Entity: Sized + 'static {
    /// Declared type name. Also names the type's snapshot file.
    const TYPE_NAME: &'static str;

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// The declared fields, in serialization order, excluding the header.
    fn fields() -> &'static [FieldDef<Self>];

    /// Build the entity from its header and the remaining declared fields.
    ///
    /// Implementations take their fields out of `fields`; anything left
    /// over is ignored.
    fn from_parts(meta: EntityMeta, fields: &mut Fields) -> Result<Self, ValidationError>;

    fn id(&self) -> &EntityId {
        &self.meta().id
    }

    fn created_at(&self) -> Timestamp {
        self.meta().created_at
    }

    fn updated_at(&self) -> Timestamp {
        self.meta().updated_at
    }
}

/// Construct an entity of type `T` from a field map.
///
/// Fields not declared by `T` are rejected so that a typo never silently
/// drops data.
pub fn construct<T: Entity>(mut fields: Fields) -> Result<T, ValidationError> {
    let meta = EntityMeta::from_fields(&mut fields)?;
    if let Some(unknown) = fields
        .keys()
        .find(|key| !T::fields().iter().any(|f| f.name == key.as_str()))
    {
        return Err(ValidationError::UnknownField {
            type_name: T::TYPE_NAME.to_string(),
            field: unknown.clone(),
        });
    }
    T::from_parts(meta, &mut fields)
}

/// Identity comparison: same declared type and same id.
pub fn equals<A: Entity, B: Entity>(a: &A, b: &B) -> bool {
    TypeId::of::<A>() == TypeId::of::<B>() && a.id() == b.id()
}

/// Render an entity as an ordered field map.
///
/// The header comes first, then declared fields in table order. Private
/// fields are only included when `include_private` is set.
pub fn serialize<T: Entity>(entity: &T, include_private: bool) -> Fields {
    let meta = entity.meta();
    let mut out = Fields::new();
    out.insert(ID_FIELD.to_string(), Value::String(meta.id.to_string()));
    out.insert(
        CREATED_AT_FIELD.to_string(),
        Value::String(meta.created_at.to_string()),
    );
    out.insert(
        UPDATED_AT_FIELD.to_string(),
        Value::String(meta.updated_at.to_string()),
    );
    for field in T::fields() {
        if field.is_private() && !include_private {
            continue;
        }
        out.insert(field.name.to_string(), (field.get)(entity));
    }
    out
}

/// Look up a header or declared field by name. `None` for unknown names.
pub fn field_value<T: Entity>(entity: &T, name: &str) -> Option<Value> {
    let meta = entity.meta();
    match name {
        ID_FIELD => Some(Value::String(meta.id.to_string())),
        CREATED_AT_FIELD => Some(Value::String(meta.created_at.to_string())),
        UPDATED_AT_FIELD => Some(Value::String(meta.updated_at.to_string())),
        _ => T::fields()
            .iter()
            .find(|f| f.name == name)
            .map(|f| (f.get)(entity)),
    }
}
