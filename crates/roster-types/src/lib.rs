//! Entity contract for Roster.
//!
//! Every record kept by a Roster store is an [`Entity`]: a declared type with
//! a unique [`EntityId`], a pair of second-precision [`Timestamp`]s, and an
//! explicit table of named fields ([`FieldDef`]). Stores never reflect over
//! entity internals; they go through the table.
//!
//! # Key Types
//!
//! - [`EntityId`] -- Per-type unique identifier (UUID v4 when generated)
//! - [`Timestamp`] -- UTC wall-clock time truncated to whole seconds
//! - [`EntityMeta`] -- The `id` / `created_at` / `updated_at` header
//! - [`Entity`] -- Trait implemented by every declared record type
//! - [`Fields`] -- Ordered JSON field map used for construction and serialization
//!
//! # Operations
//!
//! - [`construct`] -- Build an entity from a field map, validating the header
//! - [`serialize`] -- Render an entity into an ordered field map
//! - [`equals`] -- Identity comparison across declared types
//! - [`field_value`] -- Named field lookup through the declared table

pub mod entity;
pub mod error;
pub mod fields;
pub mod id;
pub mod temporal;

pub use entity::{
    construct, equals, field_value, serialize, Entity, EntityMeta, FieldDef, CREATED_AT_FIELD,
    ID_FIELD, PRIVATE_MARKER, UPDATED_AT_FIELD,
};
pub use error::{TypeError, ValidationError};
pub use fields::Fields;
pub use id::EntityId;
pub use temporal::{Timestamp, TIMESTAMP_FORMAT};
