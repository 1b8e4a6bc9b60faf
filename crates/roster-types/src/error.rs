use thiserror::Error;

/// Errors produced when parsing primitive types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("entity id must not be empty")]
    EmptyId,
}

/// Errors raised while constructing an entity from a field map.
///
/// Collaborators surface these as user-visible validation failures; every
/// variant names the offending field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or null.
    #[error("{0} missing")]
    MissingField(String),

    /// A field was present but had the wrong shape.
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// A timestamp field did not match the fixed format.
    #[error("invalid timestamp in {field}: {value:?}")]
    InvalidTimestamp { field: String, value: String },

    /// The field map named a field the type does not declare.
    #[error("{type_name} has no field named {field}")]
    UnknownField { type_name: String, field: String },

    /// `created_at` was later than `updated_at`.
    #[error("created_at {created_at} is after updated_at {updated_at}")]
    TimestampOrder {
        created_at: String,
        updated_at: String,
    },
}
