//! High-level SDK for Roster.
//!
//! Declares the entity types of the user-management API ([`User`],
//! [`UserSession`]) and bundles their stores into a [`Roster`] context that
//! applications open once and pass by handle to whatever needs it.

pub mod error;
pub mod password;
pub mod payload;
pub mod roster;
pub mod session;
pub mod user;

pub use error::{SdkError, SdkResult};
pub use password::{Argon2Hasher, HashError, PasswordHasher};
pub use payload::{NewUser, PayloadError, UserUpdate};
pub use roster::Roster;
pub use session::UserSession;
pub use user::User;

// Re-export key types
pub use roster_store::{Filter, Store, StoreConfig, StoreError};
pub use roster_types::{Entity, EntityId, Fields, Timestamp, ValidationError};
