//! Persistent entity stores for Roster.
//!
//! A [`Store`] couples the in-memory [`Registry`] of one declared entity type
//! with its on-disk [`Snapshot`]. Reads only touch the registry; every
//! mutation rewrites the type's snapshot file in full and then updates the
//! registry.
//!
//! # Design Rules
//!
//! 1. One snapshot file per declared type, named from the type name.
//! 2. A missing snapshot is an empty registry; a corrupt one is an error.
//! 3. Snapshots are replaced atomically (temp file, then rename).
//! 4. Write failures are returned to the caller and the registry is left
//!    unchanged, so memory never silently diverges from disk.
//! 5. Mutations need `&mut Store`; hosts that share a store across threads
//!    serialize access themselves.
//!
//! Rewriting the whole file on each mutation is deliberate. An incremental
//! format would be a separate, visible change.

pub mod config;
pub mod error;
pub mod filter;
pub mod registry;
pub mod snapshot;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use filter::Filter;
pub use registry::Registry;
pub use snapshot::Snapshot;
pub use store::Store;
