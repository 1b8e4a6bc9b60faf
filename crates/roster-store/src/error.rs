use std::path::PathBuf;

use roster_types::ValidationError;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The snapshot file exists but is not a JSON object of id -> record.
    #[error("malformed snapshot {}: {reason}", path.display())]
    MalformedSnapshot { path: PathBuf, reason: String },

    /// The snapshot file exists but could not be read.
    #[error("cannot read snapshot {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing the snapshot failed. The registry was left unchanged.
    #[error("cannot persist snapshot {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An entity could not be constructed from the given fields.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
