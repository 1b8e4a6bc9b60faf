use roster_types::ValidationError;
use thiserror::Error;

use crate::password::HashError;
use crate::payload::PayloadError;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("store error: {0}")]
    Store(#[from] roster_store::StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Password(#[from] HashError),
}

pub type SdkResult<T> = Result<T, SdkError>;
