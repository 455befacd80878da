use homesync_core::error::{CommandError, RoomError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Room error: {0}")]
    RoomError(#[from] RoomError),

    #[error("Command error: {0}")]
    CommandError(#[from] CommandError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
