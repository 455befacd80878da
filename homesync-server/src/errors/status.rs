use axum::http::StatusCode;
use homesync_core::error::{CommandError, RoomError};

pub fn room_status(error: &RoomError) -> StatusCode {
    match error {
        RoomError::UnknownRoom(_) => StatusCode::NOT_FOUND,
        RoomError::UnknownActuator(_) => StatusCode::NOT_FOUND,
    }
}

pub fn command_status(error: &CommandError) -> StatusCode {
    match error {
        CommandError::NotConnected => StatusCode::SERVICE_UNAVAILABLE,
        CommandError::SendFailed { .. } => StatusCode::BAD_GATEWAY,
        CommandError::InvalidTimestamp(_) => StatusCode::BAD_REQUEST,
        CommandError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        CommandError::NoDevices => StatusCode::NOT_FOUND,
        CommandError::Store(_) => StatusCode::BAD_GATEWAY,
    }
}
