#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    #[error("Unknown actuator: {0}")]
    UnknownActuator(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Remote store request failed: {0}")]
    Request(String),

    #[error("Remote store rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Subscription to {path} was closed: {reason}")]
    SubscriptionClosed { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Transport is not connected")]
    Disconnected,

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Message broker is not connected, command was not sent")]
    NotConnected,

    #[error("Failed to send {command} to device {device_id}: {source}")]
    SendFailed {
        device_id: String,
        command: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("Timestamp {0} is out of range for the device clock")]
    InvalidTimestamp(i64),

    #[error("Remote store is not available")]
    StoreUnavailable,

    #[error("No devices registered")]
    NoDevices,

    #[error("Remote store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Email and password are required")]
    MissingFields,

    #[error("Password confirmation does not match")]
    PasswordMismatch,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
}
