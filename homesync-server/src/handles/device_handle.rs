use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use homesync_core::auth::Locale;
use homesync_core::dispatch::CommandDispatcher;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use crate::errors::ApiError;

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TimeBody {
    /// Local wall-clock unix time in seconds, defaults to now.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl TimeBody {
    /// An empty body means "now", anything else must be a valid `TimeBody`.
    fn parse(body: &Bytes) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid time body: {e}")))
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
            .unwrap_or_else(|| OffsetDateTime::now_utc().unix_timestamp())
    }
}

#[derive(Clone)]
pub struct DeviceState {
    pub dispatcher: Arc<CommandDispatcher>,
    pub locale: Locale,
}

pub async fn get_devices(State(state): State<DeviceState>) -> Result<impl IntoResponse, ApiError> {
    let devices = state.dispatcher.list_devices().await?;

    Ok(Json(devices))
}

pub async fn reboot_device(
    State(state): State<DeviceState>,
    Path(device_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.dispatcher.reboot(&device_id).await?;

    Ok(Json(json!({
        "device_id": device_id,
        "command": "reboot",
    })))
}

pub async fn reset_device_wifi(
    State(state): State<DeviceState>,
    Path(device_id): Path<String>,
) -> impl IntoResponse {
    Json(state.dispatcher.reset_wifi(&device_id, state.locale).await)
}

pub async fn sync_device_time(
    State(state): State<DeviceState>,
    Path(device_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body = TimeBody::parse(&body)?;
    let timestamp = state.dispatcher.sync_time(&device_id, body.timestamp()).await?;

    Ok(Json(json!({
        "device_id": device_id,
        "timestamp": timestamp,
    })))
}

pub async fn sync_all_devices_time(
    State(state): State<DeviceState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body = TimeBody::parse(&body)?;
    let report = state.dispatcher.sync_time_all(body.timestamp()).await?;

    Ok(Json(report))
}
