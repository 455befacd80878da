use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use homesync_core::dashboard::Dashboard;
use homesync_core::dispatch::CommandDispatcher;
use homesync_core::room::{Actuator, RoomId};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

#[derive(Clone, Serialize, Deserialize)]
pub struct ActuatorBody {
    pub on: bool,
}

#[derive(Clone)]
pub struct DashboardState {
    pub dashboard: Arc<Dashboard>,
    pub dispatcher: Arc<CommandDispatcher>,
}

pub async fn get_dashboard(State(state): State<DashboardState>) -> impl IntoResponse {
    Json(state.dashboard.snapshot().await)
}

pub async fn select_room(
    State(state): State<DashboardState>,
    Path(room_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let room = room_id.parse::<RoomId>()?;

    state.dashboard.select_room(room).await;

    Ok(Json(state.dashboard.snapshot().await))
}

pub async fn set_actuator(
    State(state): State<DashboardState>,
    Path((room_id, actuator)): Path<(String, String)>,
    Json(body): Json<ActuatorBody>,
) -> Result<impl IntoResponse, ApiError> {
    let room = room_id.parse::<RoomId>()?;
    let actuator = actuator.parse::<Actuator>()?;

    state.dispatcher.set_actuator(room, actuator, body.on).await;

    Ok(Json(state.dashboard.snapshot().await))
}
