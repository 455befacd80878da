use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use homesync_core::dashboard::{Dashboard, DashboardEvent};
use tokio_stream::StreamExt;
use tokio_stream::{Stream, wrappers};

#[derive(Clone)]
pub struct SSEState {
    pub dashboard: Arc<Dashboard>,
}

pub async fn sse_handler(State(state): State<SSEState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.dashboard.subscribe();

    let stream = wrappers::BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(DashboardEvent::Refresh(snapshot)) => match Event::default().event("refresh").json_data(&snapshot) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!("failed to encode dashboard event: {}", e);
                None
            }
        },
        Err(e) => {
            tracing::debug!("dashboard subscriber lagged: {}", e);
            None
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
