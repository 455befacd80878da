use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use homesync_core::auth::Locale;
use homesync_core::dashboard::Dashboard;
use homesync_core::dispatch::CommandDispatcher;
use homesync_core::{MessageTransport, RemoteStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::Settings;
use crate::handles::*;
use crate::services::{FirebaseStore, MqttTransport};

/// Builds the services from `settings`, starts the data writer and returns the router.
pub async fn create_app(settings: &Arc<Settings>) -> anyhow::Result<Router> {
    let dashboard = Arc::new(Dashboard::new(settings.dashboard.to_config()?));

    let transport = Arc::new(MqttTransport::new(&settings.gateway)?);
    transport.start();

    let remote = settings
        .database
        .as_ref()
        .map(|database| Arc::new(FirebaseStore::new(database)) as Arc<dyn RemoteStore>);

    homesync_core::start(dashboard.clone(), remote.clone());

    let dispatcher = Arc::new(CommandDispatcher::new(
        dashboard.clone(),
        transport as Arc<dyn MessageTransport>,
        remote,
        settings.provisioning.clone().into(),
    ));

    Ok(create_router(dashboard, dispatcher, settings.dashboard.locale))
}

pub fn create_router(dashboard: Arc<Dashboard>, dispatcher: Arc<CommandDispatcher>, locale: Locale) -> Router {
    let auth = Router::new()
        .route("/check", post(check_credentials))
        .route("/describe", post(describe_auth_error))
        .with_state(AuthState { locale });

    let rooms = Router::new()
        .route("/:room_id/select", post(select_room))
        .route("/:room_id/actuators/:actuator", put(set_actuator))
        .with_state(DashboardState {
            dashboard: dashboard.clone(),
            dispatcher: dispatcher.clone(),
        });

    let overview = Router::new()
        .route("/", get(get_dashboard))
        .with_state(DashboardState {
            dashboard: dashboard.clone(),
            dispatcher: dispatcher.clone(),
        });

    let devices = Router::new()
        .route("/", get(get_devices))
        .route("/time", post(sync_all_devices_time))
        .route("/:device_id/reboot", post(reboot_device))
        .route("/:device_id/wifi", post(reset_device_wifi))
        .route("/:device_id/time", post(sync_device_time))
        .with_state(DeviceState {
            dispatcher: dispatcher.clone(),
            locale,
        });

    let sse = Router::new()
        .route("/", get(sse_handler))
        .with_state(SSEState {
            dashboard: dashboard.clone(),
        });

    Router::new()
        .nest("/dashboard", overview)
        .nest("/rooms", rooms)
        .nest("/devices", devices)
        .nest("/event", sse)
        .nest("/auth", auth)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
