#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use homesync_core::auth::Locale;
use homesync_core::dashboard::Dashboard;
use homesync_core::device::{AccessPoint, DeviceCommand};
use homesync_core::dispatch::CommandDispatcher;
use homesync_core::error::TransportError;
use homesync_core::{MemoryStore, MessageTransport, RemoteStore};
use homesync_server::app::create_router;
use serde_json::{Value, json};
use tower::ServiceExt;

#[derive(Default)]
pub struct MockTransport {
    pub connected: AtomicBool,
    pub failing: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<(String, DeviceCommand)>>,
}

impl MockTransport {
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn fail_for(&self, device_id: &str) {
        self.failing.lock().unwrap().push(device_id.to_string());
    }

    pub fn sent(&self) -> Vec<(String, DeviceCommand)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn send(&self, device_id: &str, command: &DeviceCommand) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push((device_id.to_string(), command.clone()));

        if self.failing.lock().unwrap().iter().any(|id| id == device_id) {
            return Err(TransportError::Publish(String::from("broker rejected")));
        }

        Ok(())
    }
}

pub struct MockApp {
    pub dashboard: Arc<Dashboard>,
    pub remote: Arc<MemoryStore>,
    pub transport: Arc<MockTransport>,
    pub router: Router,
}

impl MockApp {
    pub fn new() -> Self {
        Self::with_store(Some(Arc::new(MemoryStore::with_root(json!({
            "devices": {
                "esp32-hall": { "name": "Hall", "ip": "10.0.0.12" },
                "esp32-garage": {},
            }
        })))))
    }

    pub fn without_store() -> Self {
        Self::with_store(None)
    }

    fn with_store(remote: Option<Arc<MemoryStore>>) -> Self {
        let dashboard = Arc::new(Dashboard::default());
        let transport = Arc::new(MockTransport::default());
        let store = remote.clone().unwrap_or_default();

        let dispatcher = Arc::new(CommandDispatcher::new(
            dashboard.clone(),
            transport.clone(),
            remote.map(|remote| remote as Arc<dyn RemoteStore>),
            AccessPoint::default(),
        ));

        Self {
            router: create_router(dashboard.clone(), dispatcher, Locale::Vi),
            dashboard,
            remote: store,
            transport,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).method(method);
        let body = match body {
            Some(body) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_string(&body).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }
}
