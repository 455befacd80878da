use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::dashboard::Dashboard;
use crate::remote::{ROOMS_PATH, RemoteStore, is_empty_snapshot};
use crate::simulate;

/// Keeps the room store in sync with the `rooms` collection of the remote store.
pub struct LiveBridge {
    dashboard: Arc<Dashboard>,
    remote: Arc<dyn RemoteStore>,
}

impl LiveBridge {
    pub fn new(dashboard: Arc<Dashboard>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { dashboard, remote }
    }

    /// Follows the remote feed until it fails or closes.
    ///
    /// A failed subscription falls back to simulation. There is no retry.
    pub async fn run(self) {
        let mut feed = match self.remote.subscribe(ROOMS_PATH).await {
            Ok(feed) => feed,
            Err(e) => {
                error!("remote subscription failed: {}", e);
                self.fall_back();
                return;
            }
        };

        while let Some(event) = feed.recv().await {
            match event {
                Ok(snapshot) => self.apply(snapshot).await,
                Err(e) => {
                    error!("remote read failed: {}", e);
                    self.fall_back();
                    return;
                }
            }
        }

        warn!("remote feed for {} closed", ROOMS_PATH);
    }

    /// Handles one snapshot of the `rooms` collection.
    pub async fn apply(&self, snapshot: Option<Value>) {
        if is_empty_snapshot(snapshot.as_ref()) {
            self.seed().await;
            self.dashboard.go_live();
            return;
        }

        self.dashboard.go_live();

        if let Some(Value::Object(rooms)) = &snapshot {
            let merged = self.dashboard.rooms_mut().await.merge_snapshot(rooms);
            debug!("merged {} remote rooms", merged);
        }

        self.dashboard.refresh().await;
    }

    async fn seed(&self) {
        info!("no remote room data found, seeding {}", ROOMS_PATH);

        let seed = match self.dashboard.rooms().await.to_value() {
            Ok(seed) => seed,
            Err(e) => {
                error!("failed to serialize rooms for seeding: {}", e);
                return;
            }
        };

        if let Err(e) = self.remote.write(ROOMS_PATH, seed).await {
            error!("failed to seed {}: {}", ROOMS_PATH, e);
        }
    }

    fn fall_back(&self) {
        info!("falling back to simulation");
        simulate::spawn(Arc::clone(&self.dashboard));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Map, json};
    use tokio::sync::mpsc;

    use super::*;
    use crate::dashboard::{DashboardConfig, DashboardEvent};
    use crate::error::StoreError;
    use crate::remote::{Feed, MemoryStore};
    use crate::room::RoomId;

    struct UnreachableStore;

    #[async_trait]
    impl RemoteStore for UnreachableStore {
        async fn read(&self, _path: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::Request("unreachable".into()))
        }

        async fn write(&self, _path: &str, _value: Value) -> Result<(), StoreError> {
            Err(StoreError::Request("unreachable".into()))
        }

        async fn update(&self, _updates: Map<String, Value>) -> Result<(), StoreError> {
            Err(StoreError::Request("unreachable".into()))
        }

        async fn subscribe(&self, path: &str) -> Result<Feed, StoreError> {
            let (tx, rx) = mpsc::channel(1);
            tx.send(Err(StoreError::SubscriptionClosed {
                path: path.to_string(),
                reason: "permission denied".into(),
            }))
            .await
            .ok();

            Ok(rx)
        }
    }

    fn dashboard() -> Arc<Dashboard> {
        Arc::new(Dashboard::new(DashboardConfig {
            simulation_interval: Duration::from_millis(3000),
            ..DashboardConfig::default()
        }))
    }

    #[tokio::test]
    async fn test_remote_merge_scenario() {
        let dashboard = dashboard();
        let before = dashboard.rooms().await.clone();
        let remote = Arc::new(MemoryStore::new());
        let bridge = LiveBridge::new(dashboard.clone(), remote.clone());

        bridge.apply(Some(json!({ "kitchen": { "temp": 30.2 } }))).await;

        assert!(!dashboard.is_simulating());
        let rooms = dashboard.rooms().await;
        assert_eq!(rooms.get(RoomId::Kitchen).temp, 30.2);
        assert_eq!(rooms.get(RoomId::Kitchen).humidity, before.get(RoomId::Kitchen).humidity);
        assert_eq!(rooms.get(RoomId::Kitchen).light, before.get(RoomId::Kitchen).light);
        for id in [RoomId::LivingRoom, RoomId::Bedroom, RoomId::ServerRoom] {
            assert_eq!(rooms.get(id), before.get(id));
        }
        assert_eq!(remote.snapshot(ROOMS_PATH), None);
    }

    #[tokio::test]
    async fn test_empty_remote_is_seeded() {
        let dashboard = dashboard();
        let before = dashboard.rooms().await.clone();
        let remote = Arc::new(MemoryStore::new());
        let bridge = LiveBridge::new(dashboard.clone(), remote.clone());

        bridge.apply(None).await;

        assert!(!dashboard.is_simulating());
        assert_eq!(*dashboard.rooms().await, before);
        let seeded = remote.snapshot(ROOMS_PATH).unwrap();
        assert_eq!(seeded, before.to_value().unwrap());
        assert_eq!(seeded["server-room"]["controls"]["fan"], json!(true));
    }

    #[tokio::test]
    async fn test_run_seeds_then_merges_echo() {
        let dashboard = dashboard();
        let remote = Arc::new(MemoryStore::new());
        let mut events = dashboard.subscribe();

        tokio::spawn(LiveBridge::new(dashboard.clone(), remote.clone()).run());

        // The seed write comes back through the feed as a full snapshot.
        let DashboardEvent::Refresh(snapshot) = events.recv().await.unwrap();
        assert!(!snapshot.view.simulating);
        assert!(remote.snapshot("rooms/kitchen").is_some());

        remote.write("rooms/bedroom/humidity", json!(61)).await.unwrap();
        let DashboardEvent::Refresh(_) = events.recv().await.unwrap();
        assert_eq!(dashboard.rooms().await.get(RoomId::Bedroom).humidity, 61);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscription_error_falls_back_to_simulation() {
        let dashboard = dashboard();
        let mut events = dashboard.subscribe();

        LiveBridge::new(dashboard.clone(), Arc::new(UnreachableStore)).run().await;

        assert!(dashboard.is_simulating());
        let DashboardEvent::Refresh(snapshot) = events.recv().await.unwrap();
        assert!(snapshot.view.simulating);
        assert_eq!(dashboard.rooms().await.current_room().history.len(), 1);
    }
}
