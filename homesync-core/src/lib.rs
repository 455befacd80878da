pub mod auth;
pub mod bridge;
pub mod chart;
pub mod dashboard;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod remote;
pub mod render;
pub mod room;
pub mod simulate;
pub mod store;
pub mod transport;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

pub use bridge::LiveBridge;
pub use dashboard::{Dashboard, DashboardConfig, DashboardEvent, Mode, Snapshot};
pub use dispatch::CommandDispatcher;
pub use remote::{MemoryStore, RemoteStore};
pub use room::{Actuator, Room, RoomId};
pub use store::RoomStore;
pub use transport::MessageTransport;

/// Starts the writer of sensor data for the session: the live bridge when a
/// remote store is available, the simulation otherwise.
pub fn start(dashboard: Arc<Dashboard>, remote: Option<Arc<dyn RemoteStore>>) -> Option<JoinHandle<()>> {
    match remote {
        Some(remote) => {
            info!("remote store configured, connecting live data");
            Some(tokio::spawn(LiveBridge::new(dashboard, remote).run()))
        }
        None => {
            info!("no remote store configured, simulating");
            simulate::spawn(dashboard)
        }
    }
}
