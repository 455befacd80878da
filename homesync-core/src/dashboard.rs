use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, broadcast, watch};
use tracing::{debug, info};

use crate::chart::{CHART_POINTS, ChartAdapter, ChartView};
use crate::render::{DashboardView, render};
use crate::room::RoomId;
use crate::store::RoomStore;

pub const SIMULATION_INTERVAL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Simulating,
    Live,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub simulation_interval: Duration,
    pub chart_points: usize,
    pub utc_offset: UtcOffset,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            simulation_interval: SIMULATION_INTERVAL,
            chart_points: CHART_POINTS,
            utc_offset: UtcOffset::UTC,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub view: DashboardView,
    pub chart: ChartView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DashboardEvent {
    Refresh(Snapshot),
}

/// Owned dashboard state shared by the bridge, the simulator, the dispatcher and the handlers.
pub struct Dashboard {
    rooms: RwLock<RoomStore>,
    mode: watch::Sender<Mode>,
    chart: ChartAdapter,
    events: broadcast::Sender<DashboardEvent>,
    simulation_interval: Duration,
    simulation_started: AtomicBool,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        let (mode, _) = watch::channel(Mode::Simulating);
        let (events, _) = broadcast::channel(100);

        Self {
            rooms: RwLock::new(RoomStore::new()),
            mode,
            chart: ChartAdapter::new(config.chart_points, config.utc_offset),
            events,
            // A zero period would panic the interval timer.
            simulation_interval: config.simulation_interval.max(Duration::from_millis(1)),
            simulation_started: AtomicBool::new(false),
        }
    }

    pub fn mode(&self) -> Mode {
        *self.mode.borrow()
    }

    pub fn is_simulating(&self) -> bool {
        self.mode() == Mode::Simulating
    }

    /// Leaves simulation mode for the rest of the session. Returns whether the mode changed.
    pub fn go_live(&self) -> bool {
        let changed = self.mode.send_if_modified(|mode| {
            let was_simulating = *mode == Mode::Simulating;
            *mode = Mode::Live;
            was_simulating
        });

        if changed {
            info!("live data source connected, leaving simulation mode");
        }

        changed
    }

    pub fn watch_mode(&self) -> watch::Receiver<Mode> {
        self.mode.subscribe()
    }

    pub fn simulation_interval(&self) -> Duration {
        self.simulation_interval
    }

    /// Claims the single simulation slot of the session.
    pub(crate) fn claim_simulation(&self) -> bool {
        !self.simulation_started.swap(true, Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    pub async fn rooms(&self) -> RwLockReadGuard<'_, RoomStore> {
        self.rooms.read().await
    }

    pub async fn rooms_mut(&self) -> RwLockWriteGuard<'_, RoomStore> {
        self.rooms.write().await
    }

    pub async fn snapshot(&self) -> Snapshot {
        let rooms = self.rooms.read().await;
        self.project(&rooms)
    }

    fn project(&self, rooms: &RoomStore) -> Snapshot {
        let mut view = DashboardView::default();
        render(rooms, &mut view);
        view.simulating = self.is_simulating();

        // Seeded per room so a placeholder backfill stays stable across refreshes.
        let mut rng = StdRng::seed_from_u64(rooms.current() as u64);
        let mut chart = ChartView::default();
        self.chart.refresh(rooms.current_room(), OffsetDateTime::now_utc(), &mut rng, &mut chart);

        Snapshot { view, chart }
    }

    /// Re-renders the view and the chart and pushes them to subscribers.
    pub async fn refresh(&self) {
        let snapshot = self.snapshot().await;

        if self.events.send(DashboardEvent::Refresh(snapshot)).is_err() {
            debug!("no dashboard subscribers");
        }
    }

    pub async fn select_room(&self, id: RoomId) {
        self.rooms.write().await.set_current(id);
        debug!("current room set to {}", id);

        self.refresh().await;
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}
