use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info};

use crate::dashboard::{Dashboard, Mode};
use crate::room::{Reading, Room};
use crate::store::RoomStore;

const TEMP_DRIFT: f64 = 0.25;
const HUMIDITY_DRIFT: f64 = 1.0;
const LIGHT_DRIFT: f64 = 5.0;

/// Applies one step of random sensor drift to `room` and records the temperature.
pub fn drift<R: Rng + ?Sized>(room: &mut Room, now: OffsetDateTime, rng: &mut R) {
    let temp = room.temp + rng.random_range(-TEMP_DRIFT..=TEMP_DRIFT);
    room.temp = (temp * 10.0).round() / 10.0;

    let humidity = f64::from(room.humidity) + rng.random_range(-HUMIDITY_DRIFT..=HUMIDITY_DRIFT);
    room.humidity = humidity.round().clamp(0.0, 100.0) as u8;

    // Light has a floor but no ceiling.
    let light = f64::from(room.light) + rng.random_range(-LIGHT_DRIFT..=LIGHT_DRIFT);
    room.light = light.round().max(0.0) as u32;

    room.history.push(Reading { time: now, value: room.temp });
}

/// Drifts every room once.
pub fn tick<R: Rng + ?Sized>(store: &mut RoomStore, now: OffsetDateTime, rng: &mut R) {
    for (_, room) in store.rooms_mut() {
        drift(room, now, rng);
    }
}

/// Starts the session's simulation task, unless the dashboard is already live
/// or a simulation was started before.
pub fn spawn(dashboard: Arc<Dashboard>) -> Option<JoinHandle<()>> {
    if !dashboard.is_simulating() {
        debug!("dashboard is live, simulation not started");
        return None;
    }

    if !dashboard.claim_simulation() {
        debug!("simulation already running");
        return None;
    }

    Some(tokio::spawn(run(dashboard)))
}

async fn run(dashboard: Arc<Dashboard>) {
    let period = dashboard.simulation_interval();
    let mut interval = interval_at(Instant::now() + period, period);
    let mut mode = dashboard.watch_mode();
    let mut rng = StdRng::from_os_rng();

    info!("simulation started, interval {:?}", period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // A tick may race the switch to live.
                if !dashboard.is_simulating() {
                    break;
                }

                tick(&mut *dashboard.rooms_mut().await, OffsetDateTime::now_utc(), &mut rng);
                dashboard.refresh().await;
            },
            changed = mode.changed() => {
                if changed.is_err() || *mode.borrow_and_update() == Mode::Live {
                    break;
                }
            }
        }
    }

    info!("simulation stopped");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use time::macros::datetime;

    use super::*;
    use crate::dashboard::{DashboardConfig, DashboardEvent};
    use crate::room::{HISTORY_CAPACITY, RoomId};

    #[test]
    fn test_single_tick_scenario() {
        let mut store = RoomStore::new();
        let defaults = store.clone();
        let mut rng = StdRng::seed_from_u64(42);

        tick(&mut store, datetime!(2024-05-01 08:00:00 UTC), &mut rng);

        for id in RoomId::ALL {
            let room = store.get(id);
            assert_eq!(room.history.len(), 1);
            assert_eq!(room.history.latest().map(|r| r.value), Some(room.temp));
            // 0.25 drift, rounded to one decimal
            assert!((room.temp - defaults.get(id).temp).abs() <= 0.3 + 1e-9);
            assert_eq!(room.controls, defaults.get(id).controls);
        }
    }

    #[test]
    fn test_ticks_keep_bounds() {
        let mut store = RoomStore::new();
        store.get_mut(RoomId::Kitchen).humidity = 100;
        store.get_mut(RoomId::Bedroom).humidity = 0;
        store.get_mut(RoomId::ServerRoom).light = 0;
        let mut rng = StdRng::seed_from_u64(9);
        let start = datetime!(2024-05-01 00:00:00 UTC);

        for i in 0..500 {
            tick(&mut store, start + time::Duration::seconds(3 * i), &mut rng);

            for (_, room) in store.rooms() {
                assert!(room.humidity <= 100);
                assert!(room.history.len() <= HISTORY_CAPACITY);
            }
        }

        for (_, room) in store.rooms() {
            assert_eq!(room.history.len(), HISTORY_CAPACITY);
            let times: Vec<_> = room.history.iter().map(|r| r.time).collect();
            assert!(times.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_drift_rounding() {
        let mut room = Room::defaults(RoomId::LivingRoom);
        let mut rng = StdRng::seed_from_u64(5);

        drift(&mut room, datetime!(2024-05-01 08:00:00 UTC), &mut rng);

        assert_eq!((room.temp * 10.0).round() / 10.0, room.temp);
        assert!(room.humidity.abs_diff(45) <= 1);
        assert!(room.light.abs_diff(350) <= 5);
    }

    fn fast_dashboard() -> Arc<Dashboard> {
        Arc::new(Dashboard::new(DashboardConfig {
            simulation_interval: Duration::from_millis(3000),
            ..DashboardConfig::default()
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_task_ticks_and_refreshes() {
        let dashboard = fast_dashboard();
        let mut events = dashboard.subscribe();

        let handle = spawn(dashboard.clone()).unwrap();
        assert!(spawn(dashboard.clone()).is_none());

        let DashboardEvent::Refresh(snapshot) = events.recv().await.unwrap();
        assert!(snapshot.view.simulating);
        assert!(!snapshot.chart.dataset.placeholder);
        assert_eq!(dashboard.rooms().await.current_room().history.len(), 1);

        dashboard.go_live();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_does_not_start_when_live() {
        let dashboard = fast_dashboard();
        dashboard.go_live();

        assert!(spawn(dashboard.clone()).is_none());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(dashboard.rooms().await.current_room().history.is_empty());
    }
}
