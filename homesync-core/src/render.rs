use std::collections::BTreeMap;

use serde::Serialize;

use crate::room::{Actuator, RoomId};
use crate::store::RoomStore;

/// Presentation surface the dashboard is projected onto.
pub trait RenderTarget {
    fn room_name(&mut self, room: RoomId, name: &str);

    fn readouts(&mut self, temp: f64, humidity: u8, light: u32);

    fn toggle(&mut self, actuator: Actuator, on: bool);

    fn badge(&mut self, room: RoomId, active: usize);
}

/// Projects the current room and the badges of every room onto `target`.
pub fn render<T: RenderTarget + ?Sized>(store: &RoomStore, target: &mut T) {
    let current = store.current();
    let room = store.current_room();

    target.room_name(current, &room.name);
    target.readouts(room.temp, room.humidity, room.light);

    for actuator in Actuator::ALL {
        target.toggle(actuator, room.controls.get(actuator));
    }

    for (id, count) in store.badge_counts() {
        target.badge(id, count);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleView {
    pub checked: bool,
    pub status: &'static str,
    pub active: bool,
}

impl ToggleView {
    pub fn new(on: bool) -> Self {
        Self {
            checked: on,
            status: if on { "On" } else { "Off" },
            active: on,
        }
    }
}

impl Default for ToggleView {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Serializable dashboard state, the render target served to browsers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    pub room: Option<RoomId>,
    pub room_name: String,
    pub temperature: f64,
    pub humidity: u8,
    pub light: u32,
    pub toggles: BTreeMap<Actuator, ToggleView>,
    pub badges: BTreeMap<RoomId, usize>,
    pub simulating: bool,
}

impl RenderTarget for DashboardView {
    fn room_name(&mut self, room: RoomId, name: &str) {
        self.room = Some(room);
        self.room_name = name.to_string();
    }

    fn readouts(&mut self, temp: f64, humidity: u8, light: u32) {
        self.temperature = temp;
        self.humidity = humidity;
        self.light = light;
    }

    fn toggle(&mut self, actuator: Actuator, on: bool) {
        self.toggles.insert(actuator, ToggleView::new(on));
    }

    fn badge(&mut self, room: RoomId, active: usize) {
        self.badges.insert(room, active);
    }
}
