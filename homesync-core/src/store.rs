use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::room::{Actuator, Room, RoomId};

/// In-memory room states keyed by the fixed room set, plus the current room pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomStore {
    rooms: BTreeMap<RoomId, Room>,
    current: RoomId,
}

impl RoomStore {
    pub fn new() -> Self {
        Self {
            rooms: RoomId::ALL.into_iter().map(|id| (id, Room::defaults(id))).collect(),
            current: RoomId::LivingRoom,
        }
    }

    pub fn get(&self, id: RoomId) -> &Room {
        // Every id is seeded in `new` and rooms are never removed.
        &self.rooms[&id]
    }

    pub fn get_mut(&mut self, id: RoomId) -> &mut Room {
        self.rooms.entry(id).or_insert_with(|| Room::defaults(id))
    }

    pub fn rooms(&self) -> impl Iterator<Item = (RoomId, &Room)> {
        self.rooms.iter().map(|(id, room)| (*id, room))
    }

    pub fn rooms_mut(&mut self) -> impl Iterator<Item = (RoomId, &mut Room)> {
        self.rooms.iter_mut().map(|(id, room)| (*id, room))
    }

    pub fn current(&self) -> RoomId {
        self.current
    }

    pub fn current_room(&self) -> &Room {
        self.get(self.current)
    }

    pub fn set_current(&mut self, id: RoomId) {
        self.current = id;
    }

    pub fn set_actuator(&mut self, id: RoomId, actuator: Actuator, on: bool) {
        self.get_mut(id).controls.set(actuator, on);
    }

    /// Number of active actuators for every room.
    pub fn badge_counts(&self) -> BTreeMap<RoomId, usize> {
        self.rooms
            .iter()
            .map(|(id, room)| (*id, room.controls.active_count()))
            .collect()
    }

    /// Shallow-merges `partial` over the room named `key`.
    ///
    /// Unknown room keys are ignored. A field whose value does not fit the
    /// room schema is skipped and the local value kept. Returns whether a room
    /// matched.
    pub fn merge(&mut self, key: &str, partial: &Value) -> bool {
        let id = match key.parse::<RoomId>() {
            Ok(id) => id,
            Err(_) => {
                debug!("ignore remote room {}", key);
                return false;
            }
        };

        let Some(fields) = partial.as_object() else {
            warn!("remote room {} is not an object, keep local state", key);
            return true;
        };

        let room = self.get_mut(id);
        let mut merged = match serde_json::to_value(&*room) {
            Ok(Value::Object(map)) => map,
            _ => return true,
        };

        for (field, value) in fields {
            let mut candidate = merged.clone();
            candidate.insert(field.clone(), value.clone());

            match serde_json::from_value::<Room>(Value::Object(candidate.clone())) {
                Ok(_) => merged = candidate,
                Err(e) => warn!("skip remote field {}.{}: {}", key, field, e),
            }
        }

        match serde_json::from_value::<Room>(Value::Object(merged)) {
            Ok(updated) => *room = updated,
            Err(e) => warn!("failed to merge remote room {}: {}", key, e),
        }

        true
    }

    /// Merges every room present both locally and in `snapshot`.
    pub fn merge_snapshot(&mut self, snapshot: &Map<String, Value>) -> usize {
        snapshot
            .iter()
            .filter(|(key, fields)| self.merge(key, fields))
            .count()
    }

    /// Full room set in the shape stored remotely under `rooms`.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let rooms: BTreeMap<&str, &Room> = self
            .rooms
            .iter()
            .map(|(id, room)| (id.as_str(), room))
            .collect();

        serde_json::to_value(rooms)
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}
