use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::error::RoomError;

/// Maximum number of readings kept per room.
pub const HISTORY_CAPACITY: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomId {
    LivingRoom,
    Bedroom,
    Kitchen,
    ServerRoom,
}

impl RoomId {
    pub const ALL: [RoomId; 4] = [
        RoomId::LivingRoom,
        RoomId::Bedroom,
        RoomId::Kitchen,
        RoomId::ServerRoom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomId::LivingRoom => "living-room",
            RoomId::Bedroom => "bedroom",
            RoomId::Kitchen => "kitchen",
            RoomId::ServerRoom => "server-room",
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomId {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| RoomError::UnknownRoom(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actuator {
    Lights,
    Fan,
    Ac,
}

impl Actuator {
    pub const ALL: [Actuator; 3] = [Actuator::Lights, Actuator::Fan, Actuator::Ac];

    pub fn as_str(&self) -> &'static str {
        match self {
            Actuator::Lights => "lights",
            Actuator::Fan => "fan",
            Actuator::Ac => "ac",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Actuator {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Actuator::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| RoomError::UnknownActuator(s.to_string()))
    }
}

/// Actuator states of a room. Fields missing from a remote payload read as off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    #[serde(default)]
    pub lights: bool,
    #[serde(default)]
    pub fan: bool,
    #[serde(default)]
    pub ac: bool,
}

impl Controls {
    pub fn all(on: bool) -> Self {
        Self { lights: on, fan: on, ac: on }
    }

    pub fn get(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Lights => self.lights,
            Actuator::Fan => self.fan,
            Actuator::Ac => self.ac,
        }
    }

    pub fn set(&mut self, actuator: Actuator, on: bool) {
        match actuator {
            Actuator::Lights => self.lights = on,
            Actuator::Fan => self.fan = on,
            Actuator::Ac => self.ac = on,
        }
    }

    pub fn active_count(&self) -> usize {
        Actuator::ALL.iter().filter(|a| self.get(**a)).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub value: f64,
}

/// Chronological readings, oldest evicted first once [`HISTORY_CAPACITY`] is exceeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History(VecDeque<Reading>);

impl History {
    pub fn new() -> Self {
        Self(VecDeque::with_capacity(HISTORY_CAPACITY + 1))
    }

    pub fn push(&mut self, reading: Reading) {
        self.0.push_back(reading);
        while self.0.len() > HISTORY_CAPACITY {
            self.0.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Reading> + ExactSizeIterator {
        self.0.iter()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.0.back()
    }
}

impl<'de> Deserialize<'de> for History {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let readings = Vec::<Reading>::deserialize(deserializer)?;
        let mut history = History::new();
        for reading in readings {
            history.push(reading);
        }

        Ok(history)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub temp: f64,
    #[serde(deserialize_with = "percent")]
    pub humidity: u8,
    #[serde(deserialize_with = "lux")]
    pub light: u32,
    #[serde(default)]
    pub controls: Controls,
    #[serde(default)]
    pub history: History,
}

impl Room {
    pub fn new(name: &str, temp: f64, humidity: u8, light: u32, controls: Controls) -> Self {
        Self {
            name: name.to_string(),
            temp,
            humidity: humidity.min(100),
            light,
            controls,
            history: History::new(),
        }
    }

    /// Default state of a room at startup.
    pub fn defaults(id: RoomId) -> Self {
        match id {
            RoomId::LivingRoom => Room::new("Living Room", 24.5, 45, 350, Controls::default()),
            RoomId::Bedroom => Room::new("Bedroom", 22.0, 50, 100, Controls::default()),
            RoomId::Kitchen => Room::new("Kitchen", 26.0, 60, 800, Controls::default()),
            RoomId::ServerRoom => Room::new("Server Room", 18.0, 35, 50, Controls::all(true)),
        }
    }
}

// Remote writers may send humidity and light as floats.
fn percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(0.0, 100.0) as u8)
}

fn lux<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(0.0, u32::MAX as f64) as u32)
}
