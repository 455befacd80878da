use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::auth::Locale;
use crate::dashboard::Dashboard;
use crate::device::{AccessPoint, DeviceCommand, DeviceInfo, WifiGuide, hardware_timestamp, parse_registry};
use crate::error::CommandError;
use crate::remote::{DEVICES_PATH, ROOMS_PATH, RemoteStore};
use crate::room::{Actuator, RoomId};
use crate::transport::MessageTransport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WifiReset {
    /// Whether `factory_reset` went out. The guide is returned either way.
    pub command_sent: bool,
    pub guide: WifiGuide,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeSyncReport {
    /// Timestamp actually sent, hardware offset included.
    pub timestamp: i64,
    pub accepted: Vec<String>,
    pub failed: Vec<String>,
}

/// Turns user actions into local state changes, remote writes and device commands.
pub struct CommandDispatcher {
    dashboard: Arc<Dashboard>,
    transport: Arc<dyn MessageTransport>,
    remote: Option<Arc<dyn RemoteStore>>,
    access_point: AccessPoint,
}

impl CommandDispatcher {
    pub fn new(
        dashboard: Arc<Dashboard>,
        transport: Arc<dyn MessageTransport>,
        remote: Option<Arc<dyn RemoteStore>>,
        access_point: AccessPoint,
    ) -> Self {
        Self { dashboard, transport, remote, access_point }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Applies the toggle locally first, then mirrors the single field remotely
    /// when live. A failed remote write is logged and the local value kept.
    pub async fn set_actuator(&self, room: RoomId, actuator: Actuator, on: bool) {
        self.dashboard.rooms_mut().await.set_actuator(room, actuator, on);
        self.dashboard.refresh().await;

        if self.dashboard.is_simulating() {
            return;
        }

        let Some(remote) = &self.remote else {
            return;
        };

        let mut updates = Map::new();
        updates.insert(format!("{}/{}/controls/{}", ROOMS_PATH, room, actuator), Value::Bool(on));

        if let Err(e) = remote.update(updates).await {
            error!("failed to write {} {} of {}: {}", actuator, on, room, e);
        }
    }

    /// Sends `command` if the transport is connected, without touching it otherwise.
    pub async fn send_device_command(&self, device_id: &str, command: &DeviceCommand) -> Result<(), CommandError> {
        if !self.transport.is_connected() {
            warn!("transport not connected, refuse {} for {}", command.name(), device_id);
            return Err(CommandError::NotConnected);
        }

        self.transport
            .send(device_id, command)
            .await
            .map_err(|source| CommandError::SendFailed {
                device_id: device_id.to_string(),
                command: command.name(),
                source,
            })?;

        info!("sent {} to {}", command.name(), device_id);
        Ok(())
    }

    pub async fn reboot(&self, device_id: &str) -> Result<(), CommandError> {
        self.send_device_command(device_id, &DeviceCommand::Reboot).await
    }

    /// Puts the device back into access-point mode and returns the setup guide in `locale`.
    pub async fn reset_wifi(&self, device_id: &str, locale: Locale) -> WifiReset {
        let command_sent = match self.send_device_command(device_id, &DeviceCommand::FactoryReset).await {
            Ok(()) => true,
            Err(e) => {
                warn!("factory reset of {} not sent: {}", device_id, e);
                false
            }
        };

        WifiReset {
            command_sent,
            guide: WifiGuide::new(device_id, &self.access_point, locale),
        }
    }

    /// Sends the local wall-clock `timestamp` to one device. Returns the adjusted value.
    pub async fn sync_time(&self, device_id: &str, timestamp: i64) -> Result<i64, CommandError> {
        let timestamp = hardware_timestamp(timestamp).ok_or(CommandError::InvalidTimestamp(timestamp))?;
        self.send_device_command(device_id, &DeviceCommand::SetTimestamp { timestamp })
            .await?;

        Ok(timestamp)
    }

    /// Sends `timestamp` to every device of the registry.
    pub async fn sync_time_all(&self, timestamp: i64) -> Result<TimeSyncReport, CommandError> {
        let adjusted = hardware_timestamp(timestamp).ok_or(CommandError::InvalidTimestamp(timestamp))?;

        if !self.transport.is_connected() {
            return Err(CommandError::NotConnected);
        }

        let remote = self.remote.as_ref().ok_or(CommandError::StoreUnavailable)?;
        let registry = remote.read(DEVICES_PATH).await?;
        let device_ids: Vec<String> = match registry {
            Some(Value::Object(devices)) if !devices.is_empty() => devices.keys().cloned().collect(),
            _ => return Err(CommandError::NoDevices),
        };

        let mut report = TimeSyncReport {
            timestamp: adjusted,
            ..TimeSyncReport::default()
        };
        let command = DeviceCommand::SetTimestamp { timestamp: report.timestamp };

        for device_id in device_ids {
            match self.send_device_command(&device_id, &command).await {
                Ok(()) => report.accepted.push(device_id),
                Err(e) => {
                    warn!("{}", e);
                    report.failed.push(device_id);
                }
            }
        }

        info!(
            "time sync sent to {} of {} devices",
            report.accepted.len(),
            report.accepted.len() + report.failed.len()
        );

        Ok(report)
    }

    pub async fn list_devices(&self) -> Result<BTreeMap<String, DeviceInfo>, CommandError> {
        let remote = self.remote.as_ref().ok_or(CommandError::StoreUnavailable)?;

        Ok(remote
            .read(DEVICES_PATH)
            .await?
            .map(|registry| parse_registry(&registry))
            .unwrap_or_default())
    }
}
