use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::auth::Locale;

/// Device clocks run in UTC while timestamps are picked in local wall-clock time (UTC+7).
pub const HARDWARE_CLOCK_OFFSET_SECS: i64 = 7 * 60 * 60;

/// Shifts a local wall-clock timestamp to the device clock, `None` on overflow.
pub fn hardware_timestamp(timestamp: i64) -> Option<i64> {
    timestamp.checked_add(HARDWARE_CLOCK_OFFSET_SECS)
}

/// Entry of the `devices` registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default = "unknown_name")]
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
}

fn unknown_name() -> String {
    String::from("Unknown")
}

/// Parses the registry snapshot, skipping entries that are not device objects.
pub fn parse_registry(snapshot: &Value) -> BTreeMap<String, DeviceInfo> {
    let Some(entries) = snapshot.as_object() else {
        return BTreeMap::new();
    };

    entries
        .iter()
        .filter_map(|(id, entry)| match serde_json::from_value::<DeviceInfo>(entry.clone()) {
            Ok(info) => Some((id.clone(), info)),
            Err(e) => {
                warn!("skip malformed device entry {}: {}", id, e);
                None
            }
        })
        .collect()
}

/// Command envelope published to a device, e.g. `{"cmd":"set_timestamp","timestamp":1700025200}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DeviceCommand {
    Reboot,
    /// Drops the stored WiFi credentials and restarts the device in access-point mode.
    FactoryReset,
    SetTimestamp { timestamp: i64 },
}

impl DeviceCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceCommand::Reboot => "reboot",
            DeviceCommand::FactoryReset => "factory_reset",
            DeviceCommand::SetTimestamp { .. } => "set_timestamp",
        }
    }
}

/// Access point a device exposes after a WiFi reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub ip: String,
    pub ssid: String,
    pub password: String,
}

impl Default for AccessPoint {
    fn default() -> Self {
        Self {
            ip: String::from("192.168.4.1"),
            ssid: String::from("ESP32_SmartHome"),
            password: String::from("12345678"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiGuide {
    pub device_id: String,
    pub ssid: String,
    pub password: String,
    pub portal_url: String,
    pub steps: Vec<String>,
}

impl WifiGuide {
    pub fn new(device_id: &str, access_point: &AccessPoint, locale: Locale) -> Self {
        let portal_url = format!("http://{}", access_point.ip);
        let AccessPoint { ssid, password, .. } = access_point;

        let steps = match locale {
            Locale::Vi => vec![
                format!("Kết nối vào mạng WiFi {} (mật khẩu: {})", ssid, password),
                format!("Mở trình duyệt và truy cập {}", portal_url),
                String::from("Chọn WiFi nhà bạn, nhập mật khẩu và lưu lại"),
            ],
            Locale::En => vec![
                format!("Connect to the WiFi network {} (password: {})", ssid, password),
                format!("Open {} in a browser", portal_url),
                String::from("Pick your home network, enter its password and save"),
            ],
        };

        Self {
            device_id: device_id.to_string(),
            ssid: ssid.clone(),
            password: password.clone(),
            steps,
            portal_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_hardware_timestamp_offset() {
        assert_eq!(hardware_timestamp(1_700_000_000), Some(1_700_025_200));
        assert_eq!(hardware_timestamp(i64::MAX), None);
        assert_eq!(hardware_timestamp(i64::MAX - HARDWARE_CLOCK_OFFSET_SECS), Some(i64::MAX));
    }

    #[test]
    fn test_command_wire_format() {
        assert_eq!(serde_json::to_value(DeviceCommand::Reboot).unwrap(), json!({ "cmd": "reboot" }));
        assert_eq!(
            serde_json::to_value(DeviceCommand::FactoryReset).unwrap(),
            json!({ "cmd": "factory_reset" })
        );
        assert_eq!(
            serde_json::to_value(DeviceCommand::SetTimestamp { timestamp: 1_700_025_200 }).unwrap(),
            json!({ "cmd": "set_timestamp", "timestamp": 1_700_025_200 })
        );
    }

    #[test]
    fn test_parse_registry_defaults_and_skips() {
        let registry = parse_registry(&json!({
            "esp32-a": { "name": "Hall", "ip": "10.0.0.12" },
            "esp32-b": {},
            "broken": 42,
        }));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry["esp32-a"].ip.as_deref(), Some("10.0.0.12"));
        assert_eq!(registry["esp32-b"].name, "Unknown");
        assert_eq!(registry["esp32-b"].ip, None);
    }

    #[test]
    fn test_wifi_guide() {
        let guide = WifiGuide::new("esp32-a", &AccessPoint::default(), Locale::Vi);

        assert_eq!(guide.portal_url, "http://192.168.4.1");
        assert_eq!(guide.ssid, "ESP32_SmartHome");
        assert_eq!(guide.steps.len(), 3);
        assert_eq!(guide.steps[1], "Mở trình duyệt và truy cập http://192.168.4.1");

        let guide = WifiGuide::new("esp32-a", &AccessPoint::default(), Locale::En);
        assert_eq!(guide.steps[1], "Open http://192.168.4.1 in a browser");
    }
}
