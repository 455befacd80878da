use std::env;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use homesync_core::DashboardConfig;
use homesync_core::auth::Locale;
use homesync_core::device::AccessPoint;
use serde::{Deserialize, Serialize};
use time::UtcOffset;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GatewayAuth {
    Basic { username: String, password: String },
    Tls { ca_path: String, cert_path: String, key_path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayTopic {
    pub prefix: String,
}

impl GatewayTopic {
    pub fn command(&self, device_id: &str) -> String {
        format!("{}/{}/command", self.prefix.trim_end_matches('/'), device_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gateway {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
    pub topic: GatewayTopic,
    pub auth: Option<GatewayAuth>,
}

fn default_keep_alive() -> u64 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub url: String,
    pub auth: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default = "default_simulation_interval")]
    pub simulation_interval_ms: u64,
    #[serde(default = "default_chart_points")]
    pub chart_points: usize,
    #[serde(default)]
    pub utc_offset_hours: i8,
    #[serde(default)]
    pub locale: Locale,
}

fn default_simulation_interval() -> u64 {
    3000
}

fn default_chart_points() -> usize {
    20
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            simulation_interval_ms: default_simulation_interval(),
            chart_points: default_chart_points(),
            utc_offset_hours: 0,
            locale: Locale::default(),
        }
    }
}

impl Dashboard {
    pub fn to_config(&self) -> Result<DashboardConfig, ConfigError> {
        let utc_offset = UtcOffset::from_hms(self.utc_offset_hours, 0, 0)
            .map_err(|e| ConfigError::Message(format!("dashboard.utc_offset_hours: {e}")))?;

        if self.simulation_interval_ms == 0 {
            return Err(ConfigError::Message(String::from(
                "dashboard.simulation_interval_ms must be greater than 0",
            )));
        }

        Ok(DashboardConfig {
            simulation_interval: Duration::from_millis(self.simulation_interval_ms),
            chart_points: self.chart_points,
            utc_offset,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provisioning {
    pub ip: String,
    pub ssid: String,
    pub password: String,
}

impl Default for Provisioning {
    fn default() -> Self {
        let AccessPoint { ip, ssid, password } = AccessPoint::default();
        Self { ip, ssid, password }
    }
}

impl From<Provisioning> for AccessPoint {
    fn from(provisioning: Provisioning) -> Self {
        Self {
            ip: provisioning.ip,
            ssid: provisioning.ssid,
            password: provisioning.password,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub gateway: Gateway,
    pub database: Option<Database>,
    #[serde(default)]
    pub dashboard: Dashboard,
    #[serde(default)]
    pub provisioning: Provisioning,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let builder = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{}", run_mode)).required(false))
            .add_source(Environment::default().separator("__"));

        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Some(GatewayAuth::Tls { ca_path, cert_path, key_path }) = &mut settings.gateway.auth {
            *ca_path = normalize_path(ca_path)?;
            *cert_path = normalize_path(cert_path)?;
            *key_path = normalize_path(key_path)?;
        }

        settings.dashboard.to_config()?;

        Ok(settings)
    }
}

fn project_root() -> Result<PathBuf, std::io::Error> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // development and testing environments
        Ok(PathBuf::from(manifest_dir))
    } else {
        // runtime root relative path `folder/executable` -> `folder/`
        let exe = env::current_exe()?;
        Ok(exe.parent().map(PathBuf::from).unwrap_or_default())
    }
}

/// Resolves `~/` against the project root, leaving other paths untouched.
pub fn normalize_path(path: &str) -> Result<String, ConfigError> {
    Ok(match path.strip_prefix("~/") {
        Some(relative) => project_root()
            .map_err(|e| ConfigError::Message(e.to_string()))?
            .join(relative)
            .to_string_lossy()
            .into_owned(),
        None => path.to_string(),
    })
}
