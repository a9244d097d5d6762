//! Configuration for the MiFlora bridge.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sensight_bridge_framework::{BridgeConfig, BridgeError, LoggingConfig, Schedule, ZenohConfig};
use sensight_common::topic::validate_segment;
use sensight_common::{DISCOVERY_PREFIX, KEY_PREFIX};

use crate::driver::BackendConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("At least one device must be configured")]
    NoDevices,

    #[error("Device '{name}': {reason}")]
    InvalidDevice { name: String, reason: String },

    #[error("Duplicate device name '{0}'")]
    DuplicateDevice(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for BridgeError {
    fn from(err: ConfigError) -> Self {
        BridgeError::validation(err.to_string())
    }
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MifloraBridgeConfig {
    /// Zenoh connection settings
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// MiFlora-specific settings
    pub miflora: MifloraConfig,
}

/// MiFlora worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MifloraConfig {
    /// Topic prefix (default: "sensight/miflora")
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Seconds between two update cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Per-device poll deadline in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Consecutive failures tolerated before a device is reported offline
    #[serde(default = "default_max_fail_count")]
    pub max_fail_count: u32,

    /// Auto-discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Driver backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Devices to poll, in polling order
    pub devices: Vec<DeviceConfig>,
}

fn default_key_prefix() -> String {
    format!("{}/miflora", KEY_PREFIX)
}

fn default_poll_interval() -> u64 {
    60
}

fn default_timeout_ms() -> u64 {
    6000
}

fn default_max_fail_count() -> u32 {
    3
}

/// Auto-discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Discovery topic prefix (default: "homeassistant")
    #[serde(default = "default_discovery_prefix")]
    pub prefix: String,

    /// Gateway id used in unique ids and device identifiers
    #[serde(default = "default_gateway_id")]
    pub gateway_id: String,
}

fn default_true() -> bool {
    true
}

fn default_discovery_prefix() -> String {
    DISCOVERY_PREFIX.to_string()
}

fn default_gateway_id() -> String {
    KEY_PREFIX.to_string()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: default_discovery_prefix(),
            gateway_id: default_gateway_id(),
        }
    }
}

/// A single MiFlora sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name (used in topics)
    pub name: String,

    /// Bluetooth MAC address, e.g. "C4:7C:8D:6A:12:34"
    pub address: String,
}

impl MifloraConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Scheduler settings: cycle period, and discovery announcement when enabled.
    pub fn schedule(&self) -> Schedule {
        Schedule {
            interval: self.poll_interval(),
            announce: self.discovery.enabled,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }

        if self.key_prefix.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(
                "key_prefix cannot be empty".to_string(),
            ));
        }

        if self.discovery.prefix.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(
                "discovery prefix cannot be empty".to_string(),
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }

        let BackendConfig::Simulated { failure_rate, .. } = &self.backend;
        if !(0.0..=1.0).contains(failure_rate) {
            return Err(ConfigError::Validation(format!(
                "failure_rate must be between 0.0 and 1.0, got {}",
                failure_rate
            )));
        }

        let mut names = HashSet::new();
        for device in &self.devices {
            validate_segment(&device.name).map_err(|e| ConfigError::InvalidDevice {
                name: device.name.clone(),
                reason: e.to_string(),
            })?;

            if !is_mac_address(&device.address) {
                return Err(ConfigError::InvalidDevice {
                    name: device.name.clone(),
                    reason: format!("invalid address '{}'", device.address),
                });
            }

            if !names.insert(device.name.as_str()) {
                return Err(ConfigError::DuplicateDevice(device.name.clone()));
            }
        }

        Ok(())
    }
}

/// `:`-separated two-digit hex groups.
fn is_mac_address(address: &str) -> bool {
    address
        .split(':')
        .all(|group| group.len() == 2 && group.chars().all(|c| c.is_ascii_hexdigit()))
}

impl BridgeConfig for MifloraBridgeConfig {
    fn zenoh(&self) -> &ZenohConfig {
        &self.zenoh
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn key_prefix(&self) -> &str {
        &self.miflora.key_prefix
    }

    fn status_metadata(&self) -> serde_json::Value {
        serde_json::json!({
            "devices": self.miflora.devices.iter().map(|d| &d.name).collect::<Vec<_>>(),
            "poll_interval_secs": self.miflora.poll_interval_secs,
        })
    }

    fn validate(&self) -> sensight_bridge_framework::Result<()> {
        self.miflora.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> MifloraBridgeConfig {
        json5::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse(
            r#"{
            miflora: {
                devices: [ { name: "herbs", address: "C4:7C:8D:6A:12:34" } ]
            }
        }"#,
        );

        let miflora = &config.miflora;
        assert_eq!(miflora.key_prefix, "sensight/miflora");
        assert_eq!(miflora.poll_interval(), Duration::from_secs(60));
        assert_eq!(miflora.timeout(), Duration::from_millis(6000));
        assert_eq!(miflora.max_fail_count, 3);
        assert_eq!(miflora.discovery, DiscoveryConfig::default());
        assert_eq!(miflora.backend, BackendConfig::default());
        assert_eq!(config.zenoh.mode, "peer");
        assert_eq!(config.logging.level, "info");
        assert!(miflora.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"{
            zenoh: { mode: "client", connect: ["tcp/localhost:7447"] },
            logging: { level: "debug", format: "json" },
            miflora: {
                key_prefix: "garden/plants",
                poll_interval_secs: 300,
                timeout_ms: 2500,
                max_fail_count: 1,
                discovery: { enabled: false, prefix: "ha", gateway_id: "shed" },
                backend: { type: "simulated", latency_ms: 10, failure_rate: 0.25 },
                devices: [
                    { name: "herbs", address: "C4:7C:8D:6A:12:34" },
                    { name: "ficus", address: "C4:7C:8D:6A:56:78" },
                ],
            },
        }"#,
        );

        let miflora = &config.miflora;
        assert_eq!(miflora.devices.len(), 2);
        assert_eq!(miflora.devices[0].name, "herbs");
        assert_eq!(miflora.devices[1].name, "ficus");
        assert!(!miflora.discovery.enabled);
        assert_eq!(
            miflora.schedule(),
            Schedule {
                interval: Duration::from_secs(300),
                announce: false
            }
        );
        assert_eq!(miflora.discovery.gateway_id, "shed");
        assert_eq!(config.key_prefix(), "garden/plants");
        assert!(config.miflora.validate().is_ok());

        let metadata = config.status_metadata();
        assert_eq!(metadata["devices"], serde_json::json!(["herbs", "ficus"]));
        assert_eq!(metadata["poll_interval_secs"], 300);
    }

    #[test]
    fn test_sample_config_is_valid() {
        let config = MifloraBridgeConfig::parse(include_str!("../miflora.json5")).unwrap();
        assert_eq!(config.miflora.devices.len(), 2);
        assert!(config.miflora.discovery.enabled);
    }

    #[test]
    fn test_bridge_config_parse_validates() {
        let result = MifloraBridgeConfig::parse(r#"{ miflora: { devices: [] } }"#);
        assert!(matches!(result, Err(BridgeError::ConfigValidation(_))));
    }

    fn config_with(devices: &[(&str, &str)]) -> MifloraConfig {
        MifloraConfig {
            key_prefix: default_key_prefix(),
            poll_interval_secs: 60,
            timeout_ms: 6000,
            max_fail_count: 3,
            discovery: DiscoveryConfig::default(),
            backend: BackendConfig::default(),
            devices: devices
                .iter()
                .map(|(name, address)| DeviceConfig {
                    name: name.to_string(),
                    address: address.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_validation_no_devices() {
        assert!(matches!(
            config_with(&[]).validate(),
            Err(ConfigError::NoDevices)
        ));
    }

    #[test]
    fn test_validation_device_names() {
        for name in ["", "my plant", "herbs/basil", "herb*", "#1", "a?b", "$x"] {
            let config = config_with(&[(name, "AA:BB:CC:DD:EE:FF")]);
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidDevice { .. })),
                "name {:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_validation_duplicate_names() {
        let config = config_with(&[("herbs", "AA:BB:CC:DD:EE:01"), ("herbs", "AA:BB:CC:DD:EE:02")]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateDevice(name)) if name == "herbs"
        ));
    }

    #[test]
    fn test_validation_addresses() {
        assert!(config_with(&[("a", "c4:7c:8d:6a:12:34")]).validate().is_ok());

        for address in ["", "C4-7C-8D-6A-12-34", "C4:7C:8D:6A:12:3", "ZZ:00"] {
            let config = config_with(&[("herbs", address)]);
            assert!(
                config.validate().is_err(),
                "address {:?} should be rejected",
                address
            );
        }
    }

    #[test]
    fn test_validation_numeric_limits() {
        let mut config = config_with(&[("herbs", "AA:BB")]);
        config.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = config_with(&[("herbs", "AA:BB")]);
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = config_with(&[("herbs", "AA:BB")]);
        config.backend = BackendConfig::Simulated {
            latency_ms: 0,
            failure_rate: 1.5,
        };
        assert!(config.validate().is_err());

        let mut config = config_with(&[("herbs", "AA:BB")]);
        config.discovery.prefix = "/".to_string();
        assert!(config.validate().is_err());

        let mut config = config_with(&[("herbs", "AA:BB")]);
        config.max_fail_count = 0;
        assert!(config.validate().is_ok());
    }
}
