//! Auto-discovery descriptors.
//!
//! Descriptors follow the Home Assistant MQTT discovery layout so any
//! consumer speaking that format can create entities for announced sensors.

use serde::{Deserialize, Serialize};

/// Component type for plain numeric sensors.
pub const SENSOR_COMPONENT: &str = "sensor";

/// Physical device an announced entity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDevice {
    /// Stable identifiers used to group entities under one device.
    pub identifiers: Vec<String>,
    pub manufacturer: String,
    pub model: String,
    pub name: String,
}

/// Discovery payload describing one sensor attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorDiscovery {
    pub unique_id: String,
    pub state_topic: String,
    pub availability_topic: String,
    pub name: String,
    pub device: DiscoveryDevice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
}

/// A discovery descriptor together with the topic it is announced on.
///
/// Discovery messages are always retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryMessage {
    pub topic: String,
    pub descriptor: SensorDiscovery,
}

impl DiscoveryMessage {
    /// Discovery descriptors must survive subscriber restarts.
    pub fn retain(&self) -> bool {
        true
    }

    /// Encode the descriptor as JSON.
    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.descriptor)
    }
}
