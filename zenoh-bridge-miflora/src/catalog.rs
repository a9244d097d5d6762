//! Monitored attributes and their discovery metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reading exposed by a MiFlora sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Temperature,
    Moisture,
    Light,
    Conductivity,
    Battery,
}

impl Attribute {
    /// Every monitored attribute, in publishing order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Temperature,
        Attribute::Moisture,
        Attribute::Light,
        Attribute::Conductivity,
        Attribute::Battery,
    ];

    /// Name used in topics and driver calls.
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Temperature => "temperature",
            Attribute::Moisture => "moisture",
            Attribute::Light => "light",
            Attribute::Conductivity => "conductivity",
            Attribute::Battery => "battery",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static discovery metadata for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub attribute: Attribute,
    pub unit_of_measurement: &'static str,
    pub icon: Option<&'static str>,
    pub device_class: Option<&'static str>,
    /// Last segment of the discovery unique id.
    pub unique_id_suffix: &'static str,
}

/// Look up the discovery metadata of an attribute.
pub fn descriptor_for(attribute: Attribute) -> AttributeDescriptor {
    let (unit_of_measurement, icon, device_class, unique_id_suffix) = match attribute {
        Attribute::Temperature => ("°C", None, Some("temperature"), "temperature"),
        Attribute::Moisture => ("%", Some("mdi:water"), None, "moisture"),
        Attribute::Light => ("lux", None, Some("illuminance"), "illuminance"),
        Attribute::Conductivity => ("µS/cm", Some("mdi:leaf"), None, "conductivity"),
        Attribute::Battery => ("%", None, Some("battery"), "battery"),
    };

    AttributeDescriptor {
        attribute,
        unit_of_measurement,
        icon,
        device_class,
        unique_id_suffix,
    }
}
