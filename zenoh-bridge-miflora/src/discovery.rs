//! Discovery descriptors for MiFlora devices.

use sensight_common::{
    DiscoveryDevice, DiscoveryMessage, SENSOR_COMPONENT, SensorDiscovery, TopicBuilder,
    discovery_topic,
};

use crate::catalog::{Attribute, descriptor_for};
use crate::device::Device;

/// Worker name used in object ids and entity names.
pub const WORKER_NAME: &str = "miflora";

pub const MANUFACTURER: &str = "Xiaomi";

pub const MODEL: &str = "MiFlora";

/// Builds one discovery descriptor per monitored attribute of a device.
#[derive(Debug, Clone)]
pub struct DiscoveryConfigBuilder {
    topics: TopicBuilder,
    discovery_prefix: String,
    gateway_id: String,
}

impl DiscoveryConfigBuilder {
    pub fn new(
        topics: TopicBuilder,
        discovery_prefix: impl Into<String>,
        gateway_id: impl Into<String>,
    ) -> Self {
        let discovery_prefix: String = discovery_prefix.into();
        Self {
            topics,
            discovery_prefix: discovery_prefix.trim_end_matches('/').to_string(),
            gateway_id: gateway_id.into(),
        }
    }

    /// Build descriptors for `device`, in [`Attribute::ALL`] order.
    pub fn build_config(&self, device: &Device) -> Vec<DiscoveryMessage> {
        self.build_for(device.name(), device.address())
    }

    /// Build descriptors from a bare device identity.
    pub fn build_for(&self, name: &str, address: &str) -> Vec<DiscoveryMessage> {
        let node = node_id(address);
        let device = self.device_descriptor(name, address, &node);

        Attribute::ALL
            .iter()
            .map(|&attribute| {
                let meta = descriptor_for(attribute);
                let display_name = object_id(name, &[attribute.as_str()]);

                let descriptor = SensorDiscovery {
                    unique_id: self.discovery_id(&node, &object_id(name, &[meta.unique_id_suffix])),
                    state_topic: self.topics.reading(name, attribute.as_str()),
                    availability_topic: self.topics.availability(name),
                    name: display_name.clone(),
                    device: device.clone(),
                    unit_of_measurement: Some(meta.unit_of_measurement.to_string()),
                    icon: meta.icon.map(str::to_string),
                    device_class: meta.device_class.map(str::to_string),
                };

                DiscoveryMessage {
                    topic: discovery_topic(
                        &self.discovery_prefix,
                        SENSOR_COMPONENT,
                        &node,
                        &display_name,
                    ),
                    descriptor,
                }
            })
            .collect()
    }

    fn device_descriptor(&self, name: &str, address: &str, node: &str) -> DiscoveryDevice {
        DiscoveryDevice {
            identifiers: vec![
                address.to_string(),
                self.discovery_id(node, &object_id(name, &[])),
            ],
            manufacturer: MANUFACTURER.to_string(),
            model: MODEL.to_string(),
            name: object_id(name, &[]),
        }
    }

    fn discovery_id(&self, node: &str, object: &str) -> String {
        format!("{}/{}/{}", self.gateway_id, node, object)
    }
}

/// Discovery node id: the device address without separators.
pub fn node_id(address: &str) -> String {
    address.replace(':', "")
}

/// Object id: `miflora_<device>[_<part>...]`.
pub fn object_id(device: &str, parts: &[&str]) -> String {
    let mut id = format!("{}_{}", WORKER_NAME, device);
    for part in parts {
        id.push('_');
        id.push_str(part);
    }
    id
}
