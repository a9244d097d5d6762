//! Update cycle orchestration.

use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;

use sensight_bridge_framework::Worker;
use sensight_common::{Availability, DiscoveryMessage, Message, TopicBuilder, Value};

use crate::availability::AvailabilityTracker;
use crate::catalog::Attribute;
use crate::config::MifloraConfig;
use crate::device::{Device, is_busy, lock_driver};
use crate::discovery::{DiscoveryConfigBuilder, WORKER_NAME};
use crate::driver::{self, build_driver};
use crate::timeout::{PollError, run_with_deadline};

/// Polls every registered MiFlora sensor once per cycle.
pub struct MifloraWorker {
    devices: Vec<Device>,
    tracker: AvailabilityTracker,
    topics: TopicBuilder,
    discovery: DiscoveryConfigBuilder,
    timeout: Duration,
}

impl MifloraWorker {
    /// Build a worker with the configured backend for every device.
    pub fn from_config(config: &MifloraConfig) -> Self {
        let devices = config
            .devices
            .iter()
            .map(|d| Device::new(&d.name, &d.address, build_driver(&config.backend, &d.address)))
            .collect();

        Self::with_devices(config, devices)
    }

    /// Build a worker around already constructed devices.
    ///
    /// Devices are polled in the given order.
    pub fn with_devices(config: &MifloraConfig, devices: Vec<Device>) -> Self {
        let topics = TopicBuilder::new(&config.key_prefix);
        let discovery = DiscoveryConfigBuilder::new(
            topics.clone(),
            &config.discovery.prefix,
            &config.discovery.gateway_id,
        );

        tracing::info!(devices = devices.len(), "Adding MiFlora devices");

        let mut tracker = AvailabilityTracker::new(config.max_fail_count);
        for device in &devices {
            tracing::debug!(device = %device.name(), address = %device.address(), "Adding device");
            tracker.register(device.name());
        }

        Self {
            devices,
            tracker,
            topics,
            discovery,
            timeout: config.timeout(),
        }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn tracker(&self) -> &AvailabilityTracker {
        &self.tracker
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Clear the driver cache and read every attribute under the deadline.
///
/// A device whose previous read overran its deadline and is still running
/// fails immediately instead of queueing another read behind it.
async fn poll_device(
    device: &Device,
    deadline: Duration,
) -> Result<Vec<(Attribute, Value)>, PollError> {
    let handle = device.driver();
    if is_busy(&handle) {
        return Err(PollError::Busy);
    }

    run_with_deadline(deadline, move || {
        let mut guard = lock_driver(&handle);
        driver::read_all(&mut **guard)
    })
    .await
}

impl Worker for MifloraWorker {
    fn name(&self) -> &str {
        WORKER_NAME
    }

    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn discovery(&self) -> Vec<DiscoveryMessage> {
        self.devices
            .iter()
            .flat_map(|device| self.discovery.build_config(device))
            .collect()
    }

    fn run_cycle(&mut self) -> BoxStream<'_, Message> {
        let Self {
            devices,
            tracker,
            topics,
            timeout,
            ..
        } = self;
        let timeout = *timeout;

        tracing::info!(devices = devices.len(), "Updating all MiFlora devices");

        async_stream::stream! {
            for device in devices.iter() {
                let name = device.name();
                tracing::debug!(device = %name, address = %device.address(), "Polling device");

                match poll_device(device, timeout).await {
                    Ok(readings) => {
                        tracker.record_success(name);

                        for (attribute, value) in readings {
                            yield Message::reading(topics.reading(name, attribute.as_str()), value);
                        }
                        yield Message::availability(topics.availability(name), Availability::Online);
                    }
                    Err(e) => {
                        if e.is_timeout() {
                            tracing::warn!(device = %name, address = %device.address(), "Device poll timed out");
                        } else {
                            tracing::warn!(device = %name, address = %device.address(), error = %e, "Failed to update device");
                        }

                        if tracker.record_failure(name) {
                            tracing::warn!(
                                device = %name,
                                fail_count = tracker.fail_count(name),
                                "Device marked offline"
                            );
                            yield Message::availability(topics.availability(name), Availability::Offline);
                        }
                    }
                }
            }
        }
        .boxed()
    }
}

impl std::fmt::Debug for MifloraWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MifloraWorker")
            .field("devices", &self.devices)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
