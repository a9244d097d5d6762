//! Sensor driver backends.
//!
//! A driver performs the actual device read. Drivers are blocking and are
//! only ever called from one poll at a time per device.

pub mod mock;
pub mod simulated;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sensight_common::Value;

use crate::catalog::Attribute;

pub use mock::{PollStep, ScriptedDriver};
pub use simulated::SimulatedDriver;

/// Errors reported by a driver backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("device {address} unreachable: {message}")]
    Unreachable { address: String, message: String },

    #[error("failed to read {attribute} from {address}: {message}")]
    Read {
        address: String,
        attribute: Attribute,
        message: String,
    },
}

/// Narrow capability interface of a sensor backend.
pub trait SensorDriver: Send {
    /// Drop cached readings so the next read hits the device.
    fn clear_cache(&mut self);

    /// Read one attribute.
    fn read_attribute(&mut self, attribute: Attribute) -> Result<Value, DriverError>;
}

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Generated readings, no hardware required.
    Simulated {
        /// Artificial latency per device read.
        #[serde(default = "default_latency_ms")]
        latency_ms: u64,
        /// Probability (0.0-1.0) that a poll fails.
        #[serde(default)]
        failure_rate: f64,
    },
}

fn default_latency_ms() -> u64 {
    50
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Simulated {
            latency_ms: default_latency_ms(),
            failure_rate: 0.0,
        }
    }
}

/// Construct the configured backend for one device.
pub fn build_driver(config: &BackendConfig, address: &str) -> Box<dyn SensorDriver> {
    match config {
        BackendConfig::Simulated {
            latency_ms,
            failure_rate,
        } => Box::new(
            SimulatedDriver::new(address)
                .with_latency(std::time::Duration::from_millis(*latency_ms))
                .with_failure_rate(*failure_rate),
        ),
    }
}

/// Clear the cache and read every monitored attribute, in catalog order.
pub fn read_all(driver: &mut dyn SensorDriver) -> Result<Vec<(Attribute, Value)>, DriverError> {
    driver.clear_cache();

    Attribute::ALL
        .iter()
        .map(|&attribute| driver.read_attribute(attribute).map(|value| (attribute, value)))
        .collect()
}
