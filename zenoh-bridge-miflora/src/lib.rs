//! Zenoh bridge for Xiaomi MiFlora plant sensors.
//!
//! The bridge polls each configured sensor once per cycle, publishes its
//! readings and availability, and announces every sensor attribute through
//! auto-discovery descriptors.
//!
//! # Topics
//!
//! ```text
//! <prefix>/<device>/<attribute>      reading (retained)
//! <prefix>/<device>/availability     "online" | "offline" (retained)
//! <prefix>/@/status                  bridge status document
//! <discovery>/sensor/<node>/<object>/config
//! ```
//!
//! Where:
//! - `<attribute>` - `temperature`, `moisture`, `light`, `conductivity` or `battery`
//! - `<node>` - device address without `:` separators
//! - `<object>` - `miflora_<device>_<attribute>`
//!
//! A poll that fails or overruns its deadline is counted against the
//! device; once the count exceeds `max_fail_count` the device is reported
//! offline. Failures never stop the rest of the cycle.

pub mod availability;
pub mod catalog;
pub mod config;
pub mod device;
pub mod discovery;
pub mod driver;
pub mod timeout;
pub mod worker;

pub use availability::{AvailabilityState, AvailabilityStatus, AvailabilityTracker};
pub use catalog::{Attribute, AttributeDescriptor, descriptor_for};
pub use config::{ConfigError, MifloraBridgeConfig, MifloraConfig};
pub use device::Device;
pub use discovery::DiscoveryConfigBuilder;
pub use driver::{BackendConfig, DriverError, SensorDriver, build_driver};
pub use timeout::{PollError, run_with_deadline};
pub use worker::MifloraWorker;
