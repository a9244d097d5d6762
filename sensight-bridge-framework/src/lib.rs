//! SenSight Bridge Framework
//!
//! Common abstractions for hosting sensor workers that publish to Zenoh.
//!
//! # Overview
//!
//! This framework provides:
//! - [`BridgeConfig`] trait for configuration loading and validation
//! - [`BridgeRunner`] for managing bridge lifecycle (startup, shutdown, signal handling)
//! - [`Publisher`] for publishing messages and discovery descriptors to Zenoh
//! - [`Worker`] and [`run_worker`] for periodic update cycles
//! - [`BridgeArgs`] for common CLI argument parsing
//! - [`BridgeStatus`] for standardized status reporting
//!
//! # Example
//!
//! ```ignore
//! use sensight_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner, Schedule};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = BridgeArgs::parse_with_default("mybridge.json5");
//!     let config = MyBridgeConfig::load(&args.config)?;
//!
//!     let mut runner = BridgeRunner::new_with_args("mybridge", config, Some(&args)).await?;
//!     runner.spawn_worker(my_worker, Schedule { interval, announce: true });
//!
//!     // Run until Ctrl+C
//!     runner.run().await
//! }
//! ```

mod args;
mod config;
mod error;
mod publisher;
mod runner;
mod status;
pub mod worker;

pub use args::BridgeArgs;
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
pub use publisher::{DEFAULT_RETAINED_CACHE, PublishStats, Publisher};
pub use runner::BridgeRunner;
pub use status::{BridgeState, BridgeStatus, StatusPublisher};
pub use worker::{Schedule, Worker, run_worker};

// Re-export commonly used types from sensight-common
pub use sensight_common::{
    Availability, DiscoveryMessage, LoggingConfig, Message, Value, ZenohConfig,
};
