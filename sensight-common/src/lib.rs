//! SenSight Common Library
//!
//! This crate provides shared types and utilities for SenSight sensor bridges:
//!
//! - [`message`] - Wire messages (`Message`, `Value`, `Availability`)
//! - [`discovery`] - Auto-discovery descriptors
//! - [`topic`] - Topic builders and parsers
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`session`] - Zenoh session management
//! - [`error`] - Error types

pub mod config;
pub mod discovery;
pub mod error;
pub mod message;
pub mod session;
pub mod topic;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig, ZenohConfig, load_config, parse_config};
pub use discovery::{DiscoveryDevice, DiscoveryMessage, SENSOR_COMPONENT, SensorDiscovery};
pub use error::{Error, Result};
pub use message::{Availability, Message, Value};
pub use session::connect;
pub use topic::{DISCOVERY_PREFIX, KEY_PREFIX, ParsedTopic, TopicBuilder, discovery_topic};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))
}
