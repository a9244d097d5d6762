//! Bridge status reporting.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::publisher::Publisher;

/// Lifecycle state reported in the status document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeState {
    Running,
    Offline,
    Error,
}

/// Bridge status information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeStatus {
    /// Bridge name (e.g., "miflora").
    pub bridge: String,
    /// Bridge version.
    pub version: String,
    /// Current state.
    pub status: BridgeState,
    /// Additional metadata (worker-specific).
    #[serde(flatten)]
    pub metadata: serde_json::Value,
}

impl BridgeStatus {
    fn with_state(bridge: impl Into<String>, version: impl Into<String>, status: BridgeState) -> Self {
        Self {
            bridge: bridge.into(),
            version: version.into(),
            status,
            metadata: serde_json::Value::Null,
        }
    }

    /// Create a new status with "running" state.
    pub fn running(bridge: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_state(bridge, version, BridgeState::Running)
    }

    /// Create a status with "offline" state.
    pub fn offline(bridge: impl Into<String>, version: impl Into<String>) -> Self {
        Self::with_state(bridge, version, BridgeState::Offline)
    }

    /// Create a status with "error" state.
    pub fn error(
        bridge: impl Into<String>,
        version: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::with_state(bridge, version, BridgeState::Error)
            .with_metadata(serde_json::json!({ "error": error.into() }))
    }

    /// Add metadata to the status.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Publish this status to `{key_prefix}/@/status`.
    pub async fn publish(&self, publisher: &Publisher) -> Result<()> {
        let key = format!("{}/@/status", publisher.key_prefix());
        publisher.publish_json(&key, self).await
    }
}

/// Helper to publish bridge status on startup and shutdown.
pub struct StatusPublisher {
    publisher: Publisher,
    bridge_name: String,
    version: String,
}

impl StatusPublisher {
    /// Create a new status publisher.
    pub fn new(
        publisher: Publisher,
        bridge_name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            publisher,
            bridge_name: bridge_name.into(),
            version: version.into(),
        }
    }

    /// Publish "running" status with metadata.
    pub async fn publish_running(&self, metadata: serde_json::Value) -> Result<()> {
        BridgeStatus::running(&self.bridge_name, &self.version)
            .with_metadata(metadata)
            .publish(&self.publisher)
            .await
    }

    /// Publish "offline" status.
    pub async fn publish_offline(&self) -> Result<()> {
        BridgeStatus::offline(&self.bridge_name, &self.version)
            .publish(&self.publisher)
            .await
    }

    /// Publish "error" status.
    pub async fn publish_error(&self, error: impl Into<String>) -> Result<()> {
        BridgeStatus::error(&self.bridge_name, &self.version, error)
            .publish(&self.publisher)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_running() {
        let status = BridgeStatus::running("miflora", "0.1.0");
        assert_eq!(status.bridge, "miflora");
        assert_eq!(status.status, BridgeState::Running);
    }

    #[test]
    fn test_status_error_metadata() {
        let status = BridgeStatus::error("miflora", "0.1.0", "adapter missing");
        assert_eq!(status.status, BridgeState::Error);
        assert_eq!(status.metadata["error"], "adapter missing");
    }

    #[test]
    fn test_status_serialization() {
        let status = BridgeStatus::running("miflora", "1.0.0")
            .with_metadata(serde_json::json!({ "devices": ["herbs", "ficus"] }));

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"bridge\":\"miflora\""));
        assert!(json.contains("\"status\":\"running\""));
        assert!(json.contains("\"devices\":[\"herbs\",\"ficus\"]"));
    }

    #[test]
    fn test_offline_without_metadata() {
        let json = serde_json::to_value(BridgeStatus::offline("miflora", "1.0.0")).unwrap();
        assert_eq!(json["status"], "offline");
    }
}
