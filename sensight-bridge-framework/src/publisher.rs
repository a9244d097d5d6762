//! Message publisher for Zenoh.
//!
//! Retained messages go through per-key `zenoh-ext` advanced publishers with
//! a sample cache, so subscribers that join later still receive the last
//! value (the Zenoh counterpart of a retained MQTT message). Volatile
//! messages are plain `put`s on the session.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use zenoh::Session;
use zenoh_ext::{AdvancedPublisher, AdvancedPublisherBuilderExt, CacheConfig};

use sensight_common::{DiscoveryMessage, Message};

use crate::error::{BridgeError, Result};

/// Number of samples kept for each retained key.
pub const DEFAULT_RETAINED_CACHE: usize = 1;

/// Publisher for sending worker output to Zenoh.
#[derive(Clone)]
pub struct Publisher {
    session: Arc<Session>,
    key_prefix: String,
    retained: Arc<RetainedPublishers>,
}

/// Lazily created advanced publishers, one per retained key.
struct RetainedPublishers {
    cache_size: usize,
    publishers: RwLock<HashMap<String, AdvancedPublisher<'static>>>,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("key_prefix", &self.key_prefix)
            .field("cache_size", &self.retained.cache_size)
            .finish_non_exhaustive()
    }
}

impl Publisher {
    /// Create a new publisher.
    pub fn new(session: Arc<Session>, key_prefix: impl Into<String>) -> Self {
        Self::with_cache_size(session, key_prefix, DEFAULT_RETAINED_CACHE)
    }

    /// Create a publisher keeping `cache_size` samples per retained key.
    pub fn with_cache_size(
        session: Arc<Session>,
        key_prefix: impl Into<String>,
        cache_size: usize,
    ) -> Self {
        Self {
            session,
            key_prefix: key_prefix.into(),
            retained: Arc::new(RetainedPublishers {
                cache_size: cache_size.max(1),
                publishers: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Get the key prefix.
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Get a reference to the Zenoh session.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Publish a message, honouring its `retain` flag.
    pub async fn publish(&self, message: &Message) -> Result<()> {
        let payload = message.payload.to_payload();

        if message.retain {
            self.put_retained(&message.topic, payload).await
        } else {
            self.put_volatile(&message.topic, payload).await
        }
    }

    /// Publish a discovery announcement (always retained).
    pub async fn publish_discovery(&self, message: &DiscoveryMessage) -> Result<()> {
        let payload = message.to_payload()?;
        self.put_retained(&message.topic, payload).await
    }

    /// Publish a JSON value to a key without retaining it.
    pub async fn publish_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_vec(value)?;
        self.put_volatile(key, payload).await
    }

    /// Publish a batch of messages.
    ///
    /// Failures are logged and counted; they never stop the batch.
    pub async fn publish_batch<'a, I>(&self, messages: I) -> PublishStats
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let mut stats = PublishStats::default();

        for message in messages {
            stats.record(self.publish(message).await);
        }

        stats
    }

    /// Publish a batch of discovery announcements.
    pub async fn publish_discovery_batch<'a, I>(&self, messages: I) -> PublishStats
    where
        I: IntoIterator<Item = &'a DiscoveryMessage>,
    {
        let mut stats = PublishStats::default();

        for message in messages {
            stats.record(self.publish_discovery(message).await);
        }

        stats
    }

    /// Number of retained keys with a live advanced publisher.
    pub async fn retained_key_count(&self) -> usize {
        self.retained.publishers.read().await.len()
    }

    async fn put_volatile(&self, key: &str, payload: Vec<u8>) -> Result<()> {
        self.session
            .put(key, payload)
            .await
            .map_err(|e| BridgeError::publish(key, e))
    }

    async fn put_retained(&self, key: &str, payload: Vec<u8>) -> Result<()> {
        self.ensure_retained_publisher(key).await?;

        let publishers = self.retained.publishers.read().await;
        match publishers.get(key) {
            Some(publisher) => publisher
                .put(payload)
                .await
                .map_err(|e| BridgeError::publish(key, e)),
            None => Err(BridgeError::publish(key, "retained publisher missing")),
        }
    }

    async fn ensure_retained_publisher(&self, key: &str) -> Result<()> {
        if self.retained.publishers.read().await.contains_key(key) {
            return Ok(());
        }

        let publisher: AdvancedPublisher<'static> = self
            .session
            .declare_publisher(key.to_string())
            .cache(CacheConfig::default().max_samples(self.retained.cache_size))
            .publisher_detection()
            .await
            .map_err(|e| {
                BridgeError::publish(key, format!("Failed to create advanced publisher: {}", e))
            })?;

        let mut publishers = self.retained.publishers.write().await;
        publishers.entry(key.to_string()).or_insert(publisher);

        tracing::debug!(key = %key, cache_size = self.retained.cache_size, "Created retained publisher");

        Ok(())
    }
}

/// Statistics from a batch publish operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishStats {
    /// Number of successfully published messages.
    pub success: usize,
    /// Number of failed publishes.
    pub failed: usize,
}

impl PublishStats {
    /// Count one publish outcome, logging failures.
    pub fn record(&mut self, result: Result<()>) {
        match result {
            Ok(()) => self.success += 1,
            Err(e) => {
                self.failed += 1;
                tracing::warn!(error = %e, "Failed to publish message");
            }
        }
    }

    /// Total number of attempted publishes.
    pub fn total(&self) -> usize {
        self.success + self.failed
    }

    /// Success rate as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            100.0
        } else {
            (self.success as f64 / self.total() as f64) * 100.0
        }
    }
}

impl std::ops::AddAssign for PublishStats {
    fn add_assign(&mut self, other: Self) {
        self.success += other.success;
        self.failed += other.failed;
    }
}
