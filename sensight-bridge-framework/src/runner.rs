//! Bridge runner for lifecycle management.

use std::future::Future;
use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinHandle;

use sensight_common::{connect, init_tracing};

use crate::BridgeArgs;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::publisher::Publisher;
use crate::status::StatusPublisher;
use crate::worker::{self, Schedule, Worker};

/// Bridge runner that manages the lifecycle of a sensor bridge.
///
/// Handles:
/// - Logging initialization
/// - Zenoh connection
/// - Worker spawning and management
/// - Status publishing on startup and shutdown
/// - Graceful shutdown on Ctrl+C
///
/// # Example
///
/// ```ignore
/// use sensight_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner, Schedule};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let args = BridgeArgs::parse_with_default("mybridge.json5");
///     let config = MyBridgeConfig::load(&args.config)?;
///
///     let mut runner = BridgeRunner::new_with_args("mybridge", config, Some(&args)).await?;
///     runner.spawn_worker(MyWorker::new(), schedule);
///
///     runner.run().await
/// }
/// ```
pub struct BridgeRunner<C: BridgeConfig> {
    /// Bridge name for logging and status.
    name: String,
    /// Bridge version.
    version: String,
    /// The loaded configuration.
    config: C,
    /// Zenoh session.
    session: Arc<zenoh::Session>,
    /// Publisher for worker output.
    publisher: Publisher,
    /// Status document publisher.
    status: StatusPublisher,
    /// Spawned tasks.
    tasks: Vec<JoinHandle<()>>,
}

impl<C: BridgeConfig> BridgeRunner<C> {
    /// Create a new bridge runner.
    pub async fn new(name: impl Into<String>, config: C) -> Result<Self> {
        Self::new_with_args(name, config, None).await
    }

    /// Create a new bridge runner with CLI args for log level override.
    ///
    /// This will:
    /// 1. Initialize logging based on config (with optional CLI override)
    /// 2. Connect to Zenoh
    /// 3. Create the publisher
    pub async fn new_with_args(
        name: impl Into<String>,
        config: C,
        args: Option<&BridgeArgs>,
    ) -> Result<Self> {
        let name = name.into();
        let version = env!("CARGO_PKG_VERSION").to_string();

        let log_config = match args.and_then(|a| a.log_level.as_deref()) {
            Some(level) => config.logging().with_level(level),
            None => config.logging().clone(),
        };

        init_tracing(&log_config).map_err(|e| BridgeError::config(e.to_string()))?;

        tracing::info!(bridge = %name, version = %version, "Starting bridge");

        let session = Arc::new(
            connect(config.zenoh())
                .await
                .map_err(|e| BridgeError::ZenohConnection(e.to_string()))?,
        );

        let publisher = Publisher::new(session.clone(), config.key_prefix());
        let status = StatusPublisher::new(publisher.clone(), &name, &version);

        Ok(Self {
            name,
            version,
            config,
            session,
            publisher,
            status,
            tasks: Vec::new(),
        })
    }

    /// Get the bridge name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the bridge version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Get a reference to the Zenoh session.
    pub fn session(&self) -> &Arc<zenoh::Session> {
        &self.session
    }

    /// Get a clone of the publisher.
    pub fn publisher(&self) -> Publisher {
        self.publisher.clone()
    }

    /// Spawn a task.
    ///
    /// The task will be tracked and aborted on shutdown.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        self.tasks.push(handle);
    }

    /// Spawn a worker on its polling schedule.
    pub fn spawn_worker<W>(&mut self, worker: W, schedule: Schedule)
    where
        W: Worker + 'static,
    {
        let publisher = self.publisher();
        self.spawn(worker::run_worker(worker, publisher, schedule));
    }

    /// Announce discovery, run a single cycle for `worker`, then shut down.
    pub async fn run_once<W: Worker>(self, mut worker: W, announce: bool) -> Result<()> {
        self.publish_running().await;

        if announce {
            worker::announce(&worker, &self.publisher).await;
        }
        let stats = worker::publish_cycle(&mut worker, &self.publisher).await;

        tracing::info!(
            bridge = %self.name,
            published = stats.success,
            failed = stats.failed,
            "Single update cycle complete"
        );

        self.shutdown().await
    }

    /// Run the bridge until Ctrl+C is received.
    ///
    /// This will:
    /// 1. Publish "running" status
    /// 2. Wait for Ctrl+C signal
    /// 3. Abort all spawned tasks
    /// 4. Publish "offline" status
    /// 5. Close the Zenoh session
    pub async fn run(self) -> Result<()> {
        self.publish_running().await;

        tracing::info!(
            bridge = %self.name,
            tasks = self.tasks.len(),
            "Bridge running. Press Ctrl+C to stop."
        );

        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }

        tracing::info!(bridge = %self.name, "Received shutdown signal");

        self.shutdown().await
    }

    async fn publish_running(&self) {
        if let Err(e) = self.status.publish_running(self.config.status_metadata()).await {
            tracing::warn!(error = %e, "Failed to publish running status");
        }
    }

    async fn shutdown(self) -> Result<()> {
        for task in &self.tasks {
            task.abort();
        }

        // Let aborted workers unwind before the session goes away.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        if let Err(e) = self.status.publish_offline().await {
            tracing::warn!(error = %e, "Failed to publish offline status");
        }

        // Retained publishers hold the session; drop them before closing.
        drop(self.status);
        drop(self.publisher);

        if let Err(e) = self.session.close().await {
            tracing::warn!(error = %e, "Error closing Zenoh session");
        }

        tracing::info!(bridge = %self.name, "Goodbye!");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Runner tests require a Zenoh session; the end-to-end tests under
    // tests/ cover publishing through a live session.
}
