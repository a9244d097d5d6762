//! Sensor workers and their polling schedule.
//!
//! A [`Worker`] owns a set of devices. It announces them once through
//! discovery descriptors and then, on every tick, produces a finite stream of
//! messages for one update cycle. The scheduler publishes each message as
//! soon as the worker yields it.

use std::time::{Duration, Instant};

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::time::MissedTickBehavior;

use sensight_common::{DiscoveryMessage, Message};

use crate::publisher::{PublishStats, Publisher};

/// A sensor worker driven by the bridge scheduler.
pub trait Worker: Send + Sync {
    /// Short worker name used in logs and status documents.
    fn name(&self) -> &str;

    /// Number of registered devices.
    fn device_count(&self) -> usize;

    /// Build discovery descriptors for every registered device.
    ///
    /// Descriptors are rebuilt on every call.
    fn discovery(&self) -> Vec<DiscoveryMessage>;

    /// Poll every registered device once.
    ///
    /// The returned stream is finite and cannot be restarted; call again for
    /// the next cycle.
    fn run_cycle(&mut self) -> BoxStream<'_, Message>;
}

/// Scheduling options for [`run_worker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Time between the start of two cycles.
    pub interval: Duration,
    /// Whether discovery descriptors are announced before the first cycle.
    pub announce: bool,
}

/// Publish discovery descriptors for a worker.
pub async fn announce<W: Worker + ?Sized>(worker: &W, publisher: &Publisher) -> PublishStats {
    let messages = worker.discovery();
    let stats = publisher.publish_discovery_batch(&messages).await;

    tracing::info!(
        worker = %worker.name(),
        descriptors = stats.success,
        failed = stats.failed,
        "Announced discovery descriptors"
    );

    stats
}

/// Run one update cycle and publish every message it yields.
pub async fn publish_cycle<W: Worker + ?Sized>(
    worker: &mut W,
    publisher: &Publisher,
) -> PublishStats {
    let started = Instant::now();
    let mut stats = PublishStats::default();

    let mut cycle = worker.run_cycle();
    while let Some(message) = cycle.next().await {
        stats.record(publisher.publish(&message).await);
    }
    drop(cycle);

    tracing::debug!(
        worker = %worker.name(),
        published = stats.success,
        failed = stats.failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Update cycle finished"
    );

    stats
}

/// Drive a worker forever according to `schedule`.
///
/// Ticks missed because a cycle overran the interval are delayed rather than
/// burst, so cycles never overlap.
pub async fn run_worker<W: Worker>(mut worker: W, publisher: Publisher, schedule: Schedule) {
    tracing::info!(
        worker = %worker.name(),
        devices = worker.device_count(),
        interval_secs = schedule.interval.as_secs(),
        "Starting worker"
    );

    if schedule.announce {
        announce(&worker, &publisher).await;
    }

    let mut ticker = tokio::time::interval(schedule.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        publish_cycle(&mut worker, &publisher).await;
    }
}

/// Collect one cycle without publishing it.
pub async fn collect_cycle<W: Worker + ?Sized>(worker: &mut W) -> Vec<Message> {
    worker.run_cycle().collect().await
}
