//! Zenoh bridge for Xiaomi MiFlora plant sensors.

use anyhow::{Context, Result};
use sensight_bridge_framework::{BridgeArgs, BridgeConfig, BridgeRunner};
use zenoh_bridge_miflora::{MifloraBridgeConfig, MifloraWorker};

#[tokio::main]
async fn main() -> Result<()> {
    let args = BridgeArgs::parse_with_default("miflora.json5");

    let config = MifloraBridgeConfig::load(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    let worker = MifloraWorker::from_config(&config.miflora);
    let schedule = config.miflora.schedule();

    let mut runner = BridgeRunner::new_with_args("miflora", config, Some(&args)).await?;

    tracing::info!(
        devices = runner.config().miflora.devices.len(),
        interval_secs = schedule.interval.as_secs(),
        timeout_ms = runner.config().miflora.timeout_ms,
        "Loaded MiFlora configuration"
    );

    if args.once {
        return Ok(runner.run_once(worker, schedule.announce).await?);
    }

    runner.spawn_worker(worker, schedule);
    Ok(runner.run().await?)
}
