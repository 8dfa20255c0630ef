//! # Discovery Ledger Node
//!
//! Startup sequence:
//!
//! 1. Initialize logging and metrics from `DL_*` telemetry variables
//! 2. Load and validate `NodeConfig` from the environment
//! 3. Build every component (see `NodeContainer`)
//! 4. Start the scheduler loops
//! 5. Run until Ctrl+C, then shut down gracefully

use anyhow::{Context, Result};
use ledger_telemetry::{init_telemetry, TelemetryConfig};
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = NodeConfig::from_env().context("Invalid node configuration")?;
    let mut runtime = NodeRuntime::new(config).context("Failed to build node")?;
    runtime.start();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    runtime.shutdown().await;
    if let Ok(metrics) = runtime.metrics_text() {
        debug!(bytes = metrics.len(), "Final metrics snapshot\n{metrics}");
    }
    Ok(())
}
