//! # Ledger Fabric Node Runtime
//!
//! The main entry point for a fabric node.
//!
//! ## Subsystems
//!
//! 1. Consensus (RAFT leader election and log replication)
//! 2. Bridge (Byzantine-quorum oracle coordination)
//! 3. Transaction Ordering (scoring and online learning)
//! 4. Streaming (subscription fan-out services)
//!
//! All subsystems communicate through the observer bus; configuration
//! arrives as one record, overridable from the environment.

use anyhow::Result;
use fabric_telemetry::{init_telemetry, TelemetryConfig};
use node_runtime::{build_node, config_from_env};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(&TelemetryConfig::from_env())?;

    info!("===========================================");
    info!("  Ledger Fabric Node Runtime v0.1.0");
    info!("===========================================");

    let config = config_from_env();
    let node = build_node("fabric-node-0", config).await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down gracefully...");
    node.shutdown();
    Ok(())
}
