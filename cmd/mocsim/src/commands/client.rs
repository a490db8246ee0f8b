//! Client command implementation.

use anyhow::{Context, Result};
use mocsim_wire::{Error, WireConfig};
use std::fs;
use std::net::IpAddr;
use tracing::info;

/// Runs one client: handshake, simulate the assigned job, submit rows.
pub async fn run(definition_path: &str, server: &str, config: &WireConfig) -> Result<()> {
    let definition_text = fs::read_to_string(definition_path)
        .with_context(|| format!("Failed to read definition file: {definition_path}"))?;

    let definition = mocsidef::parse(&definition_text)
        .with_context(|| "Failed to parse simulation definition")?;

    let server: IpAddr = server
        .parse()
        .with_context(|| format!("Invalid server address: {server}"))?;

    info!(
        %server,
        trials = definition.trial_count,
        "definition loaded, requesting a job"
    );

    match mocsim_wire::run_client(&definition, server, config).await {
        Ok(rows) => {
            info!(rows, "client finished");
            Ok(())
        }
        Err(Error::ChecksumMismatch) => {
            anyhow::bail!(
                "Server rejected this definition's checksum: the server is \
                 running a different simulation definition. Exiting."
            );
        }
        Err(error) => Err(error).with_context(|| "Client run failed"),
    }
}
