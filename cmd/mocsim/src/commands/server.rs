//! Server command implementation.

use anyhow::{Context, Result};
use mocsim_report::Report;
use mocsim_wire::WireConfig;
use std::fs;
use tracing::info;

/// Runs the server: both services until all rows arrive, then reporting.
pub async fn run(
    definition_path: &str,
    output_path: Option<&str>,
    raw_output_path: Option<&str>,
    format: &str,
    config: &WireConfig,
) -> Result<()> {
    let definition_text = fs::read_to_string(definition_path)
        .with_context(|| format!("Failed to read definition file: {definition_path}"))?;

    let definition = mocsidef::parse(&definition_text)
        .with_context(|| "Failed to parse simulation definition")?;

    info!(
        trials = definition.trial_count,
        variables = definition.variables.len(),
        recorded = definition.recorded_names().len(),
        "definition loaded"
    );

    let rows = mocsim_wire::run_server(&definition, config).await?;

    let names = definition.recorded_names();
    let report = Report::from_rows(&names, &rows);

    let rendered = match format.to_lowercase().as_str() {
        "text" => report.to_string(),
        "json" => serde_json::to_string_pretty(&report)
            .with_context(|| "Failed to serialize report")?,
        _ => {
            anyhow::bail!("Unknown report format: {format}. Use 'text' or 'json'.");
        }
    };

    println!("{rendered}");

    if let Some(path) = output_path {
        fs::write(path, &rendered)
            .with_context(|| format!("Failed to write report file: {path}"))?;
        info!("report written to: {}", path);
    }

    if let Some(path) = raw_output_path {
        write_raw_rows(path, &names, &rows)
            .with_context(|| format!("Failed to write raw output file: {path}"))?;
        info!("raw rows written to: {}", path);
    }

    Ok(())
}

/// Dumps every collected row as CSV, recorded names as the header.
fn write_raw_rows(path: &str, names: &[&str], rows: &[Vec<f64>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(names)?;
    for row in rows {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    writer.flush()?;
    Ok(())
}
