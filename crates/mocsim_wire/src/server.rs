//! Server orchestration: both services, concurrently.

use crate::collection::serve_collection;
use crate::config::WireConfig;
use crate::distribution::serve_distribution;
use crate::error::Result;
use mocsidef::SimulationDefinition;
use mocsim_engine::{job_count, CLIENT_JOB_SIZE};
use std::net::Ipv4Addr;
use tokio::net::TcpListener;
use tracing::info;

/// Runs the distribution and collection services until every trial's row
/// has been collected, then returns the rows.
///
/// The two accept loops run concurrently and share nothing mutable —
/// only values derived from the read-only definition: its checksum, the
/// job count, the recorded-column width, and the expected row total.
///
/// # Errors
///
/// Fails if either listener cannot bind or its accept loop fails;
/// individual client connections cannot fail the run.
pub async fn run_server(
    definition: &SimulationDefinition,
    config: &WireConfig,
) -> Result<Vec<Vec<f64>>> {
    let checksum = definition.checksum();
    let total_jobs = job_count(CLIENT_JOB_SIZE, definition.trial_count);
    let per_row = definition.recorded_names().len();
    let expected_rows = u64::from(definition.trial_count);

    let distribution =
        TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.distribution_port)).await?;
    let collection = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.collection_port)).await?;

    info!(
        checksum,
        total_jobs,
        expected_rows,
        distribution_port = config.distribution_port,
        collection_port = config.collection_port,
        "server listening"
    );

    let ((), rows) = tokio::try_join!(
        serve_distribution(distribution, checksum, total_jobs, config.read_timeout),
        serve_collection(collection, per_row, expected_rows, config.read_timeout),
    )?;

    Ok(rows)
}
