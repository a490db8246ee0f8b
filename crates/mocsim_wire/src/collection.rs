//! The result-collection service.
//!
//! Per connection: one row-count byte `c` (0–255), then `c` rows of
//! `per_row` doubles. Rows accumulate across any number of connections
//! until the expected total arrives, at which point the accept loop
//! terminates and hands the rows back.

use crate::codec::{self, with_deadline};
use crate::error::Result;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Collects result rows until `expected_rows` have arrived.
///
/// Connections are processed one at a time. A connection that fails
/// mid-batch is logged and contributes nothing — its partial batch is
/// discarded, and the rows remain outstanding for the job's eventual
/// re-run (the protocol has no re-issue, so in practice this means the
/// run will not complete; the service still must not crash or hang).
///
/// # Errors
///
/// Returns an error only if accepting on the listener itself fails.
pub async fn serve_collection(
    listener: TcpListener,
    per_row: usize,
    expected_rows: u64,
    read_timeout: Duration,
) -> Result<Vec<Vec<f64>>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    while (rows.len() as u64) < expected_rows {
        let (stream, peer) = listener.accept().await?;

        match read_batch(stream, per_row, read_timeout).await {
            Ok(batch) => {
                debug!(%peer, batch = batch.len(), total = rows.len() + batch.len(), "batch received");
                rows.extend(batch);
            }
            Err(error) => {
                warn!(%peer, %error, "collection connection failed");
            }
        }
    }

    info!(rows = rows.len(), "all result rows collected");
    Ok(rows)
}

/// Reads one batch: the count byte, then exactly that many rows.
async fn read_batch(
    mut stream: TcpStream,
    per_row: usize,
    read_timeout: Duration,
) -> Result<Vec<Vec<f64>>> {
    let mut count = [0u8; 1];
    with_deadline(read_timeout, stream.read_exact(&mut count)).await?;

    let mut batch = Vec::with_capacity(count[0] as usize);
    for _ in 0..count[0] {
        batch.push(with_deadline(read_timeout, codec::read_row(&mut stream, per_row)).await?);
    }

    Ok(batch)
}
