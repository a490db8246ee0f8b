//! The client driver.
//!
//! Handshake with the distribution service, run the assigned seed range
//! locally, and submit the result rows to the collection service in
//! batches — exactly once, no matter how trial completions interleave.

use crate::codec::{self, with_deadline, JOB_INDEX_BYTES, MATCH_FLAG, MAX_BATCH_ROWS};
use crate::config::WireConfig;
use crate::error::{Error, Result};
use mocsim_engine::{assigned_seeds, row_from_mapping, run_trial, CLIENT_JOB_SIZE};
use mocsidef::SimulationDefinition;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info};

/// Runs the full client sequence against a server.
///
/// Connects to the distribution service, obtains a job index (aborting
/// on a checksum mismatch before any trial is run), executes one trial
/// per assigned seed, and submits the rows to the collection service.
/// Returns how many rows were submitted.
///
/// # Errors
///
/// Fails on a rejected checksum, any connection failure, or a trial
/// evaluation error. A failed submission is not retried.
pub async fn run_client(
    definition: &SimulationDefinition,
    server: IpAddr,
    config: &WireConfig,
) -> Result<usize> {
    let distribution_addr = SocketAddr::new(server, config.distribution_port);
    let collection_addr = SocketAddr::new(server, config.collection_port);

    let job_index =
        request_job_index(distribution_addr, definition.checksum(), config.read_timeout).await?;

    let seeds = assigned_seeds(job_index, CLIENT_JOB_SIZE, definition.trial_count)?;
    info!(
        job_index,
        first_seed = *seeds.start(),
        last_seed = *seeds.end(),
        "job assigned"
    );

    #[allow(clippy::cast_possible_truncation)]
    let expected = (*seeds.end() - *seeds.start() + 1) as usize;

    let (done_tx, done_rx) = oneshot::channel();
    let outbox = Arc::new(Mutex::new(Outbox::new(expected, done_tx)));
    let definition = Arc::new(definition.clone());

    for seed in seeds {
        let outbox = Arc::clone(&outbox);
        let definition = Arc::clone(&definition);
        tokio::spawn(async move {
            let result = run_trial(&definition, seed).and_then(|mapping| {
                let recorded = definition.recorded_names();
                row_from_mapping(&recorded, &mapping)
            });

            let mut outbox = outbox.lock().await;
            match result {
                Ok(row) => outbox.complete(row),
                Err(error) => outbox.fail(error.into()),
            }
        });
    }

    let rows = done_rx.await.map_err(|_| Error::TrialsAborted)??;
    debug!(rows = rows.len(), "all assigned trials complete");

    submit_rows(collection_addr, &rows).await?;
    info!(rows = rows.len(), batches = batch_count(rows.len()), "results submitted");

    Ok(rows.len())
}

/// Accumulates completed rows and makes the one-shot send decision.
///
/// The append, the completion check, and the `sent` transition happen
/// under a single lock acquisition: two completions racing can never
/// both decide to hand the rows over.
struct Outbox {
    rows: Vec<Vec<f64>>,
    expected: usize,
    sent: bool,
    done: Option<oneshot::Sender<Result<Vec<Vec<f64>>>>>,
}

impl Outbox {
    fn new(expected: usize, done: oneshot::Sender<Result<Vec<Vec<f64>>>>) -> Self {
        Self {
            rows: Vec::with_capacity(expected),
            expected,
            sent: false,
            done: Some(done),
        }
    }

    /// Records one completed trial; the completion that reaches the
    /// target hands the rows over, exactly once.
    fn complete(&mut self, row: Vec<f64>) {
        if self.sent {
            return;
        }
        self.rows.push(row);
        if self.rows.len() >= self.expected {
            self.sent = true;
            if let Some(done) = self.done.take() {
                let _ = done.send(Ok(std::mem::take(&mut self.rows)));
            }
        }
    }

    /// Propagates the first trial failure and stops accepting rows.
    fn fail(&mut self, error: Error) {
        if self.sent {
            return;
        }
        self.sent = true;
        if let Some(done) = self.done.take() {
            let _ = done.send(Err(error));
        }
    }
}

/// Performs the checksum handshake and obtains a job index.
///
/// # Errors
///
/// Returns [`Error::ChecksumMismatch`] if the server rejects the
/// checksum — the caller must not proceed to simulate.
pub async fn request_job_index(
    addr: SocketAddr,
    checksum: u8,
    read_timeout: Duration,
) -> Result<u32> {
    let mut stream = TcpStream::connect(addr).await?;

    with_deadline(read_timeout, stream.write_all(&[checksum])).await?;

    let mut flag = [0u8; 1];
    with_deadline(read_timeout, stream.read_exact(&mut flag)).await?;
    if flag[0] != MATCH_FLAG {
        return Err(Error::ChecksumMismatch);
    }

    let mut index = [0u8; JOB_INDEX_BYTES];
    with_deadline(read_timeout, stream.read_exact(&mut index)).await?;
    Ok(u32::from_le_bytes(index))
}

/// Submits rows to the collection service in batches of at most
/// [`MAX_BATCH_ROWS`], one connection per batch, in order.
///
/// # Errors
///
/// Fails on the first connection or write error; earlier batches stay
/// submitted (the server counts rows, not connections).
pub async fn submit_rows(addr: SocketAddr, rows: &[Vec<f64>]) -> Result<()> {
    for batch in rows.chunks(MAX_BATCH_ROWS) {
        submit_batch(addr, batch).await?;
    }
    Ok(())
}

/// How many batches a submission of `rows` rows needs.
pub fn batch_count(rows: usize) -> usize {
    rows.div_ceil(MAX_BATCH_ROWS)
}

async fn submit_batch(addr: SocketAddr, batch: &[Vec<f64>]) -> Result<()> {
    let count = u8::try_from(batch.len()).map_err(|_| Error::OversizedBatch(batch.len()))?;

    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(&[count]).await?;
    for row in batch {
        codec::write_row(&mut stream, row).await?;
    }
    stream.shutdown().await?;

    Ok(())
}
