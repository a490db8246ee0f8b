//! The job-distribution service.
//!
//! Per connection: read one checksum byte; on match, send the match flag
//! and a 4-byte job index from a connection-order counter; on mismatch,
//! send the reject flag and close. Indices are issued strictly in
//! arrival order, with no re-issue and no persistence — a client that
//! dies with its job simply leaves those trials uncollected.

use crate::codec::{with_deadline, MATCH_FLAG, MISMATCH_FLAG};
use crate::error::Result;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Serves job indices until `total_jobs` have been issued.
///
/// The accept loop is single-threaded: one connection is handled fully
/// before the next is accepted. A connection that fails or presents a
/// wrong checksum is logged and skipped without consuming an index.
///
/// # Errors
///
/// Returns an error only if accepting on the listener itself fails;
/// per-connection failures are isolated.
pub async fn serve_distribution(
    listener: TcpListener,
    checksum: u8,
    total_jobs: u32,
    read_timeout: Duration,
) -> Result<()> {
    let mut next_index = 0u32;

    while next_index < total_jobs {
        let (stream, peer) = listener.accept().await?;

        match handle_connection(stream, checksum, next_index, read_timeout).await {
            Ok(true) => {
                debug!(%peer, job_index = next_index, "job index issued");
                next_index += 1;
            }
            Ok(false) => {
                warn!(%peer, "rejected client with mismatched definition checksum");
            }
            Err(error) => {
                warn!(%peer, %error, "distribution connection failed");
            }
        }
    }

    info!(total_jobs, "all job indices issued");
    Ok(())
}

/// Handles one handshake; returns whether an index was issued.
async fn handle_connection(
    mut stream: TcpStream,
    checksum: u8,
    index: u32,
    read_timeout: Duration,
) -> Result<bool> {
    let mut client_checksum = [0u8; 1];
    with_deadline(read_timeout, stream.read_exact(&mut client_checksum)).await?;

    if client_checksum[0] == checksum {
        with_deadline(read_timeout, async {
            stream.write_all(&[MATCH_FLAG]).await?;
            stream.write_all(&index.to_le_bytes()).await
        })
        .await?;
        Ok(true)
    } else {
        with_deadline(read_timeout, stream.write_all(&[MISMATCH_FLAG])).await?;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::request_job_index;
    use crate::codec::JOB_INDEX_BYTES;

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn spawn_service(
        checksum: u8,
        total_jobs: u32,
        read_timeout: Duration,
    ) -> (std::net::SocketAddr, tokio::task::JoinHandle<Result<()>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(serve_distribution(
            listener,
            checksum,
            total_jobs,
            read_timeout,
        ));
        (addr, handle)
    }

    #[tokio::test]
    async fn indices_are_issued_in_connection_order() {
        let (addr, handle) = spawn_service(0x2a, 3, TIMEOUT).await;

        for expected in 0..3u32 {
            let index = request_job_index(addr, 0x2a, TIMEOUT).await.unwrap();
            assert_eq!(index, expected);
        }

        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn mismatched_checksum_is_rejected_without_an_index() {
        let (addr, handle) = spawn_service(0x2a, 1, TIMEOUT).await;

        let rejected = request_job_index(addr, 0x2b, TIMEOUT).await;
        assert!(matches!(rejected, Err(crate::Error::ChecksumMismatch)));

        // The rejected connection consumed no index.
        let index = request_job_index(addr, 0x2a, TIMEOUT).await.unwrap();
        assert_eq!(index, 0);

        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn rejected_client_receives_no_index_bytes() {
        let (addr, handle) = spawn_service(0x2a, 1, TIMEOUT).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(&[0x2b]).await.unwrap();
        let mut flag = [0u8; 1];
        stream.read_exact(&mut flag).await.unwrap();
        assert_eq!(flag[0], MISMATCH_FLAG);

        // Server closes without sending the 4 index bytes.
        let mut index = [0u8; JOB_INDEX_BYTES];
        assert!(stream.read_exact(&mut index).await.is_err());

        let index = request_job_index(addr, 0x2a, TIMEOUT).await.unwrap();
        assert_eq!(index, 0);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn stalled_connection_does_not_block_the_service() {
        let (addr, handle) = spawn_service(0x2a, 1, Duration::from_millis(100)).await;

        // Connect and send nothing; the deadline should reclaim the slot.
        let stalled = TcpStream::connect(addr).await.unwrap();

        let index = request_job_index(addr, 0x2a, TIMEOUT).await.unwrap();
        assert_eq!(index, 0);

        drop(stalled);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn service_stops_after_the_last_index() {
        let (addr, handle) = spawn_service(0x2a, 1, TIMEOUT).await;

        request_job_index(addr, 0x2a, TIMEOUT).await.unwrap();
        handle.await.unwrap().unwrap();

        // Listener is gone; a late client cannot connect.
        assert!(request_job_index(addr, 0x2a, TIMEOUT).await.is_err());
    }
}
