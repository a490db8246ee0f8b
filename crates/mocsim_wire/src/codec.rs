//! Fixed-size binary field encoding.
//!
//! Everything on the wire is little-endian: the 4-byte job index and the
//! 8-byte IEEE-754 doubles. Reads are exact-length (`read_exact` loops
//! partial reads), since the transport offers no message framing beyond
//! these fixed sizes.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest number of rows one batch can carry — the row count travels in
/// a single byte.
pub const MAX_BATCH_ROWS: usize = 255;

/// Width of the job index field.
pub const JOB_INDEX_BYTES: usize = 4;

/// Width of one encoded double.
pub const DOUBLE_BYTES: usize = 8;

/// Handshake flag for a matching checksum.
pub const MATCH_FLAG: u8 = 1;

/// Handshake flag for a rejected checksum.
pub const MISMATCH_FLAG: u8 = 0;

/// Reads one result row of `per_row` doubles.
pub async fn read_row<R>(reader: &mut R, per_row: usize) -> std::io::Result<Vec<f64>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = [0u8; DOUBLE_BYTES];
    let mut row = Vec::with_capacity(per_row);
    for _ in 0..per_row {
        reader.read_exact(&mut buffer).await?;
        row.push(f64::from_le_bytes(buffer));
    }
    Ok(row)
}

/// Writes one result row.
pub async fn write_row<W>(writer: &mut W, row: &[f64]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for value in row {
        writer.write_all(&value.to_le_bytes()).await?;
    }
    Ok(())
}

/// Bounds an I/O future with the connection deadline.
///
/// One bad peer must not hang a whole service; every per-connection read
/// and write goes through here.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, io: F) -> Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match tokio::time::timeout(deadline, io).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(Error::Deadline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn row_roundtrips_through_little_endian_bytes() {
        let row = vec![1.5, -2.0, 0.0, f64::MAX];

        let mut encoded = Vec::new();
        write_row(&mut encoded, &row).await.unwrap();
        assert_eq!(encoded.len(), row.len() * DOUBLE_BYTES);
        assert_eq!(&encoded[..DOUBLE_BYTES], &1.5f64.to_le_bytes());

        let mut cursor = encoded.as_slice();
        let decoded = read_row(&mut cursor, row.len()).await.unwrap();
        assert_eq!(decoded, row);
    }

    #[tokio::test]
    async fn short_row_read_fails() {
        let mut bytes: &[u8] = &1.5f64.to_le_bytes();
        assert!(read_row(&mut bytes, 2).await.is_err());
    }

    #[tokio::test]
    async fn deadline_cuts_off_a_stalled_read() {
        let stalled = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(0u8)
        };
        let result = with_deadline(Duration::from_millis(10), stalled).await;
        assert!(matches!(result, Err(Error::Deadline)));
    }
}
