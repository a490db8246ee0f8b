//! Error types for the wire protocol.

use thiserror::Error;

/// Errors that can occur in the distribution/collection protocol.
#[derive(Debug, Error)]
pub enum Error {
    /// Socket-level failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A read or write exceeded the connection deadline.
    #[error("connection deadline exceeded")]
    Deadline,

    /// The server rejected our definition checksum.
    ///
    /// Fatal for the client: its definition does not match the server's
    /// and simulating would produce rows the server cannot interpret.
    #[error("definition checksum rejected by server")]
    ChecksumMismatch,

    /// A batch too large for the one-byte row-count field.
    #[error("batch of {0} rows exceeds the one-byte row count")]
    OversizedBatch(usize),

    /// Trial execution failed on the client.
    #[error(transparent)]
    Engine(#[from] mocsim_engine::Error),

    /// The result channel closed before all trials completed.
    #[error("trial completion channel closed before all results arrived")]
    TrialsAborted,
}

/// Result type alias for wire operations.
pub type Result<T> = std::result::Result<T, Error>;
