//! Wire configuration shared by both ends.

use std::time::Duration;

/// Well-known port of the job-distribution service.
pub const DISTRIBUTION_PORT: u16 = 54822;

/// Well-known port of the result-collection service.
pub const COLLECTION_PORT: u16 = 54823;

/// Connection parameters for the two services.
#[derive(Debug, Clone)]
pub struct WireConfig {
    /// Port the distribution service listens on.
    pub distribution_port: u16,
    /// Port the collection service listens on.
    pub collection_port: u16,
    /// Deadline applied to every per-connection read and write.
    ///
    /// The protocol itself has no framing beyond fixed-size fields, so a
    /// stalled peer would otherwise block its service forever.
    pub read_timeout: Duration,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            distribution_port: DISTRIBUTION_PORT,
            collection_port: COLLECTION_PORT,
            read_timeout: Duration::from_secs(30),
        }
    }
}

impl WireConfig {
    /// Overrides both service ports.
    #[must_use]
    pub const fn with_ports(mut self, distribution: u16, collection: u16) -> Self {
        self.distribution_port = distribution;
        self.collection_port = collection;
        self
    }

    /// Overrides the per-connection deadline.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}
