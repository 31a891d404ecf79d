//! Connection-wide configuration: a plain `Default`-able struct of timeouts
//! and size limits rather than a pile of loose constants scattered through
//! the services that use them.

use std::time::Duration;

/// Tunables for a [`crate::connection::Connection`] and the services built
/// on top of it.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionConfig {
    /// How long `wait_for_event` and similar one-shot waits block by
    /// default before giving up with [`crate::error::Error::Timeout`].
    pub default_wait_timeout: Duration,
    /// How long PULSE's `connect` waits for the OPEN acknowledgement.
    pub pulse_open_timeout: Duration,
    /// Chunk size PutBytes splits its payload into; must stay at or below
    /// 2000 bytes per `Put`.
    pub putbytes_chunk_size: usize,
    /// How long BlobDB waits for a response before re-sending a request with
    /// the same token.
    pub blobdb_retry_timeout: Duration,
    /// Pacing delay between successive BlobDB sends on the outbound worker.
    pub blobdb_send_pacing: Duration,
    /// How often the BlobDB retry worker scans the pending table.
    pub blobdb_scan_interval: Duration,
    /// Maximum payload bytes per outbound PULSE DATA frame (the link MTU
    /// minus one byte of opcode framing).
    pub pulse_mtu: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_wait_timeout: Duration::from_secs(10),
            pulse_open_timeout: Duration::from_secs(5),
            putbytes_chunk_size: 2000,
            blobdb_retry_timeout: Duration::from_secs(5),
            blobdb_send_pacing: Duration::from_millis(50),
            blobdb_scan_interval: Duration::from_secs(2),
            pulse_mtu: 2000,
        }
    }
}
