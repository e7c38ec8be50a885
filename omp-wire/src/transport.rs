//! Pluggable transport layer.
//!
//! Implement [`Transport`] over TLS, a plain socket, or an in-memory script
//! to get OMP response framing for free via [`crate::FrameReader`].

use std::time::Duration;

use crate::TransportError;

/// A single full-duplex byte-stream connection to an OMP manager.
///
/// Implementations own at most one live stream. No retries happen at this
/// layer; every failure is reported to the caller.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Establish the connection, replacing any existing one.
    async fn open(&mut self, host: &str, port: u16) -> Result<(), TransportError>;

    /// Drop the connection. Safe to call when nothing is open.
    async fn close(&mut self);

    /// Whether a stream is currently held.
    fn is_open(&self) -> bool;

    /// Write the whole buffer and flush it.
    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Read at most `max` bytes, waiting no longer than `timeout`.
    ///
    /// Returns an empty vector when the deadline passes with no data; that
    /// is not an error. Returns [`TransportError::Closed`] when the peer has
    /// closed the stream.
    async fn read_some(&mut self, max: usize, timeout: Duration) -> Result<Vec<u8>, TransportError>;
}
