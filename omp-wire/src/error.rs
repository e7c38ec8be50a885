//! Transport-level errors.

use std::io;

/// Everything that can go wrong below the XML layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// TCP connect to the manager failed or timed out.
    #[error("cannot connect to {addr}: {source}")]
    Connect {
        /// `host:port` that was dialed.
        addr:   String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// TLS configuration or handshake failure.
    #[error("TLS: {0}")]
    Tls(String),
    /// A read or write on an open stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// An operation needed an open stream and there was none.
    #[error("not connected")]
    NotConnected,
    /// The peer closed the stream.
    #[error("connection closed by peer")]
    Closed,
    /// The peer closed the stream while a response was being assembled.
    #[error("connection closed before message completed ({received} bytes received)")]
    Truncated {
        /// Bytes accumulated before the stream ended.
        received: usize,
    },
}

impl TransportError {
    /// `true` if the peer went away (as opposed to a local failure).
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed | Self::Truncated { .. })
    }
}
