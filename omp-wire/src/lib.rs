//! Byte-level plumbing for the OpenVAS Management Protocol (OMP).
//!
//! This crate handles:
//! * A pluggable [`Transport`] (open / close / write / timed read)
//! * The shipped [`TlsTransport`] over tokio + rustls
//! * Response framing: OMP has no length prefix and no terminator, so
//!   [`FrameReader`] decides where a message ends from short reads and
//!   read timeouts
//!
//! It knows nothing about XML or authentication; see `omp-xml` and
//! `omp-client` for those.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod frame;
pub mod tls;
pub mod transport;

pub use error::TransportError;
pub use frame::{FrameReader, MAX_STALE_READS};
pub use tls::{TlsOptions, TlsTransport};
pub use transport::Transport;

/// Default OMP manager port.
pub const DEFAULT_PORT: u16 = 9390;
