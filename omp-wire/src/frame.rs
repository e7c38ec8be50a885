//! Timeout-delimited response framing.
//!
//! OMP responses carry no length prefix and no terminator. The reader keeps
//! pulling `buffer_size`-byte reads until one comes back short, or until a
//! read times out with nothing to show. A response that is an exact
//! multiple of `buffer_size` therefore costs one extra read that waits out
//! the full timeout; assembling a response never takes longer than
//! `read_timeout × (reads + 1)`.

use std::time::Duration;

use crate::{Transport, TransportError};

/// Upper bound on zero-wait reads spent draining leftovers before a write.
pub const MAX_STALE_READS: usize = 16;

/// Wraps a [`Transport`] and turns its byte stream into whole responses.
///
/// The reader keeps no state between calls other than the transport itself,
/// so the same instance serves the whole life of a connection.
pub struct FrameReader<T: Transport> {
    inner:        T,
    buffer_size:  usize,
    read_timeout: Duration,
}

impl<T: Transport> FrameReader<T> {
    /// Wrap `inner`. A `buffer_size` of zero is treated as one.
    pub fn new(inner: T, buffer_size: usize, read_timeout: Duration) -> Self {
        Self { inner, buffer_size: buffer_size.max(1), read_timeout }
    }

    /// Per-read buffer size.
    pub fn buffer_size(&self) -> usize { self.buffer_size }

    /// Per-read timeout.
    pub fn read_timeout(&self) -> Duration { self.read_timeout }

    /// Send one request.
    ///
    /// Bytes already sitting on the stream belong to an earlier response that
    /// outlived its read timeout; they are dropped first so they cannot be
    /// mistaken for the start of the next response.
    pub async fn write_request(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.discard_stale().await?;
        self.inner.write_all(data).await
    }

    /// Assemble the next response from the stream.
    ///
    /// An empty vector means the server sent nothing within `read_timeout`.
    pub async fn read_message(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut message = Vec::new();
        let mut reads   = 0usize;
        loop {
            let chunk = match self.inner.read_some(self.buffer_size, self.read_timeout).await {
                Ok(chunk) => chunk,
                Err(TransportError::Closed) => {
                    return Err(TransportError::Truncated { received: message.len() });
                }
                Err(e) => return Err(e),
            };
            reads += 1;
            if chunk.is_empty() {
                break;
            }
            let short = chunk.len() < self.buffer_size;
            message.extend_from_slice(&chunk);
            if short {
                break;
            }
        }
        log::trace!("[omp] assembled {} bytes in {reads} read(s)", message.len());
        Ok(message)
    }

    /// [`write_request`](Self::write_request) followed by
    /// [`read_message`](Self::read_message).
    pub async fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.write_request(request).await?;
        self.read_message().await
    }

    async fn discard_stale(&mut self) -> Result<(), TransportError> {
        let mut dropped = 0usize;
        let mut drained = false;
        for _ in 0..MAX_STALE_READS {
            let chunk = self.inner.read_some(self.buffer_size, Duration::ZERO).await?;
            if chunk.is_empty() {
                drained = true;
                break;
            }
            dropped += chunk.len();
        }
        if dropped > 0 {
            log::warn!("[omp] discarded {dropped} stale bytes left over from a previous response");
        }
        if !drained {
            log::warn!("[omp] stream still busy after {MAX_STALE_READS} stale reads; sending anyway");
        }
        Ok(())
    }

    /// Access the underlying transport.
    pub fn inner(&self) -> &T { &self.inner }

    /// Mutable access to the underlying transport.
    pub fn inner_mut(&mut self) -> &mut T { &mut self.inner }

    /// Unwrap the transport.
    pub fn into_inner(self) -> T { self.inner }
}
