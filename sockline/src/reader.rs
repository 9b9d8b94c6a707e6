//! Fixed-capacity read buffer over a non-blocking descriptor.

use crate::deadline::Deadline;
use crate::descriptor::Descriptor;
use crate::error::IoError;
use crate::readiness::{self, Direction, Readiness};

use std::io::{self, BufRead, Read};
use std::time::Duration;

/// A byte buffer refilled from a descriptor on demand.
///
/// `ReadBuffer` never closes the descriptor it reads from. When a read
/// would block it waits for readability, bounded by the configured
/// timeout, and tries again.
///
/// Invariant: `pos <= end <= buffer.len()`. The buffer is exhausted when
/// `pos == end`.
pub struct ReadBuffer<D> {
    descriptor: D,
    buffer: Box<[u8]>,
    pos: usize,
    end: usize,
    timeout: Option<Duration>,
    eof: bool,
}

impl<D: Descriptor> ReadBuffer<D> {
    /// Creates a reader with room for `capacity` bytes.
    ///
    /// `timeout` bounds each refill; `None` waits indefinitely.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(descriptor: D, capacity: usize, timeout: Option<Duration>) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            descriptor,
            buffer: vec![0; capacity].into_boxed_slice(),
            pos: 0,
            end: 0,
            timeout,
            eof: false,
        }
    }

    /// Returns the next byte, or `None` once the peer closed the stream.
    ///
    /// After the first `None`, later calls return `None` without touching
    /// the descriptor.
    pub fn get_byte(&mut self) -> Result<Option<u8>, IoError> {
        if self.pos == self.end && !self.refill()? {
            return Ok(None);
        }

        let byte = self.buffer[self.pos];
        self.pos += 1;

        Ok(Some(byte))
    }

    /// Refills the exhausted buffer.
    ///
    /// Returns `false` at end of stream. Must only be called once every
    /// buffered byte has been consumed.
    ///
    /// # Errors
    ///
    /// - [`IoError::ReadTimeout`] if no data arrives within the timeout,
    /// - [`IoError::Read`] if `read(2)` fails,
    /// - [`IoError::Wait`] if waiting for readability fails.
    pub fn refill(&mut self) -> Result<bool, IoError> {
        debug_assert_eq!(self.pos, self.end, "refill with unread data");

        if self.eof {
            return Ok(false);
        }

        let deadline = Deadline::from_timeout(self.timeout);

        loop {
            match self.descriptor.raw_read(&mut self.buffer) {
                Ok(0) => {
                    tracing::trace!("end of stream");
                    self.eof = true;
                    return Ok(false);
                }
                Ok(n) => {
                    tracing::trace!(bytes = n, "refilled read buffer");
                    self.pos = 0;
                    self.end = n;
                    return Ok(true);
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    let readiness = readiness::wait(&self.descriptor, Direction::Read, deadline)?;

                    if readiness == Readiness::TimedOut {
                        return Err(IoError::ReadTimeout);
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(IoError::Read(err)),
            }
        }
    }

    /// Bytes received but not consumed yet.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[self.pos..self.end]
    }

    /// Returns `true` once end of stream has been observed.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Size of the internal buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Per-refill timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The descriptor being read from.
    pub fn descriptor(&self) -> &D {
        &self.descriptor
    }

    /// Consumes the reader, returning the descriptor.
    ///
    /// Buffered bytes are discarded.
    pub fn into_inner(self) -> D {
        self.descriptor
    }
}

impl<D: Descriptor> Read for ReadBuffer<D> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());

        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);

        Ok(n)
    }
}

impl<D: Descriptor> BufRead for ReadBuffer<D> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos == self.end {
            self.refill()?;
        }

        Ok(self.buffered())
    }

    fn consume(&mut self, amount: usize) {
        self.pos = (self.pos + amount).min(self.end);
    }
}
