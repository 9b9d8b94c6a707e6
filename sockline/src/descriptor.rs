//! The socket handle seam.
//!
//! Every component in this crate reaches the operating system through
//! [`Descriptor`]. The production implementation is [`BorrowedFd`],
//! which keeps ownership (and closing) of the socket with the caller.

use crate::endpoint::Endpoint;
use crate::readiness::{Direction, PeerFlags};
use crate::sys::platform::{
    READABLE, WRITABLE, sys_connect, sys_get_socket_error, sys_poll, sys_read, sys_write,
};

use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};

/// Raw, single-shot socket operations.
///
/// Implementations perform exactly one system call per method and must
/// not retry: would-block, interruption and timeout handling live in the
/// callers. The descriptor is expected to be in non-blocking mode.
pub trait Descriptor {
    /// One `read(2)`. `Ok(0)` means end of stream.
    fn raw_read(&self, buffer: &mut [u8]) -> io::Result<usize>;

    /// One `write(2)`, possibly partial.
    fn raw_write(&self, buffer: &[u8]) -> io::Result<usize>;

    /// One `connect(2)` towards `endpoint`.
    fn raw_connect(&self, endpoint: &Endpoint) -> io::Result<()>;

    /// Fetches and clears the pending socket error.
    fn take_error(&self) -> io::Result<Option<io::Error>>;

    /// One `poll(2)` for `direction`, `timeout_ms` as `poll(2)` takes it.
    ///
    /// Returns `None` if the timeout elapsed without an event.
    fn raw_poll(&self, direction: Direction, timeout_ms: i32) -> io::Result<Option<PeerFlags>>;
}

impl Descriptor for BorrowedFd<'_> {
    fn raw_read(&self, buffer: &mut [u8]) -> io::Result<usize> {
        sys_read(self.as_raw_fd(), buffer)
    }

    fn raw_write(&self, buffer: &[u8]) -> io::Result<usize> {
        sys_write(self.as_raw_fd(), buffer)
    }

    fn raw_connect(&self, endpoint: &Endpoint) -> io::Result<()> {
        sys_connect(self.as_raw_fd(), &endpoint.as_socket_addr())
    }

    fn take_error(&self) -> io::Result<Option<io::Error>> {
        sys_get_socket_error(self.as_raw_fd())
    }

    fn raw_poll(&self, direction: Direction, timeout_ms: i32) -> io::Result<Option<PeerFlags>> {
        let events = match direction {
            Direction::Read => READABLE,
            Direction::Write => WRITABLE,
        };

        let revents = sys_poll(self.as_raw_fd(), events, timeout_ms)?;

        Ok(revents.map(|revents| PeerFlags {
            error: revents.error,
            hangup: revents.hangup,
        }))
    }
}

impl<D: Descriptor + ?Sized> Descriptor for &D {
    fn raw_read(&self, buffer: &mut [u8]) -> io::Result<usize> {
        (**self).raw_read(buffer)
    }

    fn raw_write(&self, buffer: &[u8]) -> io::Result<usize> {
        (**self).raw_write(buffer)
    }

    fn raw_connect(&self, endpoint: &Endpoint) -> io::Result<()> {
        (**self).raw_connect(endpoint)
    }

    fn take_error(&self) -> io::Result<Option<io::Error>> {
        (**self).take_error()
    }

    fn raw_poll(&self, direction: Direction, timeout_ms: i32) -> io::Result<Option<PeerFlags>> {
        (**self).raw_poll(direction, timeout_ms)
    }
}
