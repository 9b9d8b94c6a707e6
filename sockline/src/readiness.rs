//! Readiness waiting.
//!
//! [`wait`] blocks the calling thread until a descriptor can be read
//! from or written to without blocking, or until a [`Deadline`] passes.

use crate::deadline::Deadline;
use crate::descriptor::Descriptor;
use crate::error::WaitError;

use std::io;

/// The I/O direction to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Wait until data can be read.
    Read,

    /// Wait until data can be written.
    Write,
}

/// Conditions reported alongside readiness, whatever the direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PeerFlags {
    /// The descriptor has a pending error (`POLLERR`).
    pub error: bool,

    /// The peer closed the connection (`POLLHUP`).
    pub hangup: bool,
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
    /// The descriptor is ready; see the flags for error or hangup.
    Ready(PeerFlags),

    /// The deadline elapsed without an event.
    TimedOut,
}

impl Readiness {
    /// Returns `true` if the wait ended because the deadline elapsed.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Blocks until `descriptor` is ready for `direction` or `deadline` passes.
///
/// Interrupted `poll(2)` calls are re-issued with whatever remains of the
/// deadline. The deadline is not extended by retries.
///
/// # Errors
///
/// Returns [`WaitError`] when `poll(2)` fails for any other reason.
pub fn wait<D>(
    descriptor: &D,
    direction: Direction,
    deadline: Deadline,
) -> Result<Readiness, WaitError>
where
    D: Descriptor + ?Sized,
{
    loop {
        let timeout_ms = deadline.poll_timeout();
        tracing::trace!(?direction, timeout_ms, "waiting for readiness");

        match descriptor.raw_poll(direction, timeout_ms) {
            Ok(Some(flags)) => return Ok(Readiness::Ready(flags)),
            Ok(None) => return Ok(Readiness::TimedOut),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(WaitError::new(err)),
        }
    }
}

/// Shorthand for [`wait`] with [`Direction::Read`].
pub fn wait_readable<D>(descriptor: &D, deadline: Deadline) -> Result<Readiness, WaitError>
where
    D: Descriptor + ?Sized,
{
    wait(descriptor, Direction::Read, deadline)
}

/// Shorthand for [`wait`] with [`Direction::Write`].
pub fn wait_writable<D>(descriptor: &D, deadline: Deadline) -> Result<Readiness, WaitError>
where
    D: Descriptor + ?Sized,
{
    wait(descriptor, Direction::Write, deadline)
}
