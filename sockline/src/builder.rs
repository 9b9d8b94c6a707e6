use crate::communicator::Communicator;
use crate::descriptor::Descriptor;
use crate::reader::ReadBuffer;

use std::time::Duration;

/// Default read buffer capacity, in bytes.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Builder for configuring and creating a [`Communicator`].
///
/// # Examples
///
/// ```rust,ignore
/// let comm = CommunicatorBuilder::new()
///     .capacity(512)
///     .read_timeout(Some(Duration::from_secs(5)))
///     .build(fd.as_fd());
/// ```
#[derive(Debug, Clone)]
pub struct CommunicatorBuilder {
    /// Size of the read buffer.
    capacity: usize,

    /// Bound on each wait for incoming data.
    read_timeout: Option<Duration>,

    /// Bound on each `write_all` call.
    write_timeout: Option<Duration>,
}

impl CommunicatorBuilder {
    /// Creates a builder with a [`DEFAULT_CAPACITY`] buffer and no timeouts.
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            read_timeout: None,
            write_timeout: None,
        }
    }

    /// Sets the read buffer capacity.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn capacity(mut self, n: usize) -> Self {
        assert!(n > 0, "capacity must be > 0");

        self.capacity = n;
        self
    }

    /// Sets the timeout for each wait on incoming data.
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the overall timeout of each `write_all` call.
    pub fn write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Builds the communicator over `descriptor`.
    pub fn build<D: Descriptor>(self, descriptor: D) -> Communicator<D> {
        let reader = ReadBuffer::new(descriptor, self.capacity, self.read_timeout);
        Communicator::from_parts(reader, self.write_timeout)
    }
}

impl Default for CommunicatorBuilder {
    /// Creates a default `CommunicatorBuilder`.
    fn default() -> Self {
        Self::new()
    }
}
