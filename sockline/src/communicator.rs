//! Line-oriented reads and complete writes on one connection.

use crate::builder::CommunicatorBuilder;
use crate::deadline::Deadline;
use crate::descriptor::Descriptor;
use crate::error::IoError;
use crate::readiness::{self, Direction, Readiness};
use crate::reader::ReadBuffer;

use std::io;
use std::time::Duration;

/// A line read from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// The line text, including the trailing `\n` when `complete`.
    pub text: String,

    /// `true` if the line ended with `\n`, `false` if the stream ended first.
    pub complete: bool,
}

/// Reads newline-terminated lines from, and writes whole buffers to, a
/// single connected descriptor.
///
/// The descriptor stays owned by the caller; dropping a `Communicator`
/// does not close it.
///
/// # Examples
///
/// ```rust,ignore
/// let fd = sockline::open_stream(&endpoint, Deadline::after(Duration::from_secs(2)))?;
/// let mut comm = Communicator::new(fd.as_fd(), Some(Duration::from_secs(5)));
///
/// comm.write_all(b"PING\n")?;
/// if let Some(line) = comm.get_line()? {
///     println!("{}", line.text);
/// }
/// ```
pub struct Communicator<D> {
    reader: ReadBuffer<D>,
    write_timeout: Option<Duration>,
}

impl<D: Descriptor> Communicator<D> {
    /// Creates a communicator with the default buffer capacity.
    ///
    /// `read_timeout` bounds each wait for incoming data; writes wait
    /// indefinitely.
    pub fn new(descriptor: D, read_timeout: Option<Duration>) -> Self {
        CommunicatorBuilder::new()
            .read_timeout(read_timeout)
            .build(descriptor)
    }

    pub(crate) fn from_parts(reader: ReadBuffer<D>, write_timeout: Option<Duration>) -> Self {
        Self {
            reader,
            write_timeout,
        }
    }

    /// Reads the next line.
    ///
    /// Returns `Ok(None)` if the stream ended before any byte was read.
    /// A final line without `\n` is returned with `complete == false`.
    /// Invalid UTF-8 is replaced with `U+FFFD`.
    pub fn get_line(&mut self) -> Result<Option<Line>, IoError> {
        let mut bytes = Vec::new();
        let complete = self.get_line_into(&mut bytes)?;

        if bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(Line {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            complete,
        }))
    }

    /// Reads the next line as raw bytes into `line`, replacing its contents.
    ///
    /// Returns `true` if the line ended with `\n`.
    pub fn get_line_into(&mut self, line: &mut Vec<u8>) -> Result<bool, IoError> {
        line.clear();

        while let Some(byte) = self.reader.get_byte()? {
            line.push(byte);

            if byte == b'\n' {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Writes all of `content`, retrying partial and would-block writes.
    ///
    /// # Errors
    ///
    /// - [`IoError::WriteZero`] if the socket accepts zero bytes,
    /// - [`IoError::Write`] if `write(2)` fails,
    /// - [`IoError::WriteTimeout`] if a write timeout is configured and
    ///   the socket stays full past it,
    /// - [`IoError::Wait`] if waiting for writability fails.
    pub fn write_all(&self, mut content: &[u8]) -> Result<(), IoError> {
        let descriptor = self.reader.descriptor();
        let deadline = Deadline::from_timeout(self.write_timeout);

        while !content.is_empty() {
            match descriptor.raw_write(content) {
                Ok(0) => return Err(IoError::WriteZero),
                Ok(n) => content = &content[n..],
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    let readiness = readiness::wait(descriptor, Direction::Write, deadline)?;

                    if readiness == Readiness::TimedOut {
                        return Err(IoError::WriteTimeout);
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(IoError::Write(err)),
            }
        }

        Ok(())
    }

    /// The underlying reader.
    pub fn reader(&mut self) -> &mut ReadBuffer<D> {
        &mut self.reader
    }

    /// The descriptor this communicator uses.
    pub fn descriptor(&self) -> &D {
        self.reader.descriptor()
    }

    /// Consumes the communicator, returning the descriptor.
    pub fn into_inner(self) -> D {
        self.reader.into_inner()
    }
}
