//! # sockline
//!
//! **sockline** is a small blocking-socket I/O layer with explicit, bounded
//! waits. It sits between raw non-blocking sockets and line-based
//! protocols, without an event loop:
//!
//! - a **readiness waiter** built on `poll(2)` ([`wait`]),
//! - a **timed connector** that bounds non-blocking `connect(2)` ([`connect`]),
//! - a **buffered reader** refilling a fixed buffer on demand ([`ReadBuffer`]),
//! - a **communicator** producing newline-terminated lines and writing
//!   whole buffers ([`Communicator`]).
//!
//! Every operation that cannot complete immediately parks the calling
//! thread inside the waiter until the socket is ready or a [`Deadline`]
//! passes. Deadlines are absolute, so retry loops never outlive the
//! budget the caller handed in.
//!
//! Sockets are borrowed, never closed: pass `fd.as_fd()` and keep the
//! owning handle alive for as long as the reader or communicator.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sockline::{Communicator, Deadline, Endpoint, open_stream};
//! use std::os::fd::AsFd;
//! use std::time::Duration;
//!
//! let endpoint: Endpoint = "127.0.0.1:4000".parse()?;
//! let fd = open_stream(&endpoint, Deadline::after(Duration::from_secs(2)))?;
//!
//! let mut comm = Communicator::new(fd.as_fd(), Some(Duration::from_secs(5)));
//! comm.write_all(b"HELLO\n")?;
//!
//! while let Some(line) = comm.get_line()? {
//!     print!("{}", line.text);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`readiness`]: waiting for readability or writability
//! - [`error`]: one error type per phase (wait, connect, read/write)
//!
//! Logging goes through `tracing`; the crate installs no subscriber.

#[cfg(not(unix))]
compile_error!("sockline only supports unix targets");

mod builder;
mod communicator;
mod connect;
mod deadline;
mod descriptor;
mod endpoint;
mod reader;
mod sys;

#[cfg(test)]
mod mock;

pub mod error;
pub mod readiness;

pub use builder::{CommunicatorBuilder, DEFAULT_CAPACITY};
pub use communicator::{Communicator, Line};
pub use connect::{connect, open_stream};
pub use deadline::Deadline;
pub use descriptor::Descriptor;
pub use endpoint::Endpoint;
pub use error::{ConnectError, IoError, WaitError};
pub use readiness::{Direction, PeerFlags, Readiness, wait, wait_readable, wait_writable};
pub use reader::ReadBuffer;
