//! Error types, one per phase.
//!
//! - [`WaitError`]: the readiness check itself failed.
//! - [`ConnectError`]: establishing a connection failed, timed out, or
//!   was aborted by the peer.
//! - [`IoError`]: reading or writing a connected socket failed.
//!
//! Each message names the phase and, where one is involved, the peer.

use crate::endpoint::Endpoint;

use std::io;

/// `poll(2)` failed for a reason other than an interrupted call.
#[derive(Debug, thiserror::Error)]
#[error("waiting for data: {source}")]
pub struct WaitError {
    #[source]
    source: io::Error,
}

impl WaitError {
    pub(crate) fn new(source: io::Error) -> Self {
        Self { source }
    }

    /// The underlying system error.
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }

    /// Consumes the error, returning the underlying system error.
    pub fn into_io_error(self) -> io::Error {
        self.source
    }
}

/// Failure to establish a connection to an [`Endpoint`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// A socket for the endpoint's family could not be created.
    #[error("creating socket for {endpoint}: {source}")]
    Socket {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },

    /// `connect(2)` failed outright.
    #[error("connecting to {endpoint}: {source}")]
    Initiate {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },

    /// The pending connection reported an error.
    #[error("connecting to {endpoint} failed: {source}")]
    Failed {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },

    /// The pending connection reported an error that could not be read back.
    #[error("connecting to {endpoint} failed")]
    FailedUnknown { endpoint: Endpoint },

    /// The peer hung up before the connection completed.
    #[error("{endpoint} closed the connection")]
    PeerClosed { endpoint: Endpoint },

    /// The deadline elapsed before the connection completed.
    #[error("timeout while connecting to {endpoint}")]
    Timeout { endpoint: Endpoint },

    /// Waiting for the connection to complete failed.
    #[error("waiting to connect to {endpoint}: {source}")]
    Wait {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },
}

impl ConnectError {
    /// The endpoint the failed connection was aimed at.
    pub fn endpoint(&self) -> &Endpoint {
        match self {
            Self::Socket { endpoint, .. }
            | Self::Initiate { endpoint, .. }
            | Self::Failed { endpoint, .. }
            | Self::FailedUnknown { endpoint }
            | Self::PeerClosed { endpoint }
            | Self::Timeout { endpoint }
            | Self::Wait { endpoint, .. } => endpoint,
        }
    }

    /// Returns `true` if the connection attempt ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<ConnectError> for io::Error {
    fn from(err: ConnectError) -> Self {
        let kind = match &err {
            ConnectError::Socket { source, .. }
            | ConnectError::Initiate { source, .. }
            | ConnectError::Failed { source, .. }
            | ConnectError::Wait { source, .. } => source.kind(),
            ConnectError::FailedUnknown { .. } => io::ErrorKind::Other,
            ConnectError::PeerClosed { .. } => io::ErrorKind::ConnectionAborted,
            ConnectError::Timeout { .. } => io::ErrorKind::TimedOut,
        };

        io::Error::new(kind, err)
    }
}

/// Failure while reading from or writing to a connected socket.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// `read(2)` failed.
    #[error("getting more data: {0}")]
    Read(#[source] io::Error),

    /// No data arrived within the reader's timeout.
    #[error("timeout while waiting for data")]
    ReadTimeout,

    /// `write(2)` failed.
    #[error("writing to socket: {0}")]
    Write(#[source] io::Error),

    /// The socket accepted zero bytes; the peer can take no more data.
    #[error("EOF on write")]
    WriteZero,

    /// The socket did not become writable within the write timeout.
    #[error("timeout while writing to socket")]
    WriteTimeout,

    /// Waiting for readiness failed.
    #[error(transparent)]
    Wait(#[from] WaitError),
}

impl IoError {
    /// Returns `true` for read and write timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ReadTimeout | Self::WriteTimeout)
    }
}

impl From<IoError> for io::Error {
    fn from(err: IoError) -> Self {
        let kind = match &err {
            IoError::Read(source) | IoError::Write(source) => source.kind(),
            IoError::ReadTimeout | IoError::WriteTimeout => io::ErrorKind::TimedOut,
            IoError::WriteZero => io::ErrorKind::WriteZero,
            IoError::Wait(wait) => wait.io_error().kind(),
        };

        io::Error::new(kind, err)
    }
}
