//! Connecting with a bounded wait.

use crate::deadline::Deadline;
use crate::descriptor::Descriptor;
use crate::endpoint::Endpoint;
use crate::error::ConnectError;
use crate::readiness::{self, Direction, Readiness};
use crate::sys::platform::sys_socket;

use std::io;
use std::os::fd::{AsFd, OwnedFd};

/// Connects `descriptor` to `endpoint`, waiting at most until `deadline`.
///
/// The descriptor should be non-blocking. If `connect(2)` completes at
/// once no wait takes place. If it is in progress, the descriptor is
/// polled for writability and the outcome is classified.
///
/// # Errors
///
/// Every [`ConnectError`] variant embeds `endpoint`:
/// - [`ConnectError::Initiate`] if `connect(2)` fails outright,
/// - [`ConnectError::Failed`] / [`ConnectError::FailedUnknown`] if the
///   pending connection reports an error,
/// - [`ConnectError::PeerClosed`] if the peer hangs up,
/// - [`ConnectError::Timeout`] if `deadline` passes,
/// - [`ConnectError::Wait`] if polling itself fails.
pub fn connect<D>(
    descriptor: &D,
    endpoint: &Endpoint,
    deadline: Deadline,
) -> Result<(), ConnectError>
where
    D: Descriptor + ?Sized,
{
    tracing::debug!(%endpoint, "connecting");

    match descriptor.raw_connect(endpoint) {
        Ok(()) => return Ok(()),
        Err(err) if is_in_progress(&err) => {}
        Err(source) => {
            return Err(fail(ConnectError::Initiate {
                endpoint: *endpoint,
                source,
            }));
        }
    }

    let endpoint = *endpoint;

    match readiness::wait(descriptor, Direction::Write, deadline) {
        Ok(Readiness::Ready(flags)) if flags.error => {
            Err(fail(pending_error(descriptor, endpoint)))
        }
        Ok(Readiness::Ready(flags)) if flags.hangup => {
            Err(fail(ConnectError::PeerClosed { endpoint }))
        }
        Ok(Readiness::Ready(_)) => Ok(()),
        Ok(Readiness::TimedOut) => Err(fail(ConnectError::Timeout { endpoint })),
        Err(err) => Err(fail(ConnectError::Wait {
            endpoint,
            source: err.into_io_error(),
        })),
    }
}

/// Opens a non-blocking stream socket and connects it to `endpoint`.
///
/// The returned descriptor is owned by the caller. It is closed again if
/// the connection cannot be established.
///
/// # Errors
///
/// [`ConnectError::Socket`] if the socket cannot be created, otherwise
/// the errors of [`connect`].
pub fn open_stream(endpoint: &Endpoint, deadline: Deadline) -> Result<OwnedFd, ConnectError> {
    let fd = sys_socket(endpoint.domain()).map_err(|source| ConnectError::Socket {
        endpoint: *endpoint,
        source,
    })?;

    connect(&fd.as_fd(), endpoint, deadline)?;

    Ok(fd)
}

/// `EINPROGRESS`, or `EINTR` after which the connection continues
/// asynchronously.
fn is_in_progress(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EINPROGRESS) | Some(libc::EINTR))
}

fn pending_error<D>(descriptor: &D, endpoint: Endpoint) -> ConnectError
where
    D: Descriptor + ?Sized,
{
    match descriptor.take_error() {
        Ok(Some(source)) => ConnectError::Failed { endpoint, source },
        Ok(None) => ConnectError::FailedUnknown { endpoint },
        Err(err) => {
            tracing::debug!(%endpoint, error = %err, "could not read pending socket error");
            ConnectError::FailedUnknown { endpoint }
        }
    }
}

fn fail(err: ConnectError) -> ConnectError {
    tracing::debug!(error = %err, "connect failed");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSocket;
    use crate::readiness::PeerFlags;

    use std::time::Duration;

    fn endpoint() -> Endpoint {
        "192.0.2.10:53".parse().expect("valid endpoint")
    }

    #[test]
    fn test_immediate_success_skips_wait() {
        let socket = MockSocket::new();

        connect(&socket, &endpoint(), Deadline::never()).expect("connect failed");

        assert!(socket.polls().is_empty(), "waiter should not be invoked");
    }

    #[test]
    fn test_in_progress_then_writable() {
        let socket = MockSocket::new();
        socket.set_connect_error(libc::EINPROGRESS);
        socket.push_poll(Ok(Some(PeerFlags::default())));

        connect(&socket, &endpoint(), Deadline::after(Duration::from_secs(1)))
            .expect("connect failed");

        let polls = socket.polls();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].0, Direction::Write);
    }

    #[test]
    fn test_pending_error_is_reported() {
        let socket = MockSocket::new();
        socket.set_connect_error(libc::EINPROGRESS);
        socket.push_poll(Ok(Some(PeerFlags {
            error: true,
            hangup: true,
        })));
        socket.set_pending_error(Ok(Some(io::Error::from_raw_os_error(libc::ECONNREFUSED))));

        let err =
            connect(&socket, &endpoint(), Deadline::never()).expect_err("connect should fail");

        match &err {
            ConnectError::Failed { source, .. } => {
                assert_eq!(source.raw_os_error(), Some(libc::ECONNREFUSED));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("connecting to 192.0.2.10:53 failed: "));
    }

    #[test]
    fn test_unreadable_pending_error() {
        let socket = MockSocket::new();
        socket.set_connect_error(libc::EINPROGRESS);
        socket.push_poll(Ok(Some(PeerFlags {
            error: true,
            hangup: false,
        })));
        socket.set_pending_error(Err(io::Error::from_raw_os_error(libc::EBADF)));

        let err =
            connect(&socket, &endpoint(), Deadline::never()).expect_err("connect should fail");

        assert!(matches!(err, ConnectError::FailedUnknown { .. }));
        assert_eq!(err.to_string(), "connecting to 192.0.2.10:53 failed");
    }

    #[test]
    fn test_hangup_mid_handshake() {
        let socket = MockSocket::new();
        socket.set_connect_error(libc::EINPROGRESS);
        socket.push_poll(Ok(Some(PeerFlags {
            error: false,
            hangup: true,
        })));

        let err =
            connect(&socket, &endpoint(), Deadline::never()).expect_err("connect should fail");

        assert!(matches!(err, ConnectError::PeerClosed { .. }));
        let message = err.to_string();
        assert!(message.contains("192.0.2.10:53"));
        assert!(message.contains("closed the connection"));
    }

    #[test]
    fn test_timeout() {
        let socket = MockSocket::new();
        socket.set_connect_error(libc::EINPROGRESS);
        socket.push_poll(Ok(None));

        let err = connect(&socket, &endpoint(), Deadline::after(Duration::from_millis(1)))
            .expect_err("connect should time out");

        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "timeout while connecting to 192.0.2.10:53");
    }

    #[test]
    fn test_wait_failure() {
        let socket = MockSocket::new();
        socket.set_connect_error(libc::EINPROGRESS);
        socket.push_poll(Err(io::Error::from_raw_os_error(libc::ENOMEM)));

        let err =
            connect(&socket, &endpoint(), Deadline::never()).expect_err("connect should fail");

        assert!(matches!(err, ConnectError::Wait { .. }));
        assert!(err.to_string().starts_with("waiting to connect to 192.0.2.10:53: "));
    }

    #[test]
    fn test_immediate_failure() {
        let socket = MockSocket::new();
        socket.set_connect_error(libc::ENETUNREACH);

        let err =
            connect(&socket, &endpoint(), Deadline::never()).expect_err("connect should fail");

        match &err {
            ConnectError::Initiate { source, .. } => {
                assert_eq!(source.raw_os_error(), Some(libc::ENETUNREACH));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("connecting to 192.0.2.10:53: "));
        assert!(socket.polls().is_empty());
    }
}
