use libc::{
    AF_INET, AF_INET6, F_GETFD, F_GETFL, F_SETFD, F_SETFL, FD_CLOEXEC, O_NONBLOCK, POLLERR,
    POLLHUP, POLLIN, POLLOUT, SO_ERROR, SOCK_STREAM, SOL_SOCKET, c_int, c_short, connect, fcntl,
    getsockopt, nfds_t, poll, pollfd, read, sockaddr, sockaddr_in, sockaddr_in6, sockaddr_storage,
    socket, socklen_t, write,
};
use std::net::SocketAddr;
use std::os::fd::{FromRawFd, OwnedFd, RawFd};
use std::{io, mem};

/// Poll bits requested when waiting for the descriptor to become readable.
pub(crate) const READABLE: c_short = POLLIN;

/// Poll bits requested when waiting for the descriptor to become writable.
pub(crate) const WRITABLE: c_short = POLLOUT;

/// Converts the return value of a byte-count system call into a result.
fn cvt_len(n: isize) -> io::Result<usize> {
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

/// Reads from a file descriptor into the given buffer.
///
/// The file descriptor **must** be non-blocking, otherwise the call may
/// park the thread outside of any deadline.
pub(crate) fn sys_read(fd: RawFd, buffer: &mut [u8]) -> io::Result<usize> {
    cvt_len(unsafe { read(fd, buffer.as_mut_ptr() as *mut _, buffer.len()) })
}

/// Writes the buffer to a file descriptor.
///
/// Returns the number of bytes accepted by the kernel, which may be less
/// than `buffer.len()`.
pub(crate) fn sys_write(fd: RawFd, buffer: &[u8]) -> io::Result<usize> {
    cvt_len(unsafe { write(fd, buffer.as_ptr() as *const _, buffer.len()) })
}

/// Outcome of a single `poll(2)` call on one descriptor.
pub(crate) struct Revents {
    pub(crate) error: bool,
    pub(crate) hangup: bool,
}

/// Polls a single descriptor for `events`.
///
/// `timeout_ms` follows `poll(2)`: negative blocks forever, zero returns
/// immediately. Returns `None` when the timeout elapsed with no event.
pub(crate) fn sys_poll(
    fd: RawFd,
    events: c_short,
    timeout_ms: c_int,
) -> io::Result<Option<Revents>> {
    let mut pfd = pollfd {
        fd,
        events,
        revents: 0,
    };

    let rc = unsafe { poll(&mut pfd, 1 as nfds_t, timeout_ms) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    if rc == 0 {
        return Ok(None);
    }

    Ok(Some(Revents {
        error: pfd.revents & POLLERR != 0,
        hangup: pfd.revents & POLLHUP != 0,
    }))
}

/// Initiates a connection on a (usually non-blocking) socket.
pub(crate) fn sys_connect(fd: RawFd, addr: &SocketAddr) -> io::Result<()> {
    let (storage, len) = socketaddr_to_storage(addr);

    let rc = unsafe { connect(fd, &storage as *const _ as *const sockaddr, len) };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Fetches and clears the pending socket error (`SO_ERROR`).
///
/// Returns `Ok(None)` when no error is pending.
pub(crate) fn sys_get_socket_error(fd: RawFd) -> io::Result<Option<io::Error>> {
    let mut error: c_int = 0;
    let mut len = mem::size_of::<c_int>() as socklen_t;

    let rc = unsafe {
        getsockopt(
            fd,
            SOL_SOCKET,
            SO_ERROR,
            &mut error as *mut _ as *mut _,
            &mut len,
        )
    };

    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    if error == 0 {
        Ok(None)
    } else {
        Ok(Some(io::Error::from_raw_os_error(error)))
    }
}

/// Sets a file descriptor to non-blocking mode.
pub(crate) fn sys_set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { fcntl(fd, F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }

    let rc = unsafe { fcntl(fd, F_SETFL, flags | O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// Marks a file descriptor close-on-exec.
pub(crate) fn sys_set_cloexec(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { fcntl(fd, F_GETFD) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }

    let rc = unsafe { fcntl(fd, F_SETFD, flags | FD_CLOEXEC) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// Creates a non-blocking, close-on-exec stream socket.
///
/// The descriptor is closed again if configuring it fails.
pub(crate) fn sys_socket(domain: c_int) -> io::Result<OwnedFd> {
    let fd = unsafe { socket(domain, SOCK_STREAM, 0) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }

    let owned = unsafe { OwnedFd::from_raw_fd(fd) };

    sys_set_nonblocking(fd)?;
    sys_set_cloexec(fd)?;

    Ok(owned)
}

/// Returns the socket domain matching an address.
pub(crate) fn socketaddr_domain(addr: &SocketAddr) -> c_int {
    match addr {
        SocketAddr::V4(_) => AF_INET,
        SocketAddr::V6(_) => AF_INET6,
    }
}

/// Converts a `SocketAddr` to a `sockaddr_storage` and its length.
pub(crate) fn socketaddr_to_storage(addr: &SocketAddr) -> (sockaddr_storage, socklen_t) {
    let mut storage: sockaddr_storage = unsafe { mem::zeroed() };

    match addr {
        SocketAddr::V4(v4) => {
            let sa = unsafe { &mut *(&mut storage as *mut _ as *mut sockaddr_in) };
            sa.sin_family = AF_INET as _;
            sa.sin_port = v4.port().to_be();
            sa.sin_addr.s_addr = u32::from(*v4.ip()).to_be();

            (storage, mem::size_of::<sockaddr_in>() as socklen_t)
        }

        SocketAddr::V6(v6) => {
            let sa = unsafe { &mut *(&mut storage as *mut _ as *mut sockaddr_in6) };
            sa.sin6_family = AF_INET6 as _;
            sa.sin6_port = v6.port().to_be();
            sa.sin6_addr.s6_addr = v6.ip().octets();
            sa.sin6_flowinfo = v6.flowinfo();
            sa.sin6_scope_id = v6.scope_id();

            (storage, mem::size_of::<sockaddr_in6>() as socklen_t)
        }
    }
}
