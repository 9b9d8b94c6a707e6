//! Network endpoint type.

use crate::sys::platform::{socketaddr_domain, socketaddr_to_storage};

use libc::{c_int, sockaddr_storage, socklen_t};
use std::fmt;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

/// A remote address to connect to (IP address + port).
///
/// Wraps a [`SocketAddr`] and provides the family-agnostic parameters
/// `connect(2)` needs, plus the display string used in error messages
/// (`127.0.0.1:53`, `[::1]:53`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint(SocketAddr);

impl Endpoint {
    /// Creates a new endpoint from an IP address and port.
    pub const fn new(addr: IpAddr, port: u16) -> Self {
        Self(SocketAddr::new(addr, port))
    }

    /// Creates a localhost (IPv4) endpoint on the given port.
    pub const fn localhost(port: u16) -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    /// Returns the IP address.
    pub const fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    /// Returns the port.
    pub const fn port(&self) -> u16 {
        self.0.port()
    }

    /// Returns the underlying [`SocketAddr`].
    pub const fn as_socket_addr(&self) -> SocketAddr {
        self.0
    }

    /// Socket domain (`AF_INET` or `AF_INET6`) for this endpoint.
    pub(crate) fn domain(&self) -> c_int {
        socketaddr_domain(&self.0)
    }

    /// Raw `sockaddr` and its length, as passed to `connect(2)`.
    pub fn sockaddr(&self) -> (sockaddr_storage, socklen_t) {
        socketaddr_to_storage(&self.0)
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl From<Endpoint> for SocketAddr {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.0
    }
}

impl FromStr for Endpoint {
    type Err = AddrParseError;

    /// Parses `"127.0.0.1:8080"` or `"[::1]:8080"`.
    fn from_str(address: &str) -> Result<Self, Self::Err> {
        SocketAddr::from_str(address).map(Self)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
