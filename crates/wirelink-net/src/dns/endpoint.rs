//! Resolved IPv4 endpoints.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// A resolved remote peer: IPv4 address plus port.
///
/// Endpoints are immutable once produced by [`resolve_endpoint`](super::resolve_endpoint).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    addr: SocketAddrV4,
}

impl Endpoint {
    /// Create an endpoint from an address and port.
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self {
            addr: SocketAddrV4::new(ip, port),
        }
    }

    /// The IPv4 address.
    pub fn ip(&self) -> Ipv4Addr {
        *self.addr.ip()
    }

    /// The port.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// The endpoint as a std socket address.
    pub fn socket_addr(&self) -> SocketAddrV4 {
        self.addr
    }
}

impl From<SocketAddrV4> for Endpoint {
    fn from(addr: SocketAddrV4) -> Self {
        Self { addr }
    }
}

impl From<Endpoint> for SocketAddr {
    fn from(endpoint: Endpoint) -> Self {
        SocketAddr::V4(endpoint.addr)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.addr.fmt(f)
    }
}
