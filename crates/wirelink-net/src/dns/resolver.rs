//! Address resolution: dotted-quad parsing with a pluggable name lookup.

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};

use wirelink_core::logging::targets;

use super::endpoint::Endpoint;
use crate::error::{NetworkError, Result};

/// A name-to-address lookup.
///
/// Implementations only handle host names; dotted-quad addresses are parsed
/// by [`resolve_endpoint`] and never reach the resolver.
pub trait Resolve: Send + Sync {
    /// Look up the IPv4 addresses for `host`.
    ///
    /// An empty result means the name does not resolve.
    fn lookup_ipv4(&self, host: &str) -> io::Result<Vec<Ipv4Addr>>;
}

/// Resolver backed by the platform's lookup (`getaddrinfo` on Unix).
///
/// Honors the hosts file and the system's configured name servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn lookup_ipv4(&self, host: &str) -> io::Result<Vec<Ipv4Addr>> {
        let addresses = (host, 0u16)
            .to_socket_addrs()?
            .filter_map(|addr| match addr.ip() {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .collect();
        Ok(addresses)
    }
}

/// Resolver with a fixed host table.
///
/// Useful as a hosts-file style override or for deterministic tests.
/// Unknown names resolve to nothing. Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    hosts: HashMap<String, Vec<Ipv4Addr>>,
}

impl StaticResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address for `host`. Later addresses for the same host are
    /// returned after earlier ones.
    pub fn with_host(mut self, host: impl Into<String>, ip: Ipv4Addr) -> Self {
        self.hosts
            .entry(host.into().to_ascii_lowercase())
            .or_default()
            .push(ip);
        self
    }
}

impl Resolve for StaticResolver {
    fn lookup_ipv4(&self, host: &str) -> io::Result<Vec<Ipv4Addr>> {
        Ok(self
            .hosts
            .get(&host.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

/// Turn a textual address and port into an [`Endpoint`].
///
/// A dotted-quad address is parsed directly. Anything else is handed to
/// `resolver` and the first IPv4 address wins. There are no retries.
pub fn resolve_endpoint(address: &str, port: u16, resolver: &dyn Resolve) -> Result<Endpoint> {
    if let Ok(ip) = address.parse::<Ipv4Addr>() {
        return Ok(Endpoint::new(ip, port));
    }

    let addresses = resolver
        .lookup_ipv4(address)
        .map_err(|e| NetworkError::Resolution {
            host: address.to_string(),
            reason: e.to_string(),
        })?;

    match addresses.first() {
        Some(&ip) => {
            tracing::debug!(target: targets::DNS, host = address, %ip, "resolved hostname");
            Ok(Endpoint::new(ip, port))
        }
        None => Err(NetworkError::Resolution {
            host: address.to_string(),
            reason: "no IPv4 address found".into(),
        }),
    }
}
