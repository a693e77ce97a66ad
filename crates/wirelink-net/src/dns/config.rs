//! DNS configuration types.

use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for [`DnsResolver`](super::DnsResolver).
#[derive(Debug, Clone)]
pub struct DnsConfig {
    /// Nameservers to query, as `IP:port`. Empty means hickory's default
    /// upstream servers.
    pub nameservers: Vec<SocketAddr>,

    /// Maximum number of cached entries.
    pub cache_size: usize,

    /// Whether to consult the hosts file before querying nameservers.
    pub use_hosts_file: bool,

    /// Number of attempts per query.
    pub attempts: usize,

    /// Timeout for each query attempt.
    pub timeout: Duration,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            nameservers: Vec::new(),
            cache_size: 256,
            use_hosts_file: true,
            attempts: 2,
            timeout: Duration::from_secs(5),
        }
    }
}

impl DnsConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration that queries only `nameservers`.
    pub fn with_nameservers(nameservers: Vec<SocketAddr>) -> Self {
        Self {
            nameservers,
            ..Default::default()
        }
    }

    /// Use Cloudflare's public DNS servers.
    pub fn cloudflare() -> Self {
        Self::with_nameservers(vec![
            SocketAddr::from(([1, 1, 1, 1], 53)),
            SocketAddr::from(([1, 0, 0, 1], 53)),
        ])
    }

    /// Set the cache size.
    pub fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    /// Set whether to use the hosts file.
    pub fn use_hosts_file(mut self, use_hosts: bool) -> Self {
        self.use_hosts_file = use_hosts;
        self
    }

    /// Set the number of attempts per query.
    pub fn attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the timeout per attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
