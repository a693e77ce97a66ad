//! Name lookup through hickory-resolver.

use std::io;
use std::net::{IpAddr, Ipv4Addr};

use hickory_resolver::config::{
    LookupIpStrategy, NameServerConfig, ResolveHosts, ResolverConfig, ResolverOpts,
};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::{Resolver, TokioResolver};
use tokio::runtime::{Builder, Runtime};
use wirelink_core::logging::targets;

use super::config::DnsConfig;
use super::resolver::Resolve;
use crate::error::{NetworkError, Result};

/// DNS resolver backed by hickory-resolver.
///
/// Queries nameservers directly with IPv4-only lookups and caches answers
/// for their TTL. Lookups block the calling thread on a private
/// current-thread runtime, so the resolver plugs into
/// [`TcpClient::with_resolver`](crate::tcp::TcpClient::with_resolver) like
/// any other [`Resolve`] implementation.
///
/// # Panics
///
/// `lookup_ipv4` panics if called from inside an async runtime.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use wirelink_net::dns::{DnsConfig, DnsResolver};
/// use wirelink_net::{TcpClient, TcpClientConfig};
///
/// let resolver = DnsResolver::new(DnsConfig::cloudflare())?;
/// let client = TcpClient::with_resolver(TcpClientConfig::default(), Arc::new(resolver));
/// client.connect("example.com", 80)?;
/// # Ok::<(), wirelink_net::NetworkError>(())
/// ```
pub struct DnsResolver {
    resolver: TokioResolver,
    runtime: Runtime,
}

impl DnsResolver {
    /// Create a new DNS resolver with the given configuration.
    pub fn new(config: DnsConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| NetworkError::Dns(e.to_string()))?;

        let (resolver_config, resolver_opts) = build_resolver_config(&config);
        let resolver = {
            let _guard = runtime.enter();
            Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
                .with_options(resolver_opts)
                .build()
        };

        Ok(Self { resolver, runtime })
    }

    /// Clear the DNS cache.
    pub fn clear_cache(&self) {
        self.resolver.clear_cache();
    }
}

impl Resolve for DnsResolver {
    fn lookup_ipv4(&self, host: &str) -> io::Result<Vec<Ipv4Addr>> {
        let response = self
            .runtime
            .block_on(self.resolver.lookup_ip(host))
            .map_err(|e| io::Error::other(e.to_string()))?;

        let addresses: Vec<Ipv4Addr> = response
            .iter()
            .filter_map(|addr| match addr {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            })
            .collect();
        tracing::trace!(target: targets::DNS, host, count = addresses.len(), "DNS lookup finished");
        Ok(addresses)
    }
}

impl std::fmt::Debug for DnsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsResolver").finish_non_exhaustive()
    }
}

/// Build hickory resolver configuration from our DnsConfig.
fn build_resolver_config(config: &DnsConfig) -> (ResolverConfig, ResolverOpts) {
    let resolver_config = if config.nameservers.is_empty() {
        ResolverConfig::default()
    } else {
        let mut resolver_config = ResolverConfig::new();
        for addr in &config.nameservers {
            resolver_config.add_name_server(NameServerConfig::new(*addr, Protocol::Udp));
            resolver_config.add_name_server(NameServerConfig::new(*addr, Protocol::Tcp));
        }
        resolver_config
    };

    let mut opts = ResolverOpts::default();
    opts.cache_size = config.cache_size;
    opts.use_hosts_file = if config.use_hosts_file {
        ResolveHosts::Auto
    } else {
        ResolveHosts::Never
    };
    opts.attempts = config.attempts;
    opts.timeout = config.timeout;
    opts.ip_strategy = LookupIpStrategy::Ipv4Only;

    (resolver_config, opts)
}
