//! Address resolution tests.

use std::io::Write;
use std::net::{Ipv4Addr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use wirelink_net::dns::{
    DnsConfig, DnsResolver, Resolve, StaticResolver, SystemResolver, resolve_endpoint,
};
use wirelink_net::{NetworkError, TcpClient, TcpClientConfig};

/// A hickory resolver that can only answer from local knowledge.
fn local_dns_resolver() -> DnsResolver {
    DnsResolver::new(
        DnsConfig::with_nameservers(vec!["127.0.0.1:9".parse().unwrap()])
            .attempts(1)
            .timeout(Duration::from_millis(500)),
    )
    .expect("Failed to create resolver")
}

#[test]
fn test_system_resolver_localhost() {
    let addresses = SystemResolver
        .lookup_ipv4("localhost")
        .expect("Failed to resolve localhost");
    assert!(addresses.iter().all(|ip| ip.is_loopback()));
}

#[test]
fn test_resolve_endpoint_with_system_resolver() {
    let endpoint = resolve_endpoint("127.0.0.1", 8080, &SystemResolver).unwrap();
    assert_eq!(endpoint.ip(), Ipv4Addr::LOCALHOST);
    assert_eq!(endpoint.port(), 8080);
    assert_eq!(endpoint.to_string(), "127.0.0.1:8080");
}

#[test]
fn test_static_resolver_first_address_wins() {
    let resolver = StaticResolver::new()
        .with_host("Cluster.Local", Ipv4Addr::new(10, 0, 0, 1))
        .with_host("cluster.local", Ipv4Addr::new(10, 0, 0, 2));

    let endpoint = resolve_endpoint("CLUSTER.local", 443, &resolver).unwrap();
    assert_eq!(endpoint.ip(), Ipv4Addr::new(10, 0, 0, 1));
}

#[test]
fn test_unknown_host_is_resolution_error() {
    let err = resolve_endpoint("missing.invalid", 1, &StaticResolver::new()).unwrap_err();
    assert!(matches!(err, NetworkError::Resolution { ref host, .. } if host == "missing.invalid"));
    assert!(err.to_string().contains("missing.invalid"));
}

#[test]
fn test_dns_resolver_localhost() {
    let addresses = local_dns_resolver()
        .lookup_ipv4("localhost")
        .expect("Failed to resolve localhost");
    assert!(!addresses.is_empty());
    assert!(addresses.iter().all(|ip| ip.is_loopback()));
}

#[test]
fn test_dns_resolver_failure_is_resolution_error() {
    let resolver = DnsResolver::new(
        DnsConfig::with_nameservers(vec!["127.0.0.1:9".parse().unwrap()])
            .use_hosts_file(false)
            .attempts(1)
            .timeout(Duration::from_millis(500)),
    )
    .unwrap();

    let err = resolve_endpoint("service.example", 80, &resolver).unwrap_err();
    assert!(matches!(err, NetworkError::Resolution { ref host, .. } if host == "service.example"));
}

#[test]
fn test_client_connects_through_dns_resolver() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let client = TcpClient::with_resolver(
        TcpClientConfig::new().wait_timeout(Duration::from_millis(20)),
        Arc::new(local_dns_resolver()),
    );

    client.connect("localhost", port).unwrap();
    let (mut server, _) = listener.accept().unwrap();
    server.write_all(b"ok").unwrap();
    assert!(client.peer_addr().unwrap().ip().is_loopback());
    client.close().unwrap();
}
