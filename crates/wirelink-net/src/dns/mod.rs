//! Address resolution for wirelink.
//!
//! Turns a textual address (dotted-quad or host name) plus port into an IPv4
//! [`Endpoint`]. Name lookup sits behind the [`Resolve`] trait:
//!
//! - [`SystemResolver`]: the platform's lookup (hosts file and the system's
//!   configured nameservers)
//! - [`DnsResolver`]: hickory-resolver with its own nameservers and cache
//! - [`StaticResolver`]: a fixed host table
//!
//! # Example
//!
//! ```
//! use std::net::Ipv4Addr;
//! use wirelink_net::dns::{resolve_endpoint, StaticResolver};
//!
//! let resolver = StaticResolver::new().with_host("broker", Ipv4Addr::new(10, 0, 0, 5));
//!
//! let endpoint = resolve_endpoint("broker", 1883, &resolver)?;
//! assert_eq!(endpoint.to_string(), "10.0.0.5:1883");
//! # Ok::<(), wirelink_net::NetworkError>(())
//! ```

mod config;
mod endpoint;
mod lookup;
mod resolver;

pub use config::DnsConfig;
pub use endpoint::Endpoint;
pub use lookup::DnsResolver;
pub use resolver::{Resolve, StaticResolver, SystemResolver, resolve_endpoint};
