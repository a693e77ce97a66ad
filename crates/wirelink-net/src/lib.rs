//! Networking module for wirelink.
//!
//! This crate provides a single-connection TCP client:
//!
//! - **TCP Client**: Blocking connect and send, with inbound data delivered
//!   to observers from a background receive thread
//! - **Address Resolution**: Dotted-quad parsing with a pluggable host name
//!   resolver (platform lookup, hickory-resolver, or a fixed table)
//!
//! # TCP Client
//!
//! ```no_run
//! use wirelink_net::{Observer, TcpClient, TcpClientConfig};
//!
//! let client = TcpClient::new(TcpClientConfig::default());
//!
//! client.subscribe(
//!     Observer::new()
//!         .on_message(|data| println!("{}", String::from_utf8_lossy(data)))
//!         .on_disconnect(|reason| eprintln!("connection lost: {reason}")),
//! );
//!
//! // Bind a fixed local port before connecting
//! client.connect_from("example.com", 7, 40000)?;
//! client.send(b"ping")?;
//! client.close()?;
//! # Ok::<(), wirelink_net::NetworkError>(())
//! ```
//!
//! # Delivery
//!
//! Handlers run on the receive thread, in registration order. Each message
//! is one read of at most `max_packet_size` bytes; message boundaries of the
//! peer are not preserved. The disconnect notification is delivered at most
//! once per connection and never after an explicit `close()`.

mod error;
pub mod dns;
pub mod tcp;

pub use error::{DisconnectReason, NetworkError, Result};

// Re-export commonly used types at the crate root
pub use dns::{DnsConfig, DnsResolver, Endpoint, Resolve, StaticResolver, SystemResolver};
pub use tcp::{ClientEvent, Observer, TcpClient, TcpClientConfig, TcpConnectionState};
