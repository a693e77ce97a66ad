//! TCP client with observer-based event delivery.
//!
//! - **TcpClient**: Connect to one TCP server, send synchronously, receive on
//!   a background thread
//! - **Observer**: A message handler and a disconnect handler registered
//!   together
//!
//! # Client Example
//!
//! ```no_run
//! use wirelink_net::tcp::{TcpClient, TcpClientConfig};
//!
//! let client = TcpClient::new(TcpClientConfig::new().no_delay(true));
//!
//! client.on_message(|data| {
//!     println!("Received {} bytes", data.len());
//! });
//! client.on_disconnect(|reason| {
//!     println!("Disconnected: {reason}");
//! });
//!
//! client.connect("127.0.0.1", 8080)?;
//! client.send(b"Hello, Server!")?;
//! # Ok::<(), wirelink_net::NetworkError>(())
//! ```

mod client;
mod config;
mod observer;
mod receiver;
mod socket;
mod state;

pub use client::TcpClient;
pub use config::{DEFAULT_MAX_PACKET_SIZE, DEFAULT_WAIT_TIMEOUT, TcpClientConfig};
pub use observer::{ClientEvent, Observer};
pub use state::TcpConnectionState;
