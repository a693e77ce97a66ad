//! Wirelink Echo Client Example
//!
//! Connects to a TCP server, sends each line typed on stdin and prints
//! whatever comes back.
//!
//! Run with: cargo run -p wirelink-net --example echo_client -- 127.0.0.1 7000 [source-port]
//!
//! Set `RUST_LOG=wirelink_net=debug` to see connection lifecycle events.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;
use wirelink_net::{Observer, TcpClient, TcpClientConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = args.next().as_deref().unwrap_or("7000").parse()?;
    let source_port: Option<i64> = args.next().map(|p| p.parse()).transpose()?;

    let client = TcpClient::new(TcpClientConfig::new().no_delay(true));

    let lost = Arc::new(AtomicBool::new(false));
    let lost_flag = lost.clone();
    client.subscribe(
        Observer::new()
            .on_message(|data| print!("{}", String::from_utf8_lossy(data)))
            .on_disconnect(move |reason| {
                eprintln!("connection lost: {reason}");
                lost_flag.store(true, Ordering::SeqCst);
            }),
    );

    match source_port {
        Some(source_port) => client.connect_from(&host, port, source_port)?,
        None => client.connect(&host, port)?,
    }
    tracing::info!(peer = ?client.peer_addr(), local = ?client.local_addr(), "connected");

    for line in std::io::stdin().lock().lines() {
        if lost.load(Ordering::SeqCst) {
            break;
        }
        let mut line = line?;
        line.push('\n');
        client.send(line.as_bytes())?;
    }

    client.close()?;
    Ok(())
}
