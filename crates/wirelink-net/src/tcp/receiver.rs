//! The background receive loop.
//!
//! One dedicated thread per connection waits (with a bounded timeout) for the
//! socket to become readable, reads one chunk at a time and emits it on the
//! client's event signal. The loop ends on peer close, on a wait/read
//! failure, or when its session token is finished by `close()`. It never
//! restarts.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use wirelink_core::Signal;
use wirelink_core::logging::targets;

use super::config::TcpClientConfig;
use super::observer::ClientEvent;
use super::socket::SocketHandle;
use super::state::{ClientState, SessionToken};
use crate::error::DisconnectReason;

/// Handle to a running receive loop.
///
/// Dropping the handle cancels the loop and waits for it to exit, so the
/// thread is guaranteed to be gone before the socket it reads from can be
/// released.
#[derive(Debug)]
pub(crate) struct ReceiveTask {
    handle: Option<JoinHandle<()>>,
    token: Arc<SessionToken>,
}

impl ReceiveTask {
    /// Cancel the loop and block until its thread has exited.
    pub(crate) fn join(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.token.finish();

        if handle.thread().id() == thread::current().id() {
            // A handler closed the client from inside the loop. The token is
            // finished, so the loop exits as soon as the handler returns and
            // never looks at the socket or the client state again.
            tracing::debug!(target: targets::TCP, "close requested from the receive thread");
            return;
        }
        if handle.join().is_err() {
            tracing::warn!(target: targets::TCP, "receive thread panicked");
        }
    }
}

impl Drop for ReceiveTask {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ends the connection when an observer panics and unwinds the loop.
struct UnwindGuard<'a> {
    token: &'a SessionToken,
    state: &'a ClientState,
}

impl Drop for UnwindGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() && self.token.finish() {
            self.state.mark_disconnected();
            tracing::warn!(target: targets::TCP, "observer panicked; receive loop stopped");
        }
    }
}

/// Start the receive loop for an open connection.
///
/// The loop gets a fresh session token. `state` is only updated when the
/// loop itself ends the connection.
pub(crate) fn spawn(
    config: &TcpClientConfig,
    socket: Arc<SocketHandle>,
    state: Arc<ClientState>,
    events: Arc<Signal<ClientEvent>>,
) -> io::Result<ReceiveTask> {
    let max_packet_size = config.max_packet_size.max(1);
    let wait_timeout = config.wait_timeout;
    let token = Arc::new(SessionToken::new());
    let thread_token = token.clone();

    let handle = thread::Builder::new()
        .name(config.thread_name.clone())
        .spawn(move || {
            let _guard = UnwindGuard {
                token: &thread_token,
                state: &state,
            };
            receive_loop(
                &socket,
                &thread_token,
                &state,
                &events,
                max_packet_size,
                wait_timeout,
            );
        })?;

    Ok(ReceiveTask {
        handle: Some(handle),
        token,
    })
}

fn receive_loop(
    socket: &SocketHandle,
    token: &SessionToken,
    state: &ClientState,
    events: &Signal<ClientEvent>,
    max_packet_size: usize,
    wait_timeout: Duration,
) {
    tracing::debug!(target: targets::TCP, max_packet_size, ?wait_timeout, "receive loop started");
    let mut buffer = vec![0u8; max_packet_size];

    let ended = loop {
        if !token.is_active() {
            break None;
        }

        match socket.wait_readable(wait_timeout) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Some(DisconnectReason::WaitFailed(e.to_string())),
        }

        if !token.is_active() {
            break None;
        }

        match socket.recv(&mut buffer) {
            Ok(0) => break Some(DisconnectReason::PeerClosed),
            Ok(n) => {
                tracing::trace!(target: targets::TCP, bytes = n, "received chunk");
                events.emit(ClientEvent::Message(Bytes::copy_from_slice(&buffer[..n])));
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) => {
                continue;
            }
            Err(e) => break Some(DisconnectReason::ReadFailed(e.to_string())),
        }
    };

    match ended {
        Some(reason) if token.finish() => {
            state.mark_disconnected();
            tracing::debug!(target: targets::TCP, %reason, "connection lost");
            events.emit(ClientEvent::Disconnected(reason));
        }
        Some(reason) => {
            tracing::debug!(target: targets::TCP, %reason, "connection ended during close");
        }
        None => {}
    }
    tracing::debug!(target: targets::TCP, "receive loop stopped");
}
