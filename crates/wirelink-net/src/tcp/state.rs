//! Connection state for the TCP client.

use std::sync::atomic::{AtomicBool, Ordering};

/// Current state of a TCP client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TcpConnectionState {
    /// No connection is held: never connected, or closed.
    #[default]
    Closed,
    /// Connected, and the receive loop is running.
    Connected,
    /// The connection was lost (peer close or I/O failure) but the client
    /// has not been closed yet.
    Disconnected,
}

impl std::fmt::Display for TcpConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Connected => write!(f, "Connected"),
            Self::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// The `connected`/`closed` flag pair behind [`TcpClient::state`].
///
/// This is the public view only and outlives every connection. Each receive
/// loop is cancelled through its own [`SessionToken`]. Whenever `connected`
/// is observed true, `closed` is false.
///
/// [`TcpClient::state`]: super::TcpClient::state
#[derive(Debug)]
pub(crate) struct ClientState {
    connected: AtomicBool,
    closed: AtomicBool,
}

impl ClientState {
    pub(crate) fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            closed: AtomicBool::new(true),
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Enter the connected/open state after a successful handshake.
    pub(crate) fn mark_open(&self) {
        self.closed.store(false, Ordering::SeqCst);
        self.connected.store(true, Ordering::SeqCst);
    }

    /// Flip `connected` from true to false.
    ///
    /// Returns `true` only for the caller that performed the transition, which
    /// makes the disconnect notification fire at most once per connection.
    pub(crate) fn mark_disconnected(&self) -> bool {
        self.connected
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Enter the closed state.
    pub(crate) fn mark_closed(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn snapshot(&self) -> TcpConnectionState {
        if self.is_closed() {
            TcpConnectionState::Closed
        } else if self.is_connected() {
            TcpConnectionState::Connected
        } else {
            TcpConnectionState::Disconnected
        }
    }
}

/// Cancellation token for one connection.
///
/// Starts active. Exactly one caller of [`finish`](Self::finish) wins, so a
/// connection ends (and notifies observers) at most once. A token is never
/// reused, which keeps a receive loop from a previous connection from
/// touching the next one.
#[derive(Debug)]
pub(crate) struct SessionToken {
    active: AtomicBool,
}

impl SessionToken {
    pub(crate) fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Deactivate the token. Returns `true` only for the first caller.
    pub(crate) fn finish(&self) -> bool {
        self.active
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
