//! TCP client with observer-based event delivery.

use std::net::SocketAddrV4;
use std::sync::Arc;

use parking_lot::RwLock;
use wirelink_core::Signal;
use wirelink_core::logging::targets;

use super::config::TcpClientConfig;
use super::observer::{ClientEvent, Observer};
use super::receiver::{self, ReceiveTask};
use super::socket::SocketHandle;
use super::state::{ClientState, TcpConnectionState};
use crate::dns::{Endpoint, Resolve, SystemResolver, resolve_endpoint};
use crate::error::{DisconnectReason, NetworkError, Result};

/// Everything tied to one live connection.
///
/// Field order matters: the receive task is dropped (and joined) before the
/// socket it reads from.
struct Session {
    receiver: ReceiveTask,
    socket: Arc<SocketHandle>,
    peer: Endpoint,
}

impl Session {
    /// Stop the receive loop, then release the descriptor.
    fn shutdown(self) -> Result<()> {
        let Session {
            receiver,
            socket,
            peer,
        } = self;

        receiver.join();
        socket.close().map_err(|e| NetworkError::Close(e.to_string()))?;
        tracing::debug!(target: targets::TCP, %peer, "connection closed");
        Ok(())
    }
}

/// A single-connection TCP client.
///
/// The client connects synchronously, sends synchronously, and delivers
/// inbound data and the disconnect notification to observers from a
/// dedicated receive thread.
///
/// # Lifecycle
///
/// - A new client is closed. [`connect`](Self::connect) opens it and starts
///   the receive loop.
/// - When the peer closes or a read fails, the client becomes
///   [`Disconnected`](TcpConnectionState::Disconnected) and observers get one
///   disconnect notification.
/// - [`close`](Self::close) stops the receive loop and releases the socket.
///   After that the client may connect again.
///
/// # Example
///
/// ```no_run
/// use wirelink_net::tcp::{Observer, TcpClient, TcpClientConfig};
///
/// let client = TcpClient::new(TcpClientConfig::new().no_delay(true));
///
/// client.subscribe(
///     Observer::new()
///         .on_message(|data| println!("Received {} bytes", data.len()))
///         .on_disconnect(|reason| println!("Disconnected: {reason}")),
/// );
///
/// client.connect("127.0.0.1", 8080)?;
/// client.send(b"Hello, Server!")?;
/// client.close()?;
/// # Ok::<(), wirelink_net::NetworkError>(())
/// ```
pub struct TcpClient {
    config: TcpClientConfig,
    resolver: Arc<dyn Resolve>,
    state: Arc<ClientState>,
    events: Arc<Signal<ClientEvent>>,
    session: RwLock<Option<Session>>,
}

impl Default for TcpClient {
    fn default() -> Self {
        Self::new(TcpClientConfig::default())
    }
}

impl TcpClient {
    /// Create a new client that resolves host names with the system resolver.
    pub fn new(config: TcpClientConfig) -> Self {
        Self::with_resolver(config, Arc::new(SystemResolver))
    }

    /// Create a new client with a custom host name resolver.
    pub fn with_resolver(config: TcpClientConfig, resolver: Arc<dyn Resolve>) -> Self {
        Self {
            config,
            resolver,
            state: Arc::new(ClientState::new()),
            events: Arc::new(Signal::new()),
            session: RwLock::new(None),
        }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &TcpClientConfig {
        &self.config
    }

    /// Get the current connection state.
    pub fn state(&self) -> TcpConnectionState {
        self.state.snapshot()
    }

    /// Check if the client is connected.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Check if the client is closed.
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Get the endpoint of the current connection, if any.
    pub fn peer_addr(&self) -> Option<Endpoint> {
        self.session.read().as_ref().map(|session| session.peer)
    }

    /// Get the local address of the current connection, if any.
    pub fn local_addr(&self) -> Option<SocketAddrV4> {
        self.session
            .read()
            .as_ref()
            .and_then(|session| session.socket.local_addr().ok())
    }

    /// Connect to `address:port`.
    ///
    /// `address` may be a dotted-quad or a host name. On success the receive
    /// loop is running when this returns.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::AlreadyConnected`] if the client holds a connection
    ///   (call [`close`](Self::close) first)
    /// - [`NetworkError::SocketCreation`], [`NetworkError::Resolution`],
    ///   [`NetworkError::Connect`] or [`NetworkError::Spawn`] if a step fails
    ///
    /// On error the client is left closed and no socket is leaked.
    pub fn connect(&self, address: &str, port: u16) -> Result<()> {
        self.establish(address, port, None)
    }

    /// Connect to `address:port` from local port `source_port`.
    ///
    /// # Errors
    ///
    /// Same as [`connect`](Self::connect), plus
    /// [`NetworkError::InvalidSourcePort`] for a port outside `0..=65535`
    /// (checked before any socket is created) and [`NetworkError::Bind`] if
    /// the port cannot be bound.
    pub fn connect_from(&self, address: &str, port: u16, source_port: i64) -> Result<()> {
        let source_port =
            u16::try_from(source_port).map_err(|_| NetworkError::InvalidSourcePort(source_port))?;
        self.establish(address, port, Some(source_port))
    }

    fn establish(&self, address: &str, port: u16, source_port: Option<u16>) -> Result<()> {
        let mut session = self.session.write();
        if session.is_some() || !self.state.is_closed() {
            return Err(NetworkError::AlreadyConnected);
        }

        let socket =
            SocketHandle::new_stream().map_err(|e| NetworkError::SocketCreation(e.to_string()))?;

        if let Some(source_port) = source_port {
            socket
                .bind_local_port(source_port)
                .map_err(|e| NetworkError::Bind {
                    port: source_port,
                    reason: e.to_string(),
                })?;
            tracing::debug!(target: targets::TCP, source_port, "bound source port");
        }

        let endpoint = resolve_endpoint(address, port, self.resolver.as_ref())?;

        socket.connect(endpoint).map_err(|e| NetworkError::Connect {
            endpoint,
            reason: e.to_string(),
        })?;

        self.apply_socket_options(&socket);

        let socket = Arc::new(socket);
        self.state.mark_open();
        let receiver = match receiver::spawn(
            &self.config,
            socket.clone(),
            self.state.clone(),
            self.events.clone(),
        ) {
            Ok(receiver) => receiver,
            Err(e) => {
                self.state.mark_closed();
                return Err(NetworkError::Spawn(e.to_string()));
            }
        };

        tracing::debug!(
            target: targets::TCP,
            %endpoint,
            local = ?socket.local_addr().ok(),
            peer = ?socket.peer_addr().ok(),
            "connected"
        );
        *session = Some(Session {
            receiver,
            socket,
            peer: endpoint,
        });
        Ok(())
    }

    fn apply_socket_options(&self, socket: &SocketHandle) {
        if self.config.no_delay
            && let Err(e) = socket.set_nodelay(true)
        {
            tracing::warn!(target: targets::TCP, error = %e, "failed to set TCP_NODELAY");
        }
        if self.config.keep_alive
            && let Err(e) = socket.set_keepalive(true)
        {
            tracing::warn!(target: targets::TCP, error = %e, "failed to set SO_KEEPALIVE");
        }
    }

    /// Send `data` with a single blocking write.
    ///
    /// There is no internal retry: if the transport accepts fewer bytes than
    /// requested, [`NetworkError::PartialSend`] reports how many were sent and
    /// the caller decides what to do with the remainder.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::NotConnected`] if the client holds no connection
    /// - [`NetworkError::Send`] if the write fails
    /// - [`NetworkError::PartialSend`] on a short write
    pub fn send(&self, data: &[u8]) -> Result<()> {
        let session = self.session.read();
        let session = session.as_ref().ok_or(NetworkError::NotConnected)?;
        if data.is_empty() {
            return Ok(());
        }

        let sent = session
            .socket
            .send(data)
            .map_err(|e| NetworkError::Send(e.to_string()))?;
        check_written(sent, data.len())
    }

    /// Register an observer.
    ///
    /// Observers are invoked on the receive thread, in registration order, and
    /// stay registered for the lifetime of the client. Registering from inside
    /// a handler is allowed; the new observer sees events from the next one on.
    pub fn subscribe(&self, observer: Observer) {
        self.events.connect(move |event| observer.dispatch(event));
    }

    /// Register a message-only observer.
    pub fn on_message<F>(&self, handler: F)
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.subscribe(Observer::new().on_message(handler));
    }

    /// Register a disconnect-only observer.
    pub fn on_disconnect<F>(&self, handler: F)
    where
        F: Fn(&DisconnectReason) + Send + Sync + 'static,
    {
        self.subscribe(Observer::new().on_disconnect(handler));
    }

    /// Get the raw event signal.
    pub fn events(&self) -> &Signal<ClientEvent> {
        &self.events
    }

    /// Close the connection.
    ///
    /// Stops the receive loop, waits for its thread to exit, then releases
    /// the socket. Observers get no disconnect notification for an explicit
    /// close. The client is closed afterwards even if releasing the socket
    /// fails, so close is never retried.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::AlreadyClosed`] if the client is closed (or another
    ///   thread is closing it)
    /// - [`NetworkError::Close`] if the OS fails to release the descriptor
    pub fn close(&self) -> Result<()> {
        let session = {
            let mut session = self.session.write();
            let Some(session) = session.take() else {
                return Err(NetworkError::AlreadyClosed);
            };
            self.state.mark_disconnected();
            session
        };

        let result = session.shutdown();
        self.state.mark_closed();
        result
    }
}

/// Map a write result to success or a short-write error.
fn check_written(sent: usize, requested: usize) -> Result<()> {
    if sent < requested {
        return Err(NetworkError::PartialSend { sent, requested });
    }
    Ok(())
}

impl Drop for TcpClient {
    fn drop(&mut self) {
        if self.session.get_mut().is_some()
            && let Err(e) = self.close()
        {
            tracing::warn!(target: targets::TCP, error = %e, "failed to close client on drop");
        }
    }
}

impl std::fmt::Debug for TcpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpClient")
            .field("peer", &self.peer_addr())
            .field("state", &self.state())
            .finish()
    }
}
