//! Events delivered by the client and the observer handler pair.

use bytes::Bytes;

use crate::error::DisconnectReason;

/// An inbound event, as carried by the client's event signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A chunk of at most `max_packet_size` bytes was received.
    Message(Bytes),
    /// The connection ended. Delivered at most once per connection.
    Disconnected(DisconnectReason),
}

type MessageHandler = Box<dyn Fn(&[u8]) + Send + Sync>;
type DisconnectHandler = Box<dyn Fn(&DisconnectReason) + Send + Sync>;

/// A pair of optional handlers registered together with
/// [`TcpClient::subscribe`](super::TcpClient::subscribe).
///
/// # Example
///
/// ```
/// use wirelink_net::tcp::Observer;
///
/// let observer = Observer::new()
///     .on_message(|data| println!("received {} bytes", data.len()))
///     .on_disconnect(|reason| println!("disconnected: {reason}"));
/// ```
#[derive(Default)]
pub struct Observer {
    on_message: Option<MessageHandler>,
    on_disconnect: Option<DisconnectHandler>,
}

impl Observer {
    /// Create an observer with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler for received chunks.
    pub fn on_message<F>(mut self, handler: F) -> Self
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.on_message = Some(Box::new(handler));
        self
    }

    /// Set the handler for the disconnect notification.
    pub fn on_disconnect<F>(mut self, handler: F) -> Self
    where
        F: Fn(&DisconnectReason) + Send + Sync + 'static,
    {
        self.on_disconnect = Some(Box::new(handler));
        self
    }

    /// Invoke the handler matching `event`, if set.
    pub(crate) fn dispatch(&self, event: &ClientEvent) {
        match event {
            ClientEvent::Message(data) => {
                if let Some(handler) = &self.on_message {
                    handler(&data[..]);
                }
            }
            ClientEvent::Disconnected(reason) => {
                if let Some(handler) = &self.on_disconnect {
                    handler(reason);
                }
            }
        }
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observer")
            .field("on_message", &self.on_message.is_some())
            .field("on_disconnect", &self.on_disconnect.is_some())
            .finish()
    }
}
