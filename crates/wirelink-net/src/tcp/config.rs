//! Configuration for the TCP client.

use std::time::Duration;

/// Default upper bound for a single read, and so for a delivered chunk.
pub const DEFAULT_MAX_PACKET_SIZE: usize = 4096;

/// Default bound on each readability wait in the receive loop.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for a [`TcpClient`](super::TcpClient).
///
/// `wait_timeout` bounds how long the receive loop blocks before it checks
/// for shutdown again, so it is also the worst-case latency of `close()`.
#[derive(Clone, Debug)]
pub struct TcpClientConfig {
    /// Maximum bytes read (and delivered to observers) per chunk.
    pub max_packet_size: usize,
    /// Bound on each readability wait in the receive loop.
    pub wait_timeout: Duration,
    /// Enable TCP_NODELAY (disable Nagle's algorithm).
    pub no_delay: bool,
    /// Enable SO_KEEPALIVE.
    pub keep_alive: bool,
    /// Name given to the receive thread.
    pub thread_name: String,
}

impl Default for TcpClientConfig {
    fn default() -> Self {
        Self {
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            no_delay: false,
            keep_alive: false,
            thread_name: "wirelink-recv".to_string(),
        }
    }
}

impl TcpClientConfig {
    /// Create a new client configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum chunk size. Zero is raised to one byte.
    pub fn max_packet_size(mut self, size: usize) -> Self {
        self.max_packet_size = size.max(1);
        self
    }

    /// Set the bound on each readability wait.
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Enable or disable TCP_NODELAY.
    pub fn no_delay(mut self, enabled: bool) -> Self {
        self.no_delay = enabled;
        self
    }

    /// Enable or disable SO_KEEPALIVE.
    pub fn keep_alive(mut self, enabled: bool) -> Self {
        self.keep_alive = enabled;
        self
    }

    /// Set the receive thread name.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TcpClientConfig::default();
        assert_eq!(config.max_packet_size, 4096);
        assert_eq!(config.wait_timeout, Duration::from_secs(1));
        assert!(!config.no_delay);
        assert!(!config.keep_alive);
        assert_eq!(config.thread_name, "wirelink-recv");
    }

    #[test]
    fn test_builder() {
        let config = TcpClientConfig::new()
            .max_packet_size(16384)
            .wait_timeout(Duration::from_millis(50))
            .no_delay(true)
            .keep_alive(true)
            .thread_name("telemetry-rx");

        assert_eq!(config.max_packet_size, 16384);
        assert_eq!(config.wait_timeout, Duration::from_millis(50));
        assert!(config.no_delay);
        assert!(config.keep_alive);
        assert_eq!(config.thread_name, "telemetry-rx");
    }

    #[test]
    fn test_zero_packet_size_is_clamped() {
        assert_eq!(TcpClientConfig::new().max_packet_size(0).max_packet_size, 1);
    }
}
