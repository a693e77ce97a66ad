//! Logging vocabulary for wirelink.
//!
//! wirelink uses the `tracing` crate for instrumentation and never installs a
//! subscriber itself. To see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("wirelink_net=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal emission target.
    pub const SIGNAL: &str = "wirelink_core::signal";
    /// TCP client lifecycle and receive loop target.
    pub const TCP: &str = "wirelink_net::tcp";
    /// Address resolution target.
    pub const DNS: &str = "wirelink_net::dns";
}
