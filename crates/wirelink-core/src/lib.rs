//! Core primitives for wirelink.
//!
//! This crate provides the pieces shared by the networking crate:
//!
//! - **Signals**: Thread-safe, append-only observer lists with ordered fan-out
//! - **Logging**: `tracing` target names for filtering by subsystem
//!
//! # Signal Example
//!
//! ```
//! use wirelink_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! ```

pub mod logging;
pub mod signal;

pub use signal::Signal;
