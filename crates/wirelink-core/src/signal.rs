//! Observer signals for wirelink.
//!
//! A [`Signal<Args>`] holds an append-only list of slots (callbacks). Emitting
//! the signal invokes every connected slot, in the order they were connected,
//! on the emitting thread.
//!
//! # Thread Safety
//!
//! Signals are `Send + Sync`. Slots may be connected from any thread while
//! another thread is emitting:
//!
//! - The slot list is snapshotted under its lock and the lock is released
//!   before any slot runs, so a slot may connect further slots without
//!   deadlocking. Slots connected during an emission are invoked starting
//!   with the next emission.
//! - Emissions are serialized. Two threads emitting concurrently never
//!   interleave their slot invocations, while a slot that re-emits the same
//!   signal from inside its own invocation proceeds instead of deadlocking.
//! - A panicking slot unwinds through `emit` but leaves the slot list intact.
//!
//! # Example
//!
//! ```
//! use wirelink_core::Signal;
//!
//! let chunk_received = Signal::<Vec<u8>>::new();
//!
//! chunk_received.connect(|chunk| {
//!     println!("got {} bytes", chunk.len());
//! });
//!
//! chunk_received.emit(b"hello".to_vec());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, ReentrantMutex};

use crate::logging::targets;

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument passed by reference to each slot. Use `()` for
///   signals without a payload.
pub struct Signal<Args> {
    /// Connected slots in registration order.
    slots: Mutex<Vec<Slot<Args>>>,
    /// Serializes emissions across threads.
    emission: ReentrantMutex<()>,
    /// Whether emission is temporarily suppressed.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
            emission: ReentrantMutex::new(()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Connections are permanent for the lifetime of the signal.
    pub fn connect<F>(&self, slot: F)
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.slots.lock().push(Arc::new(slot));
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to [`emit`](Self::emit) do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in registration order.
    ///
    /// Returns the number of slots invoked.
    #[tracing::instrument(skip_all, target = "wirelink_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) -> usize {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return 0;
        }

        let _serial = self.emission.lock();
        let snapshot: Vec<Slot<Args>> = self.slots.lock().clone();
        tracing::trace!(target: targets::SIGNAL, connection_count = snapshot.len(), "emitting signal");

        for slot in &snapshot {
            slot(&args);
        }
        snapshot.len()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_slots_run_in_registration_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let order_clone = order.clone();
            signal.connect(move |_| order_clone.lock().push(i));
        }

        assert_eq!(signal.emit(()), 5);
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_signal_blocked() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        signal.set_blocked(true);
        assert_eq!(signal.emit(2), 0);
        signal.set_blocked(false);
        signal.emit(3);

        assert_eq!(*received.lock(), vec![1, 3]);
    }

    #[test]
    fn test_connect_inside_slot_does_not_deadlock() {
        let signal = Arc::new(Signal::<i32>::new());
        let late_hits = Arc::new(AtomicUsize::new(0));

        let signal_clone = signal.clone();
        let late_clone = late_hits.clone();
        signal.connect(move |_| {
            let late = late_clone.clone();
            signal_clone.connect(move |_| {
                late.fetch_add(1, Ordering::SeqCst);
            });
        });

        // The slot added during the first emission is not part of its snapshot.
        assert_eq!(signal.emit(1), 1);
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);
        assert_eq!(signal.connection_count(), 2);

        signal.emit(2);
        assert_eq!(late_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_emit() {
        let signal = Arc::new(Signal::<u32>::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let signal_clone = signal.clone();
        let seen_clone = seen.clone();
        signal.connect(move |&depth| {
            seen_clone.lock().push(depth);
            if depth < 2 {
                signal_clone.emit(depth + 1);
            }
        });

        signal.emit(0);
        assert_eq!(*seen.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_panicking_slot_leaves_signal_usable() {
        let signal = Arc::new(Signal::<i32>::new());
        let hits = Arc::new(AtomicUsize::new(0));

        signal.connect(|&value| {
            if value == 0 {
                panic!("slot failure");
            }
        });
        let hits_clone = hits.clone();
        signal.connect(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        let signal_clone = signal.clone();
        let outcome = std::thread::spawn(move || signal_clone.emit(0)).join();
        assert!(outcome.is_err());

        assert_eq!(signal.connection_count(), 2);
        assert_eq!(signal.emit(1), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_emit_from_multiple_threads() {
        let signal = Arc::new(Signal::<usize>::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = counter.clone();
        signal.connect(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let signal_clone = signal.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        signal_clone.emit(i);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 800);
    }
}
