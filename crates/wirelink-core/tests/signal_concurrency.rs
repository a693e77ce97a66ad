//! Concurrent connect/emit behavior of signals.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{TryRecvError, bounded};
use wirelink_core::Signal;

#[test]
fn test_concurrent_connect_during_emission_loses_nothing() {
    let signal = Arc::new(Signal::<u64>::new());
    let hits = Arc::new(AtomicUsize::new(0));

    signal.connect(|_| thread::sleep(Duration::from_micros(50)));

    let (stop_tx, stop_rx) = bounded::<()>(0);
    let emitter = {
        let signal = signal.clone();
        thread::spawn(move || {
            let mut emitted = 0u64;
            while let Err(TryRecvError::Empty) = stop_rx.try_recv() {
                signal.emit(emitted);
                emitted += 1;
            }
            emitted
        })
    };

    let connectors: Vec<_> = (0..4)
        .map(|_| {
            let signal = signal.clone();
            let hits = hits.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let hits = hits.clone();
                    signal.connect(move |_| {
                        hits.fetch_add(1, Ordering::SeqCst);
                    });
                }
            })
        })
        .collect();

    for handle in connectors {
        handle.join().unwrap();
    }
    drop(stop_tx);
    let emitted = emitter.join().unwrap();
    assert!(emitted > 0);

    assert_eq!(signal.connection_count(), 401);

    hits.store(0, Ordering::SeqCst);
    assert_eq!(signal.emit(0), 401);
    assert_eq!(hits.load(Ordering::SeqCst), 400);
}

#[test]
fn test_emissions_from_two_threads_do_not_interleave() {
    let signal = Arc::new(Signal::<u32>::new());
    let log = Arc::new(parking_lot::Mutex::new(Vec::new()));

    for slot in 0..3u32 {
        let log = log.clone();
        signal.connect(move |&emission| {
            log.lock().push((emission, slot));
            thread::sleep(Duration::from_micros(20));
        });
    }

    let handles: Vec<_> = (0..2u32)
        .map(|id| {
            let signal = signal.clone();
            thread::spawn(move || {
                for round in 0..50 {
                    signal.emit(id * 1000 + round);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let log = log.lock();
    assert_eq!(log.len(), 300);
    for group in log.chunks(3) {
        assert_eq!(group[0].0, group[1].0);
        assert_eq!(group[1].0, group[2].0);
        assert_eq!([group[0].1, group[1].1, group[2].1], [0, 1, 2]);
    }
}
