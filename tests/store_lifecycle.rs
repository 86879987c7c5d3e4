//! Measurement store lifecycle tests
//!
//! Drives the store through its staleness window with a manual clock and
//! checks that concurrent readers of a stale store trigger exactly one
//! regeneration.

use chrono::{Duration, TimeZone, Utc};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Barrier,
};
use std::time::Duration as StdDuration;
use varuna_lens::{
    cache::{ManualClock, MeasurementStore, StoreConfig},
    service::DataService,
    source::{MeasurementSource, SampleDataGenerator},
    types::Measurement,
};

/// Wraps the sample generator and counts calls, optionally slowing each one
struct CountingSource {
    inner: SampleDataGenerator,
    calls: AtomicUsize,
    delay: StdDuration,
}

impl CountingSource {
    fn new(delay: StdDuration) -> Self {
        Self {
            inner: SampleDataGenerator::with_seed(11),
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MeasurementSource for CountingSource {
    fn generate_measurements(&self, count: usize) -> Vec<Measurement> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.inner.generate_measurements(count)
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

fn setup(delay: StdDuration) -> (Arc<MeasurementStore>, Arc<CountingSource>, Arc<ManualClock>) {
    let source = Arc::new(CountingSource::new(delay));
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    ));
    let store = Arc::new(MeasurementStore::with_clock(
        source.clone(),
        clock.clone(),
        StoreConfig::default()
            .with_staleness_window(StdDuration::from_secs(15 * 60))
            .with_batch_size(50),
    ));
    (store, source, clock)
}

// =============================================================================
// Staleness window
// =============================================================================

#[test]
fn test_batch_reused_for_whole_window() {
    let (store, source, clock) = setup(StdDuration::ZERO);

    let first = store.get_measurements();
    for _ in 0..14 {
        clock.advance(Duration::minutes(1));
        assert!(Arc::ptr_eq(&first, &store.get_measurements()));
    }

    assert_eq!(source.calls(), 1);
    assert_eq!(store.stats().hits, 14);
}

#[test]
fn test_regenerates_once_per_expired_window() {
    let (store, source, clock) = setup(StdDuration::ZERO);

    let mut previous = store.get_measurements();
    for expected_generation in 2..=4 {
        clock.advance(Duration::minutes(15));
        let current = store.get_measurements();
        assert!(!Arc::ptr_eq(&previous, &current));
        assert_eq!(
            store.batch_info().unwrap().generation,
            expected_generation as u64
        );
        // Repeated reads right after regeneration hit the new batch
        assert!(Arc::ptr_eq(&current, &store.get_measurements()));
        previous = current;
    }

    assert_eq!(source.calls(), 4);
}

#[test]
fn test_clock_moving_backwards_keeps_batch() {
    let (store, source, clock) = setup(StdDuration::ZERO);

    let first = store.get_measurements();
    clock.advance(Duration::minutes(-30));
    assert!(Arc::ptr_eq(&first, &store.get_measurements()));
    assert_eq!(source.calls(), 1);
}

#[test]
fn test_zero_window_regenerates_every_read() {
    let source = Arc::new(CountingSource::new(StdDuration::ZERO));
    let store = MeasurementStore::with_clock(
        source.clone(),
        Arc::new(ManualClock::default()),
        StoreConfig::default()
            .with_staleness_window(StdDuration::ZERO)
            .with_batch_size(5),
    );

    store.get_measurements();
    store.get_measurements();
    store.get_measurements();
    assert_eq!(source.calls(), 3);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_cold_reads_generate_once() {
    const READERS: usize = 16;
    let (store, source, _clock) = setup(StdDuration::from_millis(50));
    let barrier = Arc::new(Barrier::new(READERS));

    let batches: Vec<Arc<Vec<Measurement>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                scope.spawn(move || {
                    barrier.wait();
                    store.get_measurements()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(source.calls(), 1);
    assert_eq!(store.stats().regenerations, 1);
    assert!(batches.iter().all(|b| Arc::ptr_eq(b, &batches[0])));
}

#[test]
fn test_concurrent_reads_after_expiry_generate_once() {
    const READERS: usize = 12;
    let (store, source, clock) = setup(StdDuration::from_millis(30));

    let stale = store.get_measurements();
    clock.advance(Duration::minutes(20));
    let barrier = Arc::new(Barrier::new(READERS));

    let batches: Vec<Arc<Vec<Measurement>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                scope.spawn(move || {
                    barrier.wait();
                    store.get_measurements()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(source.calls(), 2);
    assert!(batches.iter().all(|b| !Arc::ptr_eq(b, &stale)));
    assert!(batches.iter().all(|b| Arc::ptr_eq(b, &batches[0])));
    assert_eq!(store.batch_info().unwrap().generation, 2);
}

// =============================================================================
// Service over a shared store
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_service_clones_share_one_batch() {
    let (store, source, _clock) = setup(StdDuration::from_millis(20));
    let service = DataService::new(store);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            service.statistics().total_measurements
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 50);
    }
    assert_eq!(source.calls(), 1);
}
