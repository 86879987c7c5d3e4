//! Measurement Store
//!
//! Holds exactly one generated batch of measurements and replaces it
//! wholesale once it is older than the staleness window. There is no
//! per-record invalidation: a batch is either current or gone.
//!
//! # Concurrency
//!
//! The batch sits behind a `parking_lot::RwLock`. Fresh reads only take the
//! read lock. A stale read takes the write lock and re-checks staleness
//! before regenerating, so concurrent callers that all observed a stale
//! batch trigger a single regeneration and every caller sees either the old
//! batch or the complete new one.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use varuna_lens::cache::{MeasurementStore, StoreConfig};
//! use varuna_lens::source::SampleDataGenerator;
//!
//! let store = MeasurementStore::new(
//!     Arc::new(SampleDataGenerator::with_seed(1)),
//!     StoreConfig::default(),
//! );
//! let first = store.get_measurements();
//! let second = store.get_measurements();
//! assert!(Arc::ptr_eq(&first, &second));
//! ```

use super::clock::{Clock, SystemClock};
use crate::source::MeasurementSource;
use crate::types::Measurement;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default staleness window (15 minutes)
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Default number of measurements per batch
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum batch age before regeneration
    pub staleness_window: Duration,

    /// Measurements requested from the source per batch
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            staleness_window: DEFAULT_STALENESS_WINDOW,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl StoreConfig {
    /// Set the staleness window
    pub fn with_staleness_window(mut self, window: Duration) -> Self {
        self.staleness_window = window;
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// The currently installed batch
struct CachedBatch {
    measurements: Arc<Vec<Measurement>>,
    created_at: DateTime<Utc>,
    generation: u64,
}

/// Description of the installed batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchInfo {
    /// When the batch was generated
    pub created_at: DateTime<Utc>,
    /// Age in whole seconds at the time of the call
    pub age_secs: i64,
    /// Number of measurements in the batch
    pub size: usize,
    /// Monotonic batch counter, starting at 1
    pub generation: u64,
}

/// Store counters
#[derive(Debug, Default)]
pub struct StoreStats {
    /// Reads served from the installed batch
    pub hits: AtomicU64,

    /// Batches generated (first load, staleness, or explicit refresh)
    pub regenerations: AtomicU64,

    /// Explicit invalidations
    pub invalidations: AtomicU64,
}

/// Point-in-time copy of [`StoreStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStatsSnapshot {
    /// Reads served from the installed batch
    pub hits: u64,
    /// Batches generated
    pub regenerations: u64,
    /// Explicit invalidations
    pub invalidations: u64,
}

impl StoreStats {
    /// Copy the counters
    pub fn snapshot(&self) -> StoreStatsSnapshot {
        StoreStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            regenerations: self.regenerations.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

/// Time-bounded, whole-batch cache of generated measurements
pub struct MeasurementStore {
    source: Arc<dyn MeasurementSource>,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
    /// Staleness window converted once for comparisons against `DateTime` ages
    staleness: chrono::Duration,
    batch: RwLock<Option<CachedBatch>>,
    stats: StoreStats,
}

impl MeasurementStore {
    /// Store driven by the system clock
    pub fn new(source: Arc<dyn MeasurementSource>, config: StoreConfig) -> Self {
        Self::with_clock(source, Arc::new(SystemClock), config)
    }

    /// Store driven by an injected clock
    pub fn with_clock(
        source: Arc<dyn MeasurementSource>,
        clock: Arc<dyn Clock>,
        config: StoreConfig,
    ) -> Self {
        let staleness =
            chrono::Duration::from_std(config.staleness_window).unwrap_or(chrono::Duration::MAX);
        Self {
            source,
            clock,
            config,
            staleness,
            batch: RwLock::new(None),
            stats: StoreStats::default(),
        }
    }

    fn is_stale(&self, batch: &CachedBatch, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(batch.created_at) >= self.staleness
    }

    /// Current batch, regenerated first when missing or stale
    pub fn get_measurements(&self) -> Arc<Vec<Measurement>> {
        let now = self.clock.now();
        {
            let guard = self.batch.read();
            if let Some(batch) = guard.as_ref().filter(|b| !self.is_stale(b, now)) {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(generation = batch.generation, "Measurement batch cache hit");
                return batch.measurements.clone();
            }
        }

        let mut guard = self.batch.write();
        // Another caller may have regenerated while we waited for the write lock
        let now = self.clock.now();
        if let Some(batch) = guard.as_ref().filter(|b| !self.is_stale(b, now)) {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return batch.measurements.clone();
        }

        self.install(&mut guard, now)
    }

    /// Regenerate unconditionally and return the new batch
    pub fn refresh(&self) -> Arc<Vec<Measurement>> {
        let mut guard = self.batch.write();
        let now = self.clock.now();
        self.install(&mut guard, now)
    }

    /// Drop the installed batch; the next read regenerates
    pub fn invalidate(&self) {
        let removed = self.batch.write().take();
        self.stats.invalidations.fetch_add(1, Ordering::Relaxed);
        if let Some(batch) = removed {
            info!(generation = batch.generation, "Measurement batch invalidated");
        }
    }

    /// Generate a batch into `slot`; the caller holds the write lock
    fn install(
        &self,
        slot: &mut Option<CachedBatch>,
        now: DateTime<Utc>,
    ) -> Arc<Vec<Measurement>> {
        let measurements = Arc::new(self.source.generate_measurements(self.config.batch_size));
        // Generations keep counting across invalidations
        let generation = self.stats.regenerations.fetch_add(1, Ordering::Relaxed) + 1;

        info!(
            source = self.source.name(),
            generation,
            size = measurements.len(),
            "Generated new measurement batch"
        );

        *slot = Some(CachedBatch {
            measurements: measurements.clone(),
            created_at: now,
            generation,
        });
        measurements
    }

    /// Information about the installed batch, if any
    pub fn batch_info(&self) -> Option<BatchInfo> {
        let now = self.clock.now();
        self.batch.read().as_ref().map(|b| BatchInfo {
            created_at: b.created_at,
            age_secs: now.signed_duration_since(b.created_at).num_seconds(),
            size: b.measurements.len(),
            generation: b.generation,
        })
    }

    /// Whether the next read would regenerate
    pub fn needs_refresh(&self) -> bool {
        let now = self.clock.now();
        self.batch
            .read()
            .as_ref()
            .map_or(true, |b| self.is_stale(b, now))
    }

    /// Copy of the store counters
    pub fn stats(&self) -> StoreStatsSnapshot {
        self.stats.snapshot()
    }
}
