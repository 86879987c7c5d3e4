//! Data service
//!
//! Ties the cached batch to the filter and the aggregator. Every call reads
//! one snapshot of the batch, so a regeneration in the middle of a request
//! cannot mix records from two batches.

use crate::aggregation::{summarize, Statistics};
use crate::cache::{MeasurementStore, StoreConfig};
use crate::query::{MeasurementFilter, MeasurementQuery};
use crate::source::MeasurementSource;
use crate::types::Measurement;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Query and statistics facade over a [`MeasurementStore`]
#[derive(Clone)]
pub struct DataService {
    store: Arc<MeasurementStore>,
}

impl DataService {
    /// Wrap an existing store
    pub fn new(store: Arc<MeasurementStore>) -> Self {
        Self { store }
    }

    /// Build a store over `source` and wrap it
    pub fn from_source(source: Arc<dyn MeasurementSource>, config: StoreConfig) -> Self {
        Self::new(Arc::new(MeasurementStore::new(source, config)))
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<MeasurementStore> {
        &self.store
    }

    /// Measurements of the current batch matching `query`, in batch order
    pub fn query_measurements(&self, query: &MeasurementQuery) -> Vec<Measurement> {
        let start = Instant::now();
        let batch = self.store.get_measurements();
        let filter = MeasurementFilter::from_query(query);
        let result = filter.apply(&batch);

        debug!(
            predicates = filter.predicates().len(),
            scanned = batch.len(),
            matched = result.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Measurement query executed"
        );
        result
    }

    /// Statistics over the whole current batch
    pub fn statistics(&self) -> Statistics {
        summarize(&self.store.get_measurements())
    }

    /// Statistics over the part of the current batch matching `query`
    pub fn statistics_for(&self, query: &MeasurementQuery) -> Statistics {
        if query.is_empty() {
            return self.statistics();
        }
        summarize(&self.query_measurements(query))
    }
}
