//! Measurement caching
//!
//! - [`MeasurementStore`]: one generated batch, regenerated after a staleness window
//! - [`Clock`]: injectable time source so staleness is testable without sleeping

mod clock;
mod measurements;

pub use clock::{Clock, ManualClock, SystemClock};
pub use measurements::{
    BatchInfo, MeasurementStore, StoreConfig, StoreStats, StoreStatsSnapshot,
    DEFAULT_BATCH_SIZE, DEFAULT_STALENESS_WINDOW,
};
