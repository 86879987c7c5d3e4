//! Map visualization
//!
//! Renders floats, heatmaps and trajectories into a self-contained Leaflet
//! page.

mod map;
mod template;

pub use map::{escape_html, OceanMap, DEFAULT_CENTER, DEFAULT_ZOOM};
