//! Basinmask - basin boundary extraction and grid masking from KML
//!
//! This library provides the shared pipeline for the query and mask binaries.

pub mod basin;
pub mod cache;
pub mod config;
pub mod error;
pub mod grid;
pub mod kml;
pub mod mask;
pub mod pip;

pub use basin::{BasinSet, Projection};
pub use cache::{CachePaths, CacheStatus};
pub use config::Config;
pub use error::BasinError;
pub use grid::{latlon2yx, GridSpec};
pub use pip::{in_polygon, DiskPolygon, LoadedPolygon, PolygonQuery};
