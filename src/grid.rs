//! Mapping from geographic coordinates to mask grid indices.

use geo::Coord;
use serde::Deserialize;

pub const DEFAULT_ORIGIN_LAT: f64 = 34.4;
pub const DEFAULT_ORIGIN_LON: f64 = -118.75;
/// Degrees per cell (10 arc-seconds)
pub const DEFAULT_STEP: f64 = 0.00277778;

/// Grid anchored at its north-west corner; rows grow southwards
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub step: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            origin_lat: DEFAULT_ORIGIN_LAT,
            origin_lon: DEFAULT_ORIGIN_LON,
            step: DEFAULT_STEP,
        }
    }
}

impl GridSpec {
    /// Grid (x, y) for a lon/lat pair.
    ///
    /// Offsets are truncated toward zero, not floored, so points just west
    /// or north of the origin still land in column/row 0. Existing masks
    /// depend on this.
    pub fn to_grid(&self, lon: f64, lat: f64) -> (i64, i64) {
        let x = ((lon - self.origin_lon) / self.step) as i64;
        let y = -(((lat - self.origin_lat) / self.step) as i64);
        (x, y)
    }

    pub fn to_grid_coord(&self, coord: Coord<f64>) -> Coord<f64> {
        let (x, y) = self.to_grid(coord.x, coord.y);
        Coord {
            x: x as f64,
            y: y as f64,
        }
    }
}

/// [`GridSpec::to_grid`] on the default grid
pub fn latlon2yx(lon: f64, lat: f64) -> (i64, i64) {
    GridSpec::default().to_grid(lon, lat)
}
