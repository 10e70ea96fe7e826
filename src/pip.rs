//! Point-in-polygon queries against the selected basin.

use std::path::{Path, PathBuf};

use geo::{Coord, Intersects, Polygon};

use crate::cache;
use crate::error::Result;

/// Containment test for a single coordinate.
///
/// Points on the polygon boundary count as inside.
pub trait PolygonQuery {
    fn contains(&self, coord: Coord<f64>) -> Result<bool>;
}

/// Load the selected polygon from `path` and test `coord` against it
pub fn in_polygon<P: AsRef<Path>>(path: P, coord: (f64, f64)) -> Result<bool> {
    let polygon: Polygon<f64> = cache::load(path)?;
    Ok(polygon_contains(&polygon, coord.into()))
}

fn polygon_contains(polygon: &Polygon<f64>, coord: Coord<f64>) -> bool {
    polygon.intersects(&coord)
}

/// Re-reads the polygon cache file on every query
#[derive(Debug, Clone)]
pub struct DiskPolygon {
    path: PathBuf,
}

impl DiskPolygon {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PolygonQuery for DiskPolygon {
    fn contains(&self, coord: Coord<f64>) -> Result<bool> {
        in_polygon(&self.path, coord.x_y())
    }
}

/// Polygon read once and held for the lifetime of the value
#[derive(Debug, Clone)]
pub struct LoadedPolygon {
    polygon: Polygon<f64>,
}

impl LoadedPolygon {
    pub fn new(polygon: Polygon<f64>) -> Self {
        Self { polygon }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(cache::load(path)?))
    }
}

impl PolygonQuery for LoadedPolygon {
    fn contains(&self, coord: Coord<f64>) -> Result<bool> {
        Ok(polygon_contains(&self.polygon, coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BasinError;
    use geo::polygon;

    fn basin() -> Polygon<f64> {
        // Rough outline around the San Gabriel Valley
        polygon![
            (x: -118.2, y: 34.0),
            (x: -117.7, y: 34.0),
            (x: -117.7, y: 34.2),
            (x: -118.2, y: 34.2),
        ]
    }

    #[test]
    fn test_inside_and_outside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polygon.bin");
        cache::save(&path, &basin()).unwrap();

        assert!(in_polygon(&path, (-117.95, 34.078)).unwrap());
        assert!(in_polygon(&path, (-118.1, 34.19)).unwrap());
        assert!(!in_polygon(&path, (1.0, 1.0)).unwrap());
        assert!(!in_polygon(&path, (-117.95, 34.3)).unwrap());
    }

    #[test]
    fn test_boundary_is_inside() {
        let query = LoadedPolygon::new(basin());
        assert!(query.contains(Coord { x: -117.7, y: 34.1 }).unwrap());
        assert!(query.contains(Coord { x: -118.2, y: 34.0 }).unwrap());
    }

    #[test]
    fn test_disk_and_loaded_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polygon.bin");
        cache::save(&path, &basin()).unwrap();

        let disk = DiskPolygon::new(&path);
        let loaded = LoadedPolygon::load(&path).unwrap();
        for coord in [
            Coord { x: -117.95, y: 34.078 },
            Coord { x: -117.7, y: 34.2 },
            Coord { x: -117.69, y: 34.1 },
            Coord { x: 0.0, y: 0.0 },
        ] {
            assert_eq!(disk.contains(coord).unwrap(), loaded.contains(coord).unwrap());
        }
    }

    #[test]
    fn test_missing_cache() {
        let dir = tempfile::tempdir().unwrap();
        let err = in_polygon(dir.path().join("polygon.bin"), (0.0, 0.0)).unwrap_err();
        assert!(matches!(err, BasinError::CacheCorrupt { .. }));
    }
}
