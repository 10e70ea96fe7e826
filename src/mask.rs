//! Grid mask generation.

use std::path::Path;

use geo::Coord;
use ndarray::Array2;
use tracing::info;

use crate::error::{BasinError, Result};
use crate::pip::PolygonQuery;

pub const INSIDE: f64 = 1.0;
pub const OUTSIDE: f64 = f64::NAN;

/// Build a `height` x `width` mask, 1.0 where the cell (column, row) is
/// inside the polygon and NaN elsewhere
pub fn build_mask<Q: PolygonQuery + ?Sized>(
    width: usize,
    height: usize,
    query: &Q,
) -> Result<Array2<f64>> {
    build_mask_with_progress(width, height, query, |_| {})
}

/// Same as [`build_mask`], calling `on_row` after each finished row
pub fn build_mask_with_progress<Q, F>(
    width: usize,
    height: usize,
    query: &Q,
    mut on_row: F,
) -> Result<Array2<f64>>
where
    Q: PolygonQuery + ?Sized,
    F: FnMut(usize),
{
    info!("Building {}x{} mask...", width, height);

    let mut mask = Array2::from_elem((height, width), OUTSIDE);
    let mut inside = 0usize;

    for i in 0..height {
        for j in 0..width {
            let cell = Coord {
                x: j as f64,
                y: i as f64,
            };
            if query.contains(cell)? {
                mask[[i, j]] = INSIDE;
                inside += 1;
            }
        }
        on_row(i);
    }

    info!("{} of {} cells inside", inside, width * height);
    Ok(mask)
}

/// Write `mask` as the single 2D dataset `dataset` of a new HDF5 file,
/// truncating any existing file at `path`
pub fn write_mask<P: AsRef<Path>>(path: P, dataset: &str, mask: &Array2<f64>) -> Result<()> {
    let path = path.as_ref();
    let write_err = |e: hdf5::Error| BasinError::MaskWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let file = hdf5::File::create(path).map_err(write_err)?;
    file.new_dataset_builder()
        .with_data(mask)
        .create(dataset)
        .map_err(write_err)?;

    info!("Wrote mask `{}` to {}", dataset, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache;
    use crate::pip::{DiskPolygon, LoadedPolygon};
    use geo::polygon;

    fn origin_cell() -> geo::Polygon<f64> {
        polygon![
            (x: -0.5, y: -0.5),
            (x: 0.5, y: -0.5),
            (x: 0.5, y: 0.5),
            (x: -0.5, y: 0.5),
        ]
    }

    #[test]
    fn test_single_cell_mask() {
        let mask = build_mask(2, 2, &LoadedPolygon::new(origin_cell())).unwrap();
        assert_eq!(mask.dim(), (2, 2));
        assert_eq!(mask[[0, 0]], 1.0);
        assert!(mask[[0, 1]].is_nan());
        assert!(mask[[1, 0]].is_nan());
        assert!(mask[[1, 1]].is_nan());
    }

    #[test]
    fn test_column_row_order() {
        // Tall thin strip covering column 0, rows 0..=2
        let strip = polygon![
            (x: -0.5, y: -0.5),
            (x: 0.5, y: -0.5),
            (x: 0.5, y: 2.5),
            (x: -0.5, y: 2.5),
        ];
        let mask = build_mask(4, 3, &LoadedPolygon::new(strip)).unwrap();
        assert_eq!(mask.dim(), (3, 4));
        for i in 0..3 {
            assert_eq!(mask[[i, 0]], 1.0);
            for j in 1..4 {
                assert!(mask[[i, j]].is_nan());
            }
        }
    }

    #[test]
    fn test_disk_query_matches_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polygon.bin");
        let triangle = polygon![(x: 0.0, y: 0.0), (x: 3.0, y: 0.0), (x: 0.0, y: 3.0)];
        cache::save(&path, &triangle).unwrap();

        let from_disk = build_mask(4, 4, &DiskPolygon::new(&path)).unwrap();
        let in_memory = build_mask(4, 4, &LoadedPolygon::new(triangle)).unwrap();
        for (a, b) in from_disk.iter().zip(in_memory.iter()) {
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
        assert_eq!(from_disk[[0, 3]], 1.0);
        assert!(from_disk[[3, 3]].is_nan());
    }

    #[test]
    fn test_progress_reports_every_row() {
        let mut rows = Vec::new();
        build_mask_with_progress(3, 5, &LoadedPolygon::new(origin_cell()), |i| rows.push(i))
            .unwrap();
        assert_eq!(rows, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_kml_to_mask() {
        use crate::basin::{load_basins, Projection};
        use crate::cache::{ensure_cached, CachePaths};
        use crate::grid::GridSpec;

        let dir = tempfile::tempdir().unwrap();
        let kml_path = dir.path().join("input.kml");
        std::fs::write(
            &kml_path,
            r#"<kml><Document><Folder><Placemark>
                <ExtendedData><SchemaData>
                  <SimpleData name="Basin_Name">TEST</SimpleData>
                  <SimpleData name="Basin_Subbasin_Name">SQUARE</SimpleData>
                </SchemaData></ExtendedData>
                <Polygon><outerBoundaryIs><LinearRing><coordinates>
                  0,0 2,0 2,-2 0,-2 0,0
                </coordinates></LinearRing></outerBoundaryIs></Polygon>
              </Placemark></Folder></Document></kml>"#,
        )
        .unwrap();

        let spec = GridSpec {
            origin_lat: 0.0,
            origin_lon: 0.0,
            step: 1.0,
        };
        let paths = CachePaths::new(dir.path().join("b.bin"), dir.path().join("p.bin"));
        ensure_cached(&paths, "TEST: SQUARE", || {
            load_basins(&kml_path, Projection::Grid(spec))
        })
        .unwrap();

        let mask = build_mask(4, 4, &DiskPolygon::new(&paths.polygon)).unwrap();
        assert_eq!(mask.iter().filter(|v| **v == 1.0).count(), 9);
        assert_eq!(mask[[2, 2]], 1.0);
        assert!(mask[[0, 3]].is_nan());
        assert!(mask[[3, 0]].is_nan());
    }

    #[test]
    fn test_write_mask() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my_mask.h5");
        let mask = build_mask(2, 2, &LoadedPolygon::new(origin_cell())).unwrap();

        std::fs::write(&path, b"stale").unwrap();
        write_mask(&path, "mask", &mask).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89HDF\r\n\x1a\n");

        let file = hdf5::File::open(&path).unwrap();
        assert_eq!(file.member_names().unwrap(), vec!["mask".to_string()]);
        let read: Array2<f64> = file.dataset("mask").unwrap().read_2d().unwrap();
        assert_eq!(read.dim(), (2, 2));
        assert_eq!(read[[0, 0]], 1.0);
        assert!(read[[0, 1]].is_nan());
        assert!(read[[1, 0]].is_nan());
        assert!(read[[1, 1]].is_nan());
    }
}
