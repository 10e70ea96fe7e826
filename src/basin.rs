//! Basin extraction from the KML feature tree.

use std::path::Path;

use geo::{Coord, LineString, Polygon};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BasinError, Result};
use crate::grid::GridSpec;
use crate::kml::{load_kml, Feature, Geometry, Placemark};

pub const BASIN_NAME_FIELD: &str = "Basin_Name";
pub const SUBBASIN_NAME_FIELD: &str = "Basin_Subbasin_Name";

/// Coordinate space basin polygons are stored in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Keep lon/lat as read from the KML
    Geographic,
    /// Map every vertex to grid indices
    Grid(GridSpec),
}

impl Projection {
    fn apply(&self, coord: Coord<f64>) -> Coord<f64> {
        match self {
            Projection::Geographic => coord,
            Projection::Grid(spec) => spec.to_grid_coord(coord),
        }
    }
}

/// Basin polygons keyed by `"<Basin_Name>: <Basin_Subbasin_Name>"`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasinSet {
    basins: HashMap<String, Polygon<f64>>,
}

impl BasinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a basin, replacing any previous one with the same name
    pub fn insert(&mut self, name: String, polygon: Polygon<f64>) -> Option<Polygon<f64>> {
        self.basins.insert(name, polygon)
    }

    pub fn get(&self, name: &str) -> Option<&Polygon<f64>> {
        self.basins.get(name)
    }

    /// Look up a basin, failing if it is absent
    pub fn require(&self, name: &str) -> Result<&Polygon<f64>> {
        self.get(name)
            .ok_or_else(|| BasinError::MissingBasin(name.to_string()))
    }

    /// Basin names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.basins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.basins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basins.is_empty()
    }
}

/// Parse `kml_path` and extract its basins
pub fn load_basins<P: AsRef<Path>>(kml_path: P, projection: Projection) -> Result<BasinSet> {
    let features = load_kml(kml_path)?;
    extract_basins(&features, projection)
}

/// Walk the feature tree and collect every Polygon placemark as a basin
pub fn extract_basins(features: &[Feature], projection: Projection) -> Result<BasinSet> {
    info!("Extracting basins ({:?})...", projection);

    let mut basins = BasinSet::new();
    visit(features, projection, &mut basins)?;

    info!("Found {} basins", basins.len());
    Ok(basins)
}

fn visit(features: &[Feature], projection: Projection, basins: &mut BasinSet) -> Result<()> {
    for feature in features {
        match feature {
            Feature::Container { children, .. } => visit(children, projection, basins)?,
            Feature::Placemark(placemark) => {
                let Some(Geometry::Polygon { exterior, .. }) = &placemark.geometry else {
                    debug!("Skipping non-polygon placemark {:?}", placemark.name);
                    continue;
                };

                let name = basin_name(placemark)?;
                let ring: Vec<Coord<f64>> =
                    exterior.iter().map(|c| projection.apply(*c)).collect();
                let polygon = Polygon::new(LineString::new(ring), vec![]);

                if basins.insert(name.clone(), polygon).is_some() {
                    warn!("Duplicate basin name {:?}, keeping the last one", name);
                }
            }
        }
    }
    Ok(())
}

/// Compose the basin key from the placemark's first extended-data element
pub fn basin_name(placemark: &Placemark) -> Result<String> {
    let fields = placemark
        .extended_data
        .first()
        .map(|e| e.fields())
        .unwrap_or_default();

    let lookup = |field: &'static str| {
        fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.value.as_str())
            .ok_or_else(|| BasinError::Schema {
                placemark: placemark.name.clone(),
                field,
            })
    };

    let basin = lookup(BASIN_NAME_FIELD)?;
    let subbasin = lookup(SUBBASIN_NAME_FIELD)?;
    Ok(format!("{}: {}", basin, subbasin))
}
