//! Binary cache for the basin dictionary and the selected polygon.
//!
//! The cache is treated as authoritative once both files exist: nothing
//! checks whether the source KML changed since it was written. Delete the
//! files to force a rebuild.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use geo::Polygon;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::basin::BasinSet;
use crate::error::{BasinError, Result};

/// Serialize `value` to `path`, replacing any existing file
pub fn save<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    bincode::serialize_into(&mut writer, value).map_err(|e| match *e {
        bincode::ErrorKind::Io(io) => BasinError::Io(io),
        other => BasinError::CacheCorrupt {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })?;
    writer.flush()?;

    Ok(())
}

/// Deserialize a `T` previously written with [`save`]
pub fn load<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let corrupt = |message: String| BasinError::CacheCorrupt {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| corrupt(e.to_string()))?;
    bincode::deserialize_from(BufReader::new(file)).map_err(|e| corrupt(e.to_string()))
}

/// Locations of the two cache files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CachePaths {
    pub basins: PathBuf,
    pub polygon: PathBuf,
}

impl CachePaths {
    pub fn new(basins: impl Into<PathBuf>, polygon: impl Into<PathBuf>) -> Self {
        Self {
            basins: basins.into(),
            polygon: polygon.into(),
        }
    }

    /// Both cache files exist
    pub fn is_complete(&self) -> bool {
        self.basins.is_file() && self.polygon.is_file()
    }

    pub fn load_basins(&self) -> Result<BasinSet> {
        load(&self.basins)
    }

    pub fn load_polygon(&self) -> Result<Polygon<f64>> {
        load(&self.polygon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Both files were already present; nothing was built
    Hit,
    /// The dictionary was built and both files were written
    Built { basins: usize },
}

/// Make sure both cache files exist, building the dictionary only if needed.
///
/// `build` is not called when the cache is complete. Otherwise its result is
/// saved, `selected` is looked up in it and saved on its own.
pub fn ensure_cached<F>(paths: &CachePaths, selected: &str, build: F) -> Result<CacheStatus>
where
    F: FnOnce() -> Result<BasinSet>,
{
    if paths.is_complete() {
        info!(
            "Using cached basins from {} and {}",
            paths.basins.display(),
            paths.polygon.display()
        );
        return Ok(CacheStatus::Hit);
    }

    let basins = build()?;
    save(&paths.basins, &basins)?;
    info!("Wrote {} basins to {}", basins.len(), paths.basins.display());

    let polygon = basins.require(selected)?;
    save(&paths.polygon, polygon)?;
    info!("Wrote {:?} to {}", selected, paths.polygon.display());

    Ok(CacheStatus::Built {
        basins: basins.len(),
    })
}
