use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::CachePaths;
use crate::grid::GridSpec;

pub const DEFAULT_SELECTED_BASIN: &str = "SAN GABRIEL VALLEY: SAN GABRIEL VALLEY";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub kml_path: PathBuf,
    pub selected_basin: String,
    /// Caches holding lon/lat polygons
    pub cache: CachePaths,
    /// Caches holding polygons already mapped onto the grid
    pub grid_cache: CachePaths,
    pub grid: GridSpec,
    pub mask: MaskConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MaskConfig {
    pub width: usize,
    pub height: usize,
    pub output: PathBuf,
    pub dataset: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kml_path: PathBuf::from("input.kml"),
            selected_basin: DEFAULT_SELECTED_BASIN.to_string(),
            cache: CachePaths::new("basins.pickle", "polygon.pickle"),
            grid_cache: CachePaths::new("grid_basins.pickle", "grid_polygon.pickle"),
            grid: GridSpec::default(),
            mask: MaskConfig::default(),
        }
    }
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            width: 324,
            height: 540,
            output: PathBuf::from("my_mask.h5"),
            dataset: "mask".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Config from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}
