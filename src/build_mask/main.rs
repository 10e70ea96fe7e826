//! Grid mask generation for the selected basin.
//!
//! Basin polygons are mapped onto the grid while extracting, cached, and
//! every grid cell is then tested against the selected one.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use basinmask::basin::{load_basins, Projection};
use basinmask::cache::ensure_cached;
use basinmask::mask::{build_mask_with_progress, write_mask};
use basinmask::{Config, DiskPolygon, LoadedPolygon, PolygonQuery};

#[derive(Parser, Debug)]
#[command(name = "mask")]
#[command(about = "Rasterize a basin polygon from KML into a 1/NaN grid mask")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// KML file with basin boundaries
    #[arg(long)]
    kml: Option<PathBuf>,

    /// Basin to rasterize, as "<Basin_Name>: <Basin_Subbasin_Name>"
    #[arg(long)]
    basin: Option<String>,

    /// Grid columns
    #[arg(long)]
    width: Option<usize>,

    /// Grid rows
    #[arg(long)]
    height: Option<usize>,

    /// Output HDF5 file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Re-read the polygon cache for every cell instead of once
    #[arg(long)]
    reload_each_query: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(kml) = self.kml {
            config.kml_path = kml;
        }
        if let Some(basin) = self.basin {
            config.selected_basin = basin;
        }
        if let Some(width) = self.width {
            config.mask.width = width;
        }
        if let Some(height) = self.height {
            config.mask.height = height;
        }
        if let Some(output) = self.output {
            config.mask.output = output;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load_or_default(args.config.as_deref())?;
    let reload_each_query = args.reload_each_query;
    args.apply(&mut config);
    debug!("Config: {:?}", config);

    info!("Basinmask Mask Builder");
    ensure_cached(&config.grid_cache, &config.selected_basin, || {
        load_basins(&config.kml_path, Projection::Grid(config.grid))
    })
    .with_context(|| format!("Failed to prepare grid cache from {}", config.kml_path.display()))?;

    let query: Box<dyn PolygonQuery> = if reload_each_query {
        info!("Reloading {} for every cell", config.grid_cache.polygon.display());
        Box::new(DiskPolygon::new(&config.grid_cache.polygon))
    } else {
        Box::new(LoadedPolygon::load(&config.grid_cache.polygon)?)
    };

    let pb = ProgressBar::new(config.mask.height as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows")?
            .progress_chars("#>-"),
    );

    let mask = build_mask_with_progress(config.mask.width, config.mask.height, query.as_ref(), |_| {
        pb.inc(1)
    })?;
    pb.finish_with_message("Mask complete");

    write_mask(&config.mask.output, &config.mask.dataset, &mask)
        .with_context(|| format!("Failed to write {}", config.mask.output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "mask",
            "--width",
            "2",
            "--height",
            "3",
            "-o",
            "out.h5",
            "--basin",
            "A: B",
        ]);
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.mask.width, 2);
        assert_eq!(config.mask.height, 3);
        assert_eq!(config.mask.output, PathBuf::from("out.h5"));
        assert_eq!(config.selected_basin, "A: B");
        assert_eq!(config.kml_path, Config::default().kml_path);
    }
}
