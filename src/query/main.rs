//! Point queries against the selected basin.
//!
//! Builds the lon/lat basin cache from KML on first run, then prints one
//! `True`/`False` line per probe point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use basinmask::basin::{load_basins, Projection};
use basinmask::cache::ensure_cached;
use basinmask::{in_polygon, Config};

/// Probes used when no --point is given
const DEFAULT_PROBES: [(f64, f64); 2] = [(1.0, 1.0), (-117.95, 34.078)];

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Test points against a basin polygon extracted from KML")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// KML file with basin boundaries
    #[arg(long)]
    kml: Option<PathBuf>,

    /// Basin to query, as "<Basin_Name>: <Basin_Subbasin_Name>"
    #[arg(long)]
    basin: Option<String>,

    /// Point to test as LON,LAT (repeatable)
    #[arg(short, long = "point", value_parser = parse_point)]
    points: Vec<(f64, f64)>,

    /// Print the cached basin names instead of querying
    #[arg(long)]
    list: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LON,LAT, got `{}`", s))?;
    let lon = lon.trim().parse().map_err(|e| format!("bad longitude: {}", e))?;
    let lat = lat.trim().parse().map_err(|e| format!("bad latitude: {}", e))?;
    Ok((lon, lat))
}

/// Capitalized booleans, matching what existing consumers of this output parse
fn format_result(inside: bool) -> &'static str {
    if inside {
        "True"
    } else {
        "False"
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, so stdout only carries results)
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(kml) = args.kml {
        config.kml_path = kml;
    }
    if let Some(basin) = args.basin {
        config.selected_basin = basin;
    }
    debug!("Config: {:?}", config);

    info!("Basinmask Query");
    ensure_cached(&config.cache, &config.selected_basin, || {
        load_basins(&config.kml_path, Projection::Geographic)
    })
    .with_context(|| format!("Failed to prepare basin cache from {}", config.kml_path.display()))?;

    if args.list {
        let basins = config.cache.load_basins()?;
        for name in basins.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let points = if args.points.is_empty() {
        DEFAULT_PROBES.to_vec()
    } else {
        args.points
    };

    for point in points {
        let inside = in_polygon(&config.cache.polygon, point)?;
        debug!("({}, {}) inside: {}", point.0, point.1, inside);
        println!("{}", format_result(inside));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("-117.95,34.078"), Ok((-117.95, 34.078)));
        assert_eq!(parse_point("1, 1"), Ok((1.0, 1.0)));
        assert!(parse_point("1").is_err());
        assert!(parse_point("east,1").is_err());
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(true), "True");
        assert_eq!(format_result(false), "False");
    }

    #[test]
    fn test_args() {
        let args = Args::parse_from(["query", "-p", "1,2", "--point", "3,4", "--list"]);
        assert_eq!(args.points, vec![(1.0, 2.0), (3.0, 4.0)]);
        assert!(args.list);
        assert!(args.config.is_none());
    }
}
