//! # Tide Times Application Entry Point
//!
//! Resolves the nearest NOAA station for a location, fetches its hi/lo
//! predictions and prints a tide chart and table to the terminal.
//!
//! ```text
//! tide-times [--lat <deg> --lon <deg>] [--name <label>] [--remember] [--config <path>]
//! ```
//!
//! Without `--lat/--lon` the location saved in the config file is used.
//! `RUST_LOG=info` (or `debug`) shows what the resolver and client are doing.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use log::{info, warn};
use std::env;
use std::path::PathBuf;
use tide_times_lib::{
    catalog::StationCatalog,
    config::{Config, LocationConfig, CONFIG_FILE},
    noaa::{NoaaClient, TideError},
    renderer::{render_chart, render_extrema_table, render_now_summary},
    stations::resolve,
    TideSeries,
};

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Args {
    latitude: Option<f64>,
    longitude: Option<f64>,
    name: Option<String>,
    remember: bool,
    config: Option<PathBuf>,
}

impl Args {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| anyhow!("{flag} needs a value"))
            };
            match arg.as_str() {
                "--lat" => parsed.latitude = Some(parse_degrees(&value("--lat")?, 90.0)?),
                "--lon" => parsed.longitude = Some(parse_degrees(&value("--lon")?, 180.0)?),
                "--name" => parsed.name = Some(value("--name")?),
                "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--remember" => parsed.remember = true,
                other => bail!("unknown argument: {other}"),
            }
        }

        if parsed.latitude.is_some() != parsed.longitude.is_some() {
            bail!("--lat and --lon must be given together");
        }
        Ok(parsed)
    }

    /// Location from the command line, if one was given
    fn location(&self) -> Option<LocationConfig> {
        Some(LocationConfig {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| "Custom location".to_string()),
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }
}

fn parse_degrees(text: &str, limit: f64) -> anyhow::Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .with_context(|| format!("invalid coordinate {text:?}"))?;
    if !value.is_finite() || value.abs() > limit {
        bail!("coordinate {value} outside ±{limit}");
    }
    Ok(value)
}

/// Predictions that could not be fetched are shown as an empty chart.
fn series_or_empty(fetched: Result<TideSeries, TideError>, station_id: &str) -> TideSeries {
    fetched.unwrap_or_else(|e| {
        warn!("Could not fetch predictions for station {}: {}", station_id, e);
        TideSeries::default()
    })
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse(env::args().skip(1))?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut config = Config::load_from_path(&config_path);

    let location = match args.location() {
        Some(location) => {
            if args.remember {
                config.location = Some(location.clone());
                if let Err(e) = config.save_to_path(&config_path) {
                    warn!("Could not remember location: {}", e);
                }
            }
            location
        }
        None => config.location.clone().ok_or_else(|| {
            anyhow!("no location given; pass --lat and --lon or set [location] in {CONFIG_FILE}")
        })?,
    };

    // The only place the clock is read
    let now = Utc::now().with_timezone(&config.api.offset());

    let client = NoaaClient::new(config.api.clone()).context("creating HTTP client")?;
    let catalog = StationCatalog::new();

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    let series = rt.block_on(async {
        let stations = catalog
            .get_or_fetch(|| client.fetch_stations())
            .await
            .context("fetching station catalog")?;

        let nearest = resolve(location.coordinate(), stations, &config.resolver)?;
        let station = nearest.station;

        println!(
            "{}: {} ({}), {:.1} km away",
            location.name, station.name, station.id, nearest.distance_km
        );

        let fetched = client.fetch_series(station, &now).await;
        anyhow::Ok(series_or_empty(fetched, &station.id))
    })?;

    let report = series.report();
    if !report.is_clean() {
        warn!(
            "Tide data had {} skipped, {} defaulted and {} duplicate points",
            report.skipped, report.heights_defaulted, report.duplicates
        );
    }
    info!("Loaded {} extrema", series.len());

    let unit = config.api.unit_label();
    println!();
    print!("{}", render_chart(&series, &now, &config.display));
    println!();
    if let Some(summary) = render_now_summary(&series, &now, unit) {
        println!("{}", summary);
        println!();
    }
    print!("{}", render_extrema_table(&series, unit));

    Ok(())
}
