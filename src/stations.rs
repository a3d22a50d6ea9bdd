//! # Reference Station Resolution
//!
//! Picks the station whose predictions should be used for an arbitrary
//! coordinate. The resolver is a pure function over the candidate list it is
//! given; fetching and caching the catalog is the caller's job (see
//! [`crate::catalog::StationCatalog`]).
//!
//! ## Selection rules
//! 1. Skip structurally invalid records: empty id, id longer than the
//!    provider's canonical length, or the `(0, 0)` placeholder position.
//! 2. Skip stations at or beyond the search radius.
//! 3. Take the closest survivor. Equal distances keep the earlier candidate,
//!    so the same input always yields the same station.
//!
//! Finding nothing is an ordinary outcome for inland or remote coordinates and
//! is reported as [`NotFound`].

use crate::{geo::distance_km, Coordinate, Station};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default search radius in kilometres
pub const DEFAULT_MAX_RADIUS_KM: f64 = 100.0;

/// Canonical NOAA station id length
pub const DEFAULT_MAX_ID_LEN: usize = 7;

/// Provider-specific thresholds used while resolving a station.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Stations at or beyond this distance are never selected
    pub max_radius_km: f64,
    /// Longest station id the provider issues
    pub max_id_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            max_radius_km: DEFAULT_MAX_RADIUS_KM,
            max_id_len: DEFAULT_MAX_ID_LEN,
        }
    }
}

/// No usable station lies within the search radius of the target.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("no tide stations found within {max_radius_km}km of {target}; try a location closer to the coast")]
pub struct NotFound {
    pub target: Coordinate,
    pub max_radius_km: f64,
}

/// The selected station and how far it is from the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestStation<'a> {
    pub station: &'a Station,
    pub distance_km: f64,
}

/// Whether a catalog record can be used at all, independent of the target.
pub fn is_valid_candidate(station: &Station, config: &ResolverConfig) -> bool {
    !station.id.is_empty()
        && station.id.chars().count() <= config.max_id_len
        && !station.coordinate.is_placeholder()
}

/// Select the nearest valid station within `config.max_radius_km` of `target`.
///
/// # Example
/// ```
/// use tide_times_lib::{stations::{resolve, ResolverConfig}, Coordinate, Station};
///
/// let catalog = vec![
///     Station::new("001", "Golden Gate", Coordinate::new(37.80, -122.47)),
///     Station::new("002", "The Battery", Coordinate::new(40.70, -74.00)),
/// ];
/// let nearest = resolve(Coordinate::new(37.81, -122.41), &catalog, &ResolverConfig::default()).unwrap();
/// assert_eq!(nearest.station.id, "001");
/// ```
pub fn resolve<'a>(
    target: Coordinate,
    candidates: &'a [Station],
    config: &ResolverConfig,
) -> Result<NearestStation<'a>, NotFound> {
    let mut best: Option<NearestStation<'a>> = None;

    for station in candidates {
        if !is_valid_candidate(station, config) {
            continue;
        }

        // Negated so a NaN distance (non-finite target) is rejected too
        let distance_km = distance_km(target, station.coordinate);
        if !(distance_km < config.max_radius_km) {
            continue;
        }

        // Strict comparison keeps the first of equally distant stations
        if best.map_or(true, |b| distance_km < b.distance_km) {
            best = Some(NearestStation {
                station,
                distance_km,
            });
        }
    }

    match best {
        Some(nearest) => {
            info!(
                "Found nearest station: {} ({}) - {:.2}km away",
                nearest.station.name, nearest.station.id, nearest.distance_km
            );
            Ok(nearest)
        }
        None => {
            debug!(
                "No station among {} candidates within {}km of {}",
                candidates.len(),
                config.max_radius_km,
                target
            );
            Err(NotFound {
                target,
                max_radius_km: config.max_radius_km,
            })
        }
    }
}

/// [`resolve`] with the NOAA defaults (100 km, 7-character ids).
pub fn resolve_default(
    target: Coordinate,
    candidates: &[Station],
) -> Result<NearestStation<'_>, NotFound> {
    resolve(target, candidates, &ResolverConfig::default())
}
