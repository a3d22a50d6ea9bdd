//! # Tide Times Core Library
//!
//! This library turns a latitude/longitude into a tide curve you can query and draw.
//! It does two things that need care:
//!
//! 1. **Station resolution**: pick the NOAA reference station that should be used
//!    for an arbitrary coordinate (great-circle distance, validity filtering and a
//!    deterministic tie-break).
//! 2. **Tide-curve modeling**: convert the sparse high/low extrema published for that
//!    station into a continuous height function, plus evenly spaced axis ticks that
//!    any renderer can use.
//!
//! ## Design Philosophy
//!
//! ### Pure core, thin edges
//! - [`geo`], [`stations`], [`series`], [`interpolate`] and [`scale`] are synchronous,
//!   side-effect free and never read the system clock. "Now" and the timestamp
//!   offset are always explicit arguments, which keeps the tests deterministic.
//! - [`noaa`], [`catalog`], [`config`] and [`renderer`] are the I/O collaborators.
//!   They only feed the core or consume its outputs.
//!
//! ### Data Flow
//! 1. **Catalog**: fetch the NOAA station list once per process ([`catalog::StationCatalog`])
//! 2. **Resolve**: choose the nearest valid station within the radius ([`stations::resolve`])
//! 3. **Fetch**: download hi/lo predictions for that station ([`noaa::NoaaClient`])
//! 4. **Parse**: build an immutable [`series::TideSeries`] (best effort, with a parse report)
//! 5. **Query**: [`interpolate::height_at`] and [`scale`] drive the chart
//!
//! ## Core Types
//!
//! The crate root exports the value types shared by every module:
//! - [`Coordinate`]: a latitude/longitude pair in degrees
//! - [`Station`]: a tide reference station from the provider catalog
//! - [`TideKind`]: the closed high/low/unknown classification of an extremum
//! - [`TideExtremum`]: one high or low tide sample

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod catalog;
pub mod config;
pub mod geo;
pub mod interpolate;
pub mod noaa;
pub mod renderer;
pub mod scale;
pub mod series;
pub mod stations;

pub use series::TideSeries;

/// A point on the Earth's surface in decimal degrees (WGS84).
///
/// Latitude is expected in `[-90, 90]` and longitude in `[-180, 180]`.
/// The type is a plain `Copy` value; nothing in the crate mutates it.
///
/// # Example
/// ```
/// use tide_times_lib::Coordinate;
///
/// let golden_gate = Coordinate::new(37.8107, -122.4717);
/// assert!(!golden_gate.is_placeholder());
/// assert!(Coordinate::new(0.0, 0.0).is_placeholder());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Degrees north of the equator
    pub latitude: f64,
    /// Degrees east of Greenwich
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True for the exact `(0, 0)` coordinate.
    ///
    /// Station catalogs use `(0, 0)` for records whose position is missing, so
    /// it is never treated as a real location.
    pub fn is_placeholder(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A tide reference station published by the data provider.
///
/// # Example
/// ```
/// use tide_times_lib::{Coordinate, Station};
///
/// let station = Station::new("9414290", "San Francisco", Coordinate::new(37.8063, -122.4659));
/// assert_eq!(station.id, "9414290");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Provider station identifier (NOAA uses 7 digits)
    pub id: String,
    /// Human-readable station name
    pub name: String,
    /// Station position
    pub coordinate: Coordinate,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinate,
        }
    }
}

/// Classification of a tide extremum.
///
/// Decided once while parsing the provider's one-letter code; downstream code
/// never looks at the raw string again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TideKind {
    High,
    Low,
    /// The provider omitted the code or sent one we do not recognise.
    /// Still part of the curve, excluded from high/low summaries.
    Unknown,
}

impl TideKind {
    /// Map an optional provider code (`"H"`, `"L"`) to a kind.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some(c) if c.eq_ignore_ascii_case("h") => TideKind::High,
            Some(c) if c.eq_ignore_ascii_case("l") => TideKind::Low,
            _ => TideKind::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TideKind::High => "High Tide",
            TideKind::Low => "Low Tide",
            TideKind::Unknown => "",
        }
    }
}

/// One high or low tide sample.
///
/// The timestamp always carries a fixed UTC offset, so two extrema from the
/// same series compare unambiguously.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TideExtremum {
    /// Instant of the extremum
    pub timestamp: DateTime<FixedOffset>,
    /// Height above the requested datum, in the requested units
    pub height: f64,
    /// High, low or unclassified
    pub kind: TideKind,
}
