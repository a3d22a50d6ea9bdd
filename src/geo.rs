//! Great-circle distance between coordinates.

use crate::Coordinate;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometres.
///
/// Uses the `atan2` form of the central angle, which stays accurate for both
/// nearly identical and nearly antipodal points. Total and symmetric; identical
/// points give exactly `0.0`.
///
/// # Example
/// ```
/// use tide_times_lib::{geo::distance_km, Coordinate};
///
/// let sf = Coordinate::new(37.80, -122.47);
/// let nyc = Coordinate::new(40.70, -74.00);
/// let d = distance_km(sf, nyc);
/// assert!((4100.0..4200.0).contains(&d));
/// ```
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodes
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
