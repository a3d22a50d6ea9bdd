//! Continuous tide height between published extrema.
//!
//! Heights are interpolated linearly between the two extrema that bracket the
//! query instant. Real tide curves are closer to a cosine between extrema, but
//! the provider only guarantees the extrema themselves and the linear form is
//! exact there. No extrapolation happens outside the fetched window.

use crate::TideSeries;
use chrono::{DateTime, Duration, FixedOffset, TimeZone};

/// Length of `delta` in nanoseconds; millisecond precision beyond ~292 years.
fn as_nanos(delta: Duration) -> f64 {
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64,
        None => delta.num_milliseconds() as f64 * 1e6,
    }
}

/// Estimated height at `instant`, or `None` outside the series' coverage.
///
/// Returns a sample's height exactly when `instant` falls on it, including the
/// last sample of the series.
///
/// # Example
/// ```
/// use chrono::{Duration, FixedOffset};
/// use tide_times_lib::{interpolate::height_at, series::{HeightPolicy, RawTidePoint, TideSeries}};
///
/// let utc = FixedOffset::east_opt(0).unwrap();
/// let series = TideSeries::from_raw(
///     vec![
///         RawTidePoint::new("2025-01-19 00:00", "2.0", Some("H")),
///         RawTidePoint::new("2025-01-19 06:00", "0.5", Some("L")),
///     ],
///     utc,
///     HeightPolicy::default(),
/// );
/// let t0 = series.first().unwrap().timestamp;
///
/// assert_eq!(height_at(&series, &(t0 + Duration::hours(3))), Some(1.25));
/// assert_eq!(height_at(&series, &(t0 - Duration::minutes(1))), None);
/// ```
pub fn height_at<Tz: TimeZone>(series: &TideSeries, instant: &DateTime<Tz>) -> Option<f64> {
    let extrema = series.as_slice();
    let (first, last) = (extrema.first()?, extrema.last()?);
    if *instant < first.timestamp || *instant > last.timestamp {
        return None;
    }

    // Number of extrema at or before the instant; at least 1 after the range check
    let split = extrema.partition_point(|e| e.timestamp <= *instant);
    let before = &extrema[split - 1];
    if before.timestamp == *instant {
        return Some(before.height);
    }
    let after = extrema.get(split)?;

    let span = as_nanos(after.timestamp - before.timestamp);
    let elapsed = as_nanos(instant.fixed_offset() - before.timestamp);
    let fraction = elapsed / span;

    Some(before.height + fraction * (after.height - before.height))
}

/// Sample the curve at `steps + 1` evenly spaced instants across its coverage.
///
/// Returns `(instant, height)` pairs; empty for series with fewer than two points.
pub fn sample_curve(series: &TideSeries, steps: usize) -> Vec<(DateTime<FixedOffset>, f64)> {
    let Some((start, end)) = series.coverage() else {
        return Vec::new();
    };
    if series.len() < 2 || steps == 0 {
        return Vec::new();
    }

    let span_ms = (end - start).num_milliseconds();
    (0..=steps)
        .filter_map(|i| {
            let instant = if i == steps {
                end
            } else {
                start + Duration::milliseconds(span_ms * i as i64 / steps as i64)
            };
            height_at(series, &instant).map(|h| (instant, h))
        })
        .collect()
}
