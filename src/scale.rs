//! # Axis Scales
//!
//! Derives tick positions for the value (height) and time axes of a tide chart.
//! Everything here is recomputed from a [`TideSeries`] on demand and never
//! stored. [`normalize`] is the shared primitive: both the axis ticks and the
//! plotted curve go through it to land in the unit interval.
//!
//! Value ticks run from the highest height down to the lowest, matching the
//! top-to-bottom order in which labels are drawn.

use crate::TideSeries;
use chrono::{DateTime, Duration, FixedOffset, TimeZone};

/// Intervals per axis when the caller has no preference (five labels)
pub const DEFAULT_TICK_COUNT: usize = 4;

/// Map `value` from `[min, max]` into `[0, 1]`.
///
/// A flat range (`min == max`) maps everything to `0.5` so a flat series is
/// drawn centred. Values outside the range are clamped.
///
/// # Example
/// ```
/// use tide_times_lib::scale::normalize;
///
/// assert_eq!(normalize(3.0, 2.0, 4.0), 0.5);
/// assert_eq!(normalize(7.0, 1.0, 1.0), 0.5);
/// ```
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if min == max {
        return 0.5;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// `count + 1` evenly spaced heights from the series maximum down to its minimum.
///
/// Empty series give no ticks; a flat series repeats its single height.
pub fn value_ticks(series: &TideSeries, count: usize) -> Vec<f64> {
    let (Some(min), Some(max)) = (series.min_height(), series.max_height()) else {
        return Vec::new();
    };
    if count == 0 {
        return vec![max];
    }

    let step = (max - min) / count as f64;
    (0..=count)
        .map(|i| if i == count { min } else { max - step * i as f64 })
        .collect()
}

/// `count + 1` evenly spaced instants from the first to the last extremum.
///
/// Needs at least two extrema; otherwise returns no ticks.
pub fn time_ticks(series: &TideSeries, count: usize) -> Vec<DateTime<FixedOffset>> {
    let Some((start, end)) = series.coverage() else {
        return Vec::new();
    };
    if series.len() < 2 {
        return Vec::new();
    }
    if count == 0 {
        return vec![start];
    }

    let span_ms = (end - start).num_milliseconds();
    (0..=count)
        .map(|i| {
            if i == count {
                end
            } else {
                start + Duration::milliseconds(span_ms * i as i64 / count as i64)
            }
        })
        .collect()
}

/// Height axis: domain bounds plus descending ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct Scale {
    pub domain_min: f64,
    pub domain_max: f64,
    pub ticks: Vec<f64>,
}

impl Scale {
    /// Height scale for a series, `None` when the series is empty.
    pub fn for_heights(series: &TideSeries, count: usize) -> Option<Self> {
        Some(Scale {
            domain_min: series.min_height()?,
            domain_max: series.max_height()?,
            ticks: value_ticks(series, count),
        })
    }

    /// Position of `value` within the domain, `0.0` at the bottom.
    pub fn position(&self, value: f64) -> f64 {
        normalize(value, self.domain_min, self.domain_max)
    }
}

/// Time axis: coverage bounds plus ascending ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeScale {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub ticks: Vec<DateTime<FixedOffset>>,
}

impl TimeScale {
    /// Time scale for a series, `None` with fewer than two extrema.
    pub fn for_series(series: &TideSeries, count: usize) -> Option<Self> {
        if series.len() < 2 {
            return None;
        }
        let (start, end) = series.coverage()?;
        Some(TimeScale {
            start,
            end,
            ticks: time_ticks(series, count),
        })
    }

    /// Position of `instant` along the axis, `0.0` at the start.
    pub fn position<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> f64 {
        let t = instant.timestamp_millis() as f64;
        normalize(
            t,
            self.start.timestamp_millis() as f64,
            self.end.timestamp_millis() as f64,
        )
    }
}
