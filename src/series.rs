//! # Tide Series Construction
//!
//! A [`TideSeries`] is the ordered set of extrema fetched for one station. It is
//! built once per fetch and never modified; a new fetch builds a new series.
//!
//! ## Parsing contract
//! Provider rows arrive as strings (`"2025-01-19 04:12"`, `"5.61"`, `"H"`).
//! Construction is best effort:
//! - **Bad timestamp**: the row is dropped and counted in [`ParseReport::skipped`]
//! - **Bad height**: handled by [`HeightPolicy`] (zero by default, counted)
//! - **Unknown kind**: kept as [`TideKind::Unknown`]
//! - **Duplicate instant**: the first row in input order wins
//!
//! The result is always sorted ascending by timestamp, whatever the input order.

use crate::{TideExtremum, TideKind};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Timestamp layout used by the provider (`YYYY-MM-DD HH:MM`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One unparsed prediction row as delivered by the provider.
///
/// Field names follow the NOAA CO-OPS JSON payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawTidePoint {
    /// Local timestamp, `YYYY-MM-DD HH:MM`
    pub t: String,
    /// Height as a decimal string
    pub v: String,
    /// Optional one-letter code, `H` or `L`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl RawTidePoint {
    pub fn new(t: impl Into<String>, v: impl Into<String>, kind: Option<&str>) -> Self {
        Self {
            t: t.into(),
            v: v.into(),
            kind: kind.map(str::to_string),
        }
    }
}

/// What to do with a row whose height cannot be parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightPolicy {
    /// Keep the row with a height of `0.0`
    #[default]
    DefaultToZero,
    /// Drop the row and count it as skipped
    Drop,
}

/// Counts of rows that did not make it into the series unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Rows dropped because they could not be parsed
    pub skipped: usize,
    /// Rows kept with their height replaced by `0.0`
    pub heights_defaulted: usize,
    /// Rows dropped because an earlier row had the same timestamp
    pub duplicates: usize,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.heights_defaulted == 0 && self.duplicates == 0
    }
}

/// Immutable, time-ordered tide extrema for one station.
///
/// # Example
/// ```
/// use chrono::FixedOffset;
/// use tide_times_lib::series::{HeightPolicy, RawTidePoint, TideSeries};
///
/// let utc = FixedOffset::east_opt(0).unwrap();
/// let series = TideSeries::from_raw(
///     vec![
///         RawTidePoint::new("2025-01-19 10:00", "0.5", Some("L")),
///         RawTidePoint::new("2025-01-19 04:00", "2.0", Some("H")),
///     ],
///     utc,
///     HeightPolicy::default(),
/// );
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.first().unwrap().height, 2.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TideSeries {
    extrema: Vec<TideExtremum>,
    report: ParseReport,
}

impl TideSeries {
    /// Build a series from already typed extrema.
    ///
    /// Sorts by timestamp and removes duplicate instants (first occurrence wins).
    pub fn new(extrema: Vec<TideExtremum>) -> Self {
        let mut report = ParseReport::default();
        let extrema = order_and_dedup(extrema, &mut report);
        Self { extrema, report }
    }

    /// Parse provider rows into a series.
    ///
    /// Timestamps are interpreted at `offset`, the fixed UTC offset the provider
    /// was asked to report in. Never fails: malformed rows are dropped or
    /// defaulted and counted in [`TideSeries::report`].
    pub fn from_raw<I>(points: I, offset: FixedOffset, policy: HeightPolicy) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<RawTidePoint>,
    {
        let mut report = ParseReport::default();
        let mut extrema = Vec::new();

        for point in points {
            let point = point.borrow();

            let Some(timestamp) = parse_timestamp(&point.t, offset) else {
                warn!("Dropping tide point with unparsable timestamp {:?}", point.t);
                report.skipped += 1;
                continue;
            };

            let height = match parse_height(&point.v) {
                Some(h) => h,
                None => match policy {
                    HeightPolicy::DefaultToZero => {
                        warn!(
                            "Unparsable height {:?} at {}, using 0.0",
                            point.v, point.t
                        );
                        report.heights_defaulted += 1;
                        0.0
                    }
                    HeightPolicy::Drop => {
                        warn!("Dropping tide point with unparsable height {:?}", point.v);
                        report.skipped += 1;
                        continue;
                    }
                },
            };

            extrema.push(TideExtremum {
                timestamp,
                height,
                kind: TideKind::from_code(point.kind.as_deref()),
            });
        }

        let extrema = order_and_dedup(extrema, &mut report);
        debug!(
            "Built tide series with {} points ({:?})",
            extrema.len(),
            report
        );

        Self { extrema, report }
    }

    pub fn first(&self) -> Option<&TideExtremum> {
        self.extrema.first()
    }

    pub fn last(&self) -> Option<&TideExtremum> {
        self.extrema.last()
    }

    /// Heights in time order.
    pub fn heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.extrema.iter().map(|e| e.height)
    }

    pub fn len(&self) -> usize {
        self.extrema.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extrema.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TideExtremum> {
        self.extrema.iter()
    }

    pub fn as_slice(&self) -> &[TideExtremum] {
        &self.extrema
    }

    /// Parse outcome counts recorded when the series was built.
    pub fn report(&self) -> ParseReport {
        self.report
    }

    pub fn min_height(&self) -> Option<f64> {
        self.heights().reduce(f64::min)
    }

    pub fn max_height(&self) -> Option<f64> {
        self.heights().reduce(f64::max)
    }

    /// First and last timestamps, inclusive.
    pub fn coverage(&self) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        Some((self.first()?.timestamp, self.last()?.timestamp))
    }

    /// Extrema classified as high or low; unknown kinds are left out.
    pub fn classified(&self) -> impl Iterator<Item = &TideExtremum> + '_ {
        self.extrema
            .iter()
            .filter(|e| e.kind != TideKind::Unknown)
    }

    /// The next classified extremum strictly after `instant`.
    pub fn next_extremum_after<Tz: chrono::TimeZone>(
        &self,
        instant: &DateTime<Tz>,
    ) -> Option<&TideExtremum> {
        self.classified().find(|e| e.timestamp > *instant)
    }
}

impl<'a> IntoIterator for &'a TideSeries {
    type Item = &'a TideExtremum;
    type IntoIter = std::slice::Iter<'a, TideExtremum>;

    fn into_iter(self) -> Self::IntoIter {
        self.extrema.iter()
    }
}

/// Parse a provider timestamp at a fixed offset.
pub fn parse_timestamp(text: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
        .ok()?
        .and_local_timezone(offset)
        .single()
}

fn parse_height(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|h| h.is_finite())
}

fn order_and_dedup(mut extrema: Vec<TideExtremum>, report: &mut ParseReport) -> Vec<TideExtremum> {
    // Stable sort so equal instants stay in input order before dedup
    extrema.sort_by_key(|e| e.timestamp);
    let before = extrema.len();
    extrema.dedup_by_key(|e| e.timestamp);
    let removed = before - extrema.len();
    if removed > 0 {
        warn!("Dropped {} tide points with duplicate timestamps", removed);
    }
    report.duplicates += removed;
    extrema
}
