//! # Tide Chart Rendering
//!
//! Renders a [`TideSeries`] as an ASCII chart and a high/low table for the
//! terminal. The renderer only consumes core outputs: the curve comes from
//! [`sample_curve`] and [`height_at`], label positions from [`Scale`] and [`TimeScale`], and every
//! domain value reaches the grid through [`normalize`].
//!
//! ```text
//!  5.6 │•••                                      •••
//!  4.2 │   ••                                 ••
//!  2.7 │     ••          X                 ••
//!  ...
//!      └──────────────────────────────────────────
//!       Jan 19        Jan 19        Jan 20
//!       04:12         13:25         04:58
//! ```

use crate::config::DisplayConfig;
use crate::interpolate::{height_at, sample_curve};
use crate::scale::{normalize, Scale, TimeScale};
use crate::{TideKind, TideSeries};
use chrono::{DateTime, FixedOffset};

/// Message shown instead of a chart when there is nothing to draw
pub const NO_DATA: &str = "No tide data available";

/// Axis label for a height, one decimal place
pub fn format_axis_height(height: f64) -> String {
    format!("{:.1}", height)
}

/// Height with its unit, e.g. `5.6 ft`
pub fn format_height(height: f64, unit: &str) -> String {
    format!("{:.1} {}", height, unit)
}

/// Clock time as shown in the table, e.g. `4:12 AM`
pub fn format_clock(instant: &DateTime<FixedOffset>) -> String {
    instant.format("%-I:%M %p").to_string()
}

/// Row index for a unit-interval position, row 0 at the top.
fn row_for(position: f64, rows: usize) -> usize {
    ((1.0 - position) * (rows - 1) as f64).round() as usize
}

/// Column index for a unit-interval position.
fn column_for(position: f64, columns: usize) -> usize {
    (position * (columns - 1) as f64).round() as usize
}

/// Write `text` centred on `column`, kept inside the line and never over an
/// existing label.
fn place_label(line: &mut [char], column: usize, text: &str) {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() > line.len() {
        return;
    }
    let start = column
        .saturating_sub(chars.len() / 2)
        .min(line.len() - chars.len());
    let end = start + chars.len();

    // Keep one blank column between neighbouring labels
    let guard_start = start.saturating_sub(1);
    let guard_end = (end + 1).min(line.len());
    if line[guard_start..guard_end].iter().any(|c| *c != ' ') {
        return;
    }
    line[start..end].copy_from_slice(&chars);
}

/// Render the tide curve, axes and the current-instant marker.
///
/// `now` is marked with `X` when it falls inside the series' coverage.
pub fn render_chart(
    series: &TideSeries,
    now: &DateTime<FixedOffset>,
    display: &DisplayConfig,
) -> String {
    let (Some(values), Some(times)) = (
        Scale::for_heights(series, display.value_ticks),
        TimeScale::for_series(series, display.time_ticks),
    ) else {
        return format!("{NO_DATA}\n");
    };

    let rows = display.rows.max(2);
    let columns = display.columns.max(2);
    let mut grid = vec![vec![' '; columns]; rows];

    // Curve, one sample per column
    for (column, (_, height)) in sample_curve(series, columns - 1).into_iter().enumerate() {
        grid[row_for(values.position(height), rows)][column] = '•';
    }

    // Current instant
    if let Some(height) = height_at(series, now) {
        let row = row_for(values.position(height), rows);
        let column = column_for(times.position(now), columns);
        grid[row][column] = 'X';
    }

    // Y-axis labels, one per distinct row
    let mut labels: Vec<Option<String>> = vec![None; rows];
    for tick in &values.ticks {
        let row = row_for(
            normalize(*tick, values.domain_min, values.domain_max),
            rows,
        );
        if labels[row].is_none() {
            labels[row] = Some(format_axis_height(*tick));
        }
    }
    let label_width = labels
        .iter()
        .flatten()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (row, cells) in grid.iter().enumerate() {
        let label = labels[row].as_deref().unwrap_or("");
        let line: String = cells.iter().collect();
        out.push_str(&format!(
            "{:>width$} │{}\n",
            label,
            line.trim_end(),
            width = label_width
        ));
    }

    // X-axis with two-line tick labels (date, then time)
    let padding = " ".repeat(label_width + 2);
    out.push_str(&format!(
        "{:width$} └{}\n",
        "",
        "─".repeat(columns),
        width = label_width
    ));

    let mut date_line = vec![' '; columns];
    let mut time_line = vec![' '; columns];
    for tick in &times.ticks {
        let column = column_for(times.position(tick), columns);
        place_label(&mut date_line, column, &tick.format("%b %-d").to_string());
        place_label(&mut time_line, column, &tick.format("%H:%M").to_string());
    }
    for line in [date_line, time_line] {
        let text: String = line.into_iter().collect();
        out.push_str(&format!("{}{}\n", padding, text.trim_end()));
    }

    out
}

/// Tabulate the high and low tides; unclassified extrema are left out.
pub fn render_extrema_table(series: &TideSeries, unit: &str) -> String {
    let mut out = String::from("High & Low Tides\n");
    let mut any = false;
    for extremum in series.classified() {
        let kind = match extremum.kind {
            TideKind::High => "High",
            TideKind::Low => "Low",
            TideKind::Unknown => continue,
        };
        any = true;
        out.push_str(&format!(
            "  {:<5} {:>6}  {:>8}  {:>7}\n",
            kind,
            extremum.timestamp.format("%b %-d").to_string(),
            format_clock(&extremum.timestamp),
            format_height(extremum.height, unit)
        ));
    }
    if !any {
        out.push_str("  (none)\n");
    }
    out
}

/// One-line summary of the current height and the next high or low tide.
pub fn render_now_summary(
    series: &TideSeries,
    now: &DateTime<FixedOffset>,
    unit: &str,
) -> Option<String> {
    let current = height_at(series, now)?;
    let mut line = format!("Now: {}", format_height(current, unit));
    if let Some(next) = series.next_extremum_after(now) {
        line.push_str(&format!(
            ", next {} at {} ({})",
            next.kind.label(),
            format_clock(&next.timestamp),
            format_height(next.height, unit)
        ));
    }
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{HeightPolicy, RawTidePoint};

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn test_series() -> TideSeries {
        TideSeries::from_raw(
            vec![
                RawTidePoint::new("2025-01-19 04:12", "5.6", Some("H")),
                RawTidePoint::new("2025-01-19 10:05", "-0.2", Some("L")),
                RawTidePoint::new("2025-01-19 13:00", "2.4", None),
                RawTidePoint::new("2025-01-19 16:30", "5.1", Some("H")),
                RawTidePoint::new("2025-01-19 22:40", "0.3", Some("L")),
            ],
            utc(),
            HeightPolicy::default(),
        )
    }

    fn at(text: &str) -> DateTime<FixedOffset> {
        crate::series::parse_timestamp(text, utc()).unwrap()
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_axis_height(5.612), "5.6");
        assert_eq!(format_axis_height(-0.24), "-0.2");
        assert_eq!(format_height(1.26, "ft"), "1.3 ft");
        assert_eq!(format_clock(&at("2025-01-19 16:30")), "4:30 PM");
        assert_eq!(format_clock(&at("2025-01-19 04:12")), "4:12 AM");
    }

    #[test]
    fn test_chart_has_labels_and_marker() {
        let display = DisplayConfig::default();
        let chart = render_chart(&test_series(), &at("2025-01-19 12:00"), &display);
        let lines: Vec<&str> = chart.lines().collect();

        // rows + axis line + two label lines
        assert_eq!(lines.len(), display.rows + 3);
        assert!(lines[0].trim_start().starts_with("5.6 │"));
        assert!(lines[display.rows - 1].trim_start().starts_with("-0.2 │"));
        assert_eq!(chart.matches('X').count(), 1);
        assert!(chart.contains("Jan 19"));
        assert!(chart.contains("04:12"));
        assert!(chart.contains("22:40"));
    }

    #[test]
    fn test_chart_without_now_marker_outside_coverage() {
        let chart = render_chart(
            &test_series(),
            &at("2025-01-21 12:00"),
            &DisplayConfig::default(),
        );
        assert_eq!(chart.matches('X').count(), 0);
        assert!(chart.contains('•'));
    }

    #[test]
    fn test_curve_fills_every_column() {
        let display = DisplayConfig {
            rows: 6,
            columns: 30,
            ..DisplayConfig::default()
        };
        let chart = render_chart(&test_series(), &at("2025-01-21 12:00"), &display);
        assert_eq!(chart.matches('•').count(), display.columns);
    }

    #[test]
    fn test_chart_with_too_little_data() {
        let single = TideSeries::from_raw(
            vec![RawTidePoint::new("2025-01-19 04:12", "5.6", Some("H"))],
            utc(),
            HeightPolicy::default(),
        );
        let now = at("2025-01-19 04:12");
        assert_eq!(render_chart(&single, &now, &DisplayConfig::default()), format!("{NO_DATA}\n"));
        assert_eq!(
            render_chart(&TideSeries::default(), &now, &DisplayConfig::default()),
            format!("{NO_DATA}\n")
        );
    }

    #[test]
    fn test_flat_series_draws_centred() {
        let flat = TideSeries::from_raw(
            vec![
                RawTidePoint::new("2025-01-19 04:00", "2.0", Some("H")),
                RawTidePoint::new("2025-01-19 10:00", "2.0", Some("L")),
            ],
            utc(),
            HeightPolicy::default(),
        );
        let display = DisplayConfig {
            rows: 5,
            columns: 20,
            ..DisplayConfig::default()
        };
        let chart = render_chart(&flat, &at("2025-01-19 05:00"), &display);
        let lines: Vec<&str> = chart.lines().collect();
        assert!(lines[2].contains('•'));
        assert!(lines[2].starts_with("2.0 │"));
        assert!(!lines[0].contains('•'));
    }

    #[test]
    fn test_extrema_table_skips_unknown() {
        let table = render_extrema_table(&test_series(), "ft");
        assert_eq!(table.lines().count(), 5);
        assert!(table.contains("High"));
        assert!(table.contains("4:12 AM"));
        assert!(table.contains("-0.2 ft"));
        assert!(!table.contains("2.4 ft"));

        let empty = render_extrema_table(&TideSeries::default(), "ft");
        assert!(empty.contains("(none)"));
    }

    #[test]
    fn test_now_summary() {
        let line = render_now_summary(&test_series(), &at("2025-01-19 10:05"), "ft").unwrap();
        assert_eq!(line, "Now: -0.2 ft, next High Tide at 4:30 PM (5.1 ft)");
        assert!(render_now_summary(&test_series(), &at("2025-01-18 10:00"), "ft").is_none());
    }

    #[test]
    fn test_place_label_avoids_overlap() {
        let mut line = vec![' '; 12];
        place_label(&mut line, 0, "abc");
        place_label(&mut line, 2, "xyz");
        place_label(&mut line, 11, "end");
        let text: String = line.into_iter().collect();
        assert_eq!(text, "abc      end");
    }
}
