//! # End-to-End Pipeline Tests
//!
//! These tests run the same path as the binary, minus the network: decode NOAA
//! JSON fixtures, resolve a station, build the series, query heights and derive
//! the chart scales.

use chrono::{Duration, FixedOffset};
use tide_times_lib::{
    catalog::StationCatalog,
    config::DisplayConfig,
    geo::distance_km,
    interpolate::height_at,
    noaa::{decode_predictions, decode_stations},
    renderer::render_chart,
    scale::{normalize, time_ticks, value_ticks, DEFAULT_TICK_COUNT},
    series::{parse_timestamp, HeightPolicy, RawTidePoint, TideSeries},
    stations::{resolve, resolve_default, ResolverConfig},
    Coordinate, Station, TideKind,
};

const STATIONS_JSON: &str = r#"{"count": 5, "stations": [
    {"id": "9414290", "name": "San Francisco", "lat": 37.806305, "lng": -122.465904},
    {"id": "9414750", "name": "Alameda", "lat": 37.771953, "lng": -122.300261},
    {"id": "8518750", "name": "The Battery", "lat": 40.7012, "lng": -74.0137},
    {"id": "", "name": "Blank id", "lat": 37.81, "lng": -122.41},
    {"id": "9414999", "name": "No position", "lat": 0.0, "lng": 0.0}
]}"#;

const PREDICTIONS_JSON: &str = r#"{"predictions": [
    {"t": "2025-01-19 16:30", "v": "5.105", "type": "H"},
    {"t": "2025-01-19 04:12", "v": "5.612", "type": "H"},
    {"t": "2025-01-19 22:40", "v": "0.301", "type": "L"},
    {"t": "2025-01-19 10:05", "v": "-0.218", "type": "L"},
    {"t": "2025-01-20 04:58", "v": "5.398", "type": "H"},
    {"t": "not a time", "v": "1.0", "type": "H"}
]}"#;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn fixture_series() -> TideSeries {
    let points = decode_predictions(PREDICTIONS_JSON.as_bytes()).expect("fixture decodes");
    TideSeries::from_raw(points, utc(), HeightPolicy::default())
}

/// Two stations on opposite coasts; the target sits next to the first.
#[test]
fn resolver_picks_bay_area_station() {
    let stations = vec![
        Station::new("001", "Golden Gate", Coordinate::new(37.80, -122.47)),
        Station::new("002", "The Battery", Coordinate::new(40.70, -74.00)),
    ];
    let nearest = resolve_default(Coordinate::new(37.81, -122.41), &stations).unwrap();
    assert_eq!(nearest.station.id, "001");
}

#[test]
fn resolver_with_empty_catalog_is_not_found() {
    let err = resolve_default(Coordinate::new(37.81, -122.41), &[]).unwrap_err();
    assert_eq!(err.max_radius_km, 100.0);
}

/// Catalog records from NOAA go straight into the resolver.
#[test]
fn decoded_catalog_resolves_and_skips_bad_records() {
    let stations = decode_stations(STATIONS_JSON.as_bytes()).unwrap();
    assert_eq!(stations.len(), 5);

    // Right on top of the blank-id record, which must not win
    let target = Coordinate::new(37.81, -122.41);
    let nearest = resolve(target, &stations, &ResolverConfig::default()).unwrap();
    assert_eq!(nearest.station.id, "9414290");
    assert!(nearest.distance_km < ResolverConfig::default().max_radius_km);
    assert!(!nearest.station.id.is_empty());
    assert!(!nearest.station.coordinate.is_placeholder());
}

#[test]
fn resolved_station_is_within_radius_for_many_targets() {
    let stations = decode_stations(STATIONS_JSON.as_bytes()).unwrap();
    let config = ResolverConfig {
        max_radius_km: 20.0,
        max_id_len: 7,
    };
    for i in 0..40 {
        let target = Coordinate::new(37.5 + i as f64 * 0.02, -122.6 + i as f64 * 0.01);
        if let Ok(nearest) = resolve(target, &stations, &config) {
            assert!(distance_km(target, nearest.station.coordinate) < 20.0);
        }
    }
}

#[test]
fn fixture_series_is_sorted_and_reports_skips() {
    let series = fixture_series();
    assert_eq!(series.len(), 5);
    assert_eq!(series.report().skipped, 1);
    for pair in series.as_slice().windows(2) {
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
    assert_eq!(series.first().unwrap().kind, TideKind::High);
    assert_eq!(series.last().unwrap().height, 5.398);
}

/// Linear midpoint between a 2.0 high and a 0.5 low six hours apart.
#[test]
fn interpolation_midpoint_scenario() {
    let series = TideSeries::from_raw(
        vec![
            RawTidePoint::new("2025-01-19 06:00", "2.0", Some("H")),
            RawTidePoint::new("2025-01-19 12:00", "0.5", Some("L")),
        ],
        utc(),
        HeightPolicy::default(),
    );
    let t0 = series.first().unwrap().timestamp;
    assert_eq!(height_at(&series, &(t0 + Duration::hours(3))), Some(1.25));
}

#[test]
fn interpolation_is_exact_at_samples_and_undefined_outside() {
    let series = fixture_series();
    for e in &series {
        assert_eq!(height_at(&series, &e.timestamp), Some(e.height));
    }
    let (start, end) = series.coverage().unwrap();
    assert_eq!(height_at(&series, &(start - Duration::minutes(1))), None);
    assert_eq!(height_at(&series, &(end + Duration::minutes(1))), None);
}

#[test]
fn scales_follow_series() {
    let series = fixture_series();

    let values = value_ticks(&series, DEFAULT_TICK_COUNT);
    assert_eq!(values.len(), 5);
    assert_eq!(values[0], 5.612);
    assert_eq!(values[4], -0.218);

    let times = time_ticks(&series, DEFAULT_TICK_COUNT);
    assert_eq!(times.len(), 5);
    assert_eq!(times[0], parse_timestamp("2025-01-19 04:12", utc()).unwrap());
    assert_eq!(times[4], parse_timestamp("2025-01-20 04:58", utc()).unwrap());

    assert_eq!(normalize(3.0, 1.0, 1.0), 0.5);
}

#[test]
fn chart_renders_from_fixture() {
    let series = fixture_series();
    let now = parse_timestamp("2025-01-19 12:00", utc()).unwrap();
    let chart = render_chart(&series, &now, &DisplayConfig::default());
    assert!(chart.contains('X'));
    assert!(chart.contains("5.6"));
}

#[tokio::test]
async fn catalog_feeds_resolver() {
    let catalog = StationCatalog::new();
    let stations = catalog
        .get_or_fetch(|| async { decode_stations(STATIONS_JSON.as_bytes()) })
        .await
        .unwrap();
    let nearest = resolve_default(Coordinate::new(37.77, -122.29), stations).unwrap();
    assert_eq!(nearest.station.id, "9414750");
}
