//! # NOAA Tide Data Fetching
//!
//! This module handles all network operations against NOAA's CO-OPS APIs. It is
//! a thin collaborator: it downloads the station catalog and the hi/lo
//! predictions for one station, and hands raw rows to [`TideSeries::from_raw`].
//!
//! ## Data Sources
//!
//! ### Station catalog (metadata API)
//! - **URL**: `https://api.tidesandcurrents.noaa.gov/mdapi/prod/webapi/stations.json`
//! - **Query**: `type=waterlevels&units=english`
//! - **Format**: `{"stations": [{"id": "9414290", "name": "San Francisco", "lat": 37.8, "lng": -122.4}]}`
//!
//! ### Predictions (data API)
//! - **URL**: `https://api.tidesandcurrents.noaa.gov/api/prod/datagetter`
//! - **Query**: `product=predictions&interval=hilo&format=json`, a two-day window
//!   starting on the date of "now" in the configured offset
//! - **Format**: `{"predictions": [{"t": "2025-01-19 04:12", "v": "5.612", "type": "H"}]}`
//!   or `{"error": {"message": "..."}}` with a 200 status
//!
//! ## Error Handling
//!
//! The module reports every failure through [`TideError`]:
//! - **Network failures**: connection, timeout and non-2xx responses
//! - **Provider errors**: NOAA's JSON error payload, surfaced with its message
//! - **Malformed payloads**: JSON that does not match the expected shape
//!
//! The core never sees these errors. The binary fails on a catalog error and
//! shows an empty chart when predictions cannot be fetched.

use crate::config::ApiConfig;
use crate::series::{RawTidePoint, TideSeries};
use crate::{Coordinate, Station};
use chrono::{DateTime, Days, FixedOffset};
use log::{debug, info};
use serde::Deserialize;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching data or reading configuration.
///
/// Each variant keeps the underlying error for debugging while presenting a
/// single type to callers.
#[derive(Error, Debug)]
pub enum TideError {
    /// HTTP request failed (network, server, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// NOAA answered with an error payload
    #[error("NOAA API error: {0}")]
    Api(String),

    /// Response body did not match the expected JSON shape
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Config file could not be parsed
    #[error("config parse: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Saved location is not a finite coordinate within ±90/±180
    #[error("invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    /// Config could not be serialized
    #[error("config write: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// File operations failed
    #[error("IO: {0}")]
    Io(#[from] io::Error),
}

/// Request timeout for both endpoints
const TIMEOUT: Duration = Duration::from_secs(30);

/// Date layout for `begin_date` / `end_date`
const QUERY_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Deserialize)]
struct StationsResponse {
    #[serde(default)]
    stations: Vec<NoaaStation>,
}

#[derive(Deserialize)]
struct NoaaStation {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    lat: Option<f64>,
    lng: Option<f64>,
}

impl From<NoaaStation> for Station {
    fn from(s: NoaaStation) -> Self {
        // A missing lat or lng becomes the (0, 0) placeholder the resolver skips
        let coordinate = match (s.lat, s.lng) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng),
            _ => Coordinate::new(0.0, 0.0),
        };
        Station {
            id: s.id,
            name: s.name,
            coordinate,
        }
    }
}

#[derive(Deserialize)]
struct PredictionsResponse {
    predictions: Option<Vec<RawTidePoint>>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Decode the metadata API's station list.
pub fn decode_stations(body: &[u8]) -> Result<Vec<Station>, TideError> {
    let response: StationsResponse = serde_json::from_slice(body)?;
    Ok(response.stations.into_iter().map(Station::from).collect())
}

/// Decode the data API's prediction rows, turning NOAA error payloads into [`TideError::Api`].
pub fn decode_predictions(body: &[u8]) -> Result<Vec<RawTidePoint>, TideError> {
    let response: PredictionsResponse = serde_json::from_slice(body)?;
    match (response.predictions, response.error) {
        (Some(points), _) => Ok(points),
        (None, Some(error)) => Err(TideError::Api(error.message)),
        (None, None) => Err(TideError::Api("response has no predictions".to_string())),
    }
}

/// Query parameters for a hi/lo predictions request.
///
/// The window covers the calendar date of `now` and the following day.
pub fn prediction_query(
    config: &ApiConfig,
    station_id: &str,
    now: &DateTime<FixedOffset>,
) -> Vec<(&'static str, String)> {
    let today = now.date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);

    vec![
        ("product", "predictions".to_string()),
        ("application", config.application.clone()),
        ("begin_date", today.format(QUERY_DATE_FORMAT).to_string()),
        ("end_date", tomorrow.format(QUERY_DATE_FORMAT).to_string()),
        ("datum", config.datum.clone()),
        ("station", station_id.to_string()),
        ("time_zone", config.time_zone.clone()),
        ("units", config.units.clone()),
        ("interval", "hilo".to_string()),
        ("format", "json".to_string()),
    ]
}

/// HTTP client for the NOAA CO-OPS APIs.
pub struct NoaaClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl NoaaClient {
    pub fn new(config: ApiConfig) -> Result<Self, TideError> {
        let http = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("tide-times/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Download the full water-level station catalog.
    ///
    /// Pass this to [`crate::catalog::StationCatalog::get_or_fetch`] so it only
    /// runs once per process.
    pub async fn fetch_stations(&self) -> Result<Vec<Station>, TideError> {
        info!("Fetching stations from {}", self.config.stations_url);
        let body = self
            .http
            .get(&self.config.stations_url)
            .query(&[("type", "waterlevels"), ("units", "english")])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let stations = decode_stations(&body)?;
        info!("Found {} total stations", stations.len());
        Ok(stations)
    }

    /// Download hi/lo prediction rows for one station.
    pub async fn fetch_predictions(
        &self,
        station_id: &str,
        now: &DateTime<FixedOffset>,
    ) -> Result<Vec<RawTidePoint>, TideError> {
        let query = prediction_query(&self.config, station_id, now);
        debug!("Requesting predictions {:?}", query);

        let body = self
            .http
            .get(&self.config.data_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let points = decode_predictions(&body)?;
        debug!("Received {} prediction rows for {}", points.len(), station_id);
        Ok(points)
    }

    /// Fetch and parse predictions into a [`TideSeries`].
    pub async fn fetch_series(
        &self,
        station: &Station,
        now: &DateTime<FixedOffset>,
    ) -> Result<TideSeries, TideError> {
        info!("Using station: {} - {}", station.id, station.name);
        let points = self.fetch_predictions(&station.id, now).await?;
        Ok(TideSeries::from_raw(
            points,
            self.config.offset(),
            self.config.height_policy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decode_stations() {
        let body = br#"{
            "count": 3,
            "units": null,
            "stations": [
                {"tidal": true, "id": "9414290", "name": "San Francisco", "lat": 37.806305, "lng": -122.465904},
                {"id": "8518750", "name": "The Battery", "lat": 40.7012, "lng": -74.0137, "state": "NY"},
                {"id": "9999999", "name": "Unplaced", "lat": null}
            ]
        }"#;
        let stations = decode_stations(body).unwrap();

        assert_eq!(stations.len(), 3);
        assert_eq!(stations[0].id, "9414290");
        assert_eq!(stations[1].coordinate, Coordinate::new(40.7012, -74.0137));
        assert!(stations[2].coordinate.is_placeholder());
    }

    #[test]
    fn test_half_missing_position_is_placeholder() {
        let body = br#"{"stations": [
            {"id": "9410170", "name": "San Diego", "lat": 32.71},
            {"id": "9410230", "name": "La Jolla", "lat": null, "lng": -117.26}
        ]}"#;
        let stations = decode_stations(body).unwrap();
        assert!(stations.iter().all(|s| s.coordinate.is_placeholder()));

        let target = Coordinate::new(32.71, 0.1);
        assert!(crate::stations::resolve_default(target, &stations).is_err());
    }

    #[test]
    fn test_decode_predictions() {
        let body = br#"{"predictions": [
            {"t": "2025-01-19 04:12", "v": "5.612", "type": "H"},
            {"t": "2025-01-19 10:05", "v": "-0.218", "type": "L"}
        ]}"#;
        let points = decode_predictions(body).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], RawTidePoint::new("2025-01-19 10:05", "-0.218", Some("L")));
    }

    #[test]
    fn test_decode_error_payload() {
        let body = br#"{"error": {"message": "No Predictions data was found. Please make sure the Datum input is valid."}}"#;
        match decode_predictions(body) {
            Err(TideError::Api(message)) => assert!(message.starts_with("No Predictions")),
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_predictions(b"<html>maintenance</html>"),
            Err(TideError::Decode(_))
        ));
        assert!(matches!(decode_predictions(b"{}"), Err(TideError::Api(_))));
    }

    #[test]
    fn test_prediction_query_window() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        // 02:30 UTC on Jan 1 is still Dec 31 at UTC-5
        let now = chrono::Utc
            .with_ymd_and_hms(2025, 1, 1, 2, 30, 0)
            .unwrap()
            .with_timezone(&offset);
        let query = prediction_query(&ApiConfig::default(), "8443970", &now);
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };

        assert_eq!(get("begin_date"), "20241231");
        assert_eq!(get("end_date"), "20250101");
        assert_eq!(get("station"), "8443970");
        assert_eq!(get("interval"), "hilo");
        assert_eq!(get("datum"), "MLLW");
        assert_eq!(get("time_zone"), "gmt");
    }

    #[test]
    fn test_client_builds() {
        let client = NoaaClient::new(ApiConfig::default()).unwrap();
        assert_eq!(client.config().units, "english");
    }
}
