//! Process-lifetime station catalog cache.
//!
//! The NOAA catalog holds a few thousand stations and never changes while the
//! program runs, so it is fetched at most once. [`StationCatalog`] is owned by
//! the caller and handed to whoever needs it; there is no global.
//!
//! Concurrent first callers share one in-flight fetch and all receive its
//! result. A failed fetch leaves the catalog empty so a later call can retry.
//! A successful one is kept until the catalog is dropped, with no expiry.

use crate::Station;
use log::info;
use std::future::Future;
use tokio::sync::OnceCell;

/// Memoized station list.
#[derive(Debug, Default)]
pub struct StationCatalog {
    stations: OnceCell<Vec<Station>>,
}

impl StationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog that is already populated, mostly for tests and offline use.
    pub fn with_stations(stations: Vec<Station>) -> Self {
        Self {
            stations: OnceCell::new_with(Some(stations)),
        }
    }

    /// Return the cached stations, running `fetch` only if none are cached yet.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<&[Station], E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Station>, E>>,
    {
        let stations = self
            .stations
            .get_or_try_init(|| async move {
                let fetched = fetch().await;
                if let Ok(stations) = &fetched {
                    info!("Cached {} stations", stations.len());
                }
                fetched
            })
            .await?;
        Ok(stations.as_slice())
    }

    /// Cached stations, if a fetch has completed.
    pub fn get(&self) -> Option<&[Station]> {
        self.stations.get().map(Vec::as_slice)
    }

    pub fn is_loaded(&self) -> bool {
        self.stations.initialized()
    }
}
