//! Station resolution for land reports
//!
//! Land reports only carry a numeric WMO station id. The decoder asks a
//! `StationResolver` for the station name and position; ids it does not
//! know are collected, never treated as fatal.

use crate::error::{Result, SynopError};
use crate::models::Station;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Maps a numeric station id to a known fixed station
pub trait StationResolver: Send + Sync {
    fn resolve(&self, id: u32) -> Option<Station>;
}

/// In-memory station list indexed by id for O(1) lookups
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    stations: HashMap<u32, Station>,
}

impl StationRegistry {
    /// Create a new empty station registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a station
    pub fn insert(&mut self, station: Station) {
        self.stations.insert(station.id, station);
    }

    /// Get station metadata by id
    pub fn get_station(&self, id: u32) -> Option<&Station> {
        self.stations.get(&id)
    }

    /// Get the total number of stations in the registry
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Load stations from a CSV file with `id,name,latitude,longitude` columns.
    ///
    /// Rows with a missing value or an out-of-range position are skipped
    /// with a warning.
    pub fn from_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SynopError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        let column = |name: &str, dtype: DataType| -> Result<Series> {
            df.column(name)
                .and_then(|c| c.as_materialized_series().cast(&dtype))
                .map_err(|e| SynopError::StationFile {
                    path: path.to_path_buf(),
                    reason: format!("column '{}': {}", name, e),
                })
        };

        let ids = column("id", DataType::Int64)?;
        let names = column("name", DataType::String)?;
        let latitudes = column("latitude", DataType::Float64)?;
        let longitudes = column("longitude", DataType::Float64)?;

        let ids = ids.i64()?;
        let names = names.str()?;
        let latitudes = latitudes.f64()?;
        let longitudes = longitudes.f64()?;

        let mut registry = Self::new();
        for row in 0..df.height() {
            let (Some(id), Some(name), Some(lat), Some(lon)) = (
                ids.get(row),
                names.get(row),
                latitudes.get(row),
                longitudes.get(row),
            ) else {
                warn!("Skipping incomplete station row {} in {}", row + 1, path.display());
                continue;
            };

            let Ok(id) = u32::try_from(id) else {
                warn!("Skipping station with invalid id {}", id);
                continue;
            };
            if lat.abs() > 90.0 || lon.abs() > 180.0 {
                warn!("Skipping station {} with invalid position {},{}", id, lat, lon);
                continue;
            }

            registry.insert(Station::new(id, name.trim(), lat, lon));
        }

        debug!(
            "Loaded {} stations from {}",
            registry.station_count(),
            path.display()
        );
        Ok(registry)
    }
}

impl StationResolver for StationRegistry {
    fn resolve(&self, id: u32) -> Option<Station> {
        self.stations.get(&id).cloned()
    }
}

impl FromIterator<Station> for StationRegistry {
    fn from_iter<I: IntoIterator<Item = Station>>(iter: I) -> Self {
        let mut registry = Self::new();
        for station in iter {
            registry.insert(station);
        }
        registry
    }
}
