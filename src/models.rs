//! Core data structures for SYNOP decoding.
//!
//! Defines report kinds, station identities, the decoded observation
//! record and the per-batch result and statistics types.

use crate::constants::{BUOY_MARKER, LAND_MARKER, SHIP_MARKER};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Code forms supported by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReportKind {
    /// FM 12 SYNOP, fixed land stations
    #[default]
    Land,
    /// FM 13 SHIP, ships and other mobile sea stations
    Ship,
    /// FM 18 BUOY, drifting and moored buoys
    Buoy,
}

impl ReportKind {
    /// Block marker that introduces reports of this kind
    pub fn marker(&self) -> &'static str {
        match self {
            ReportKind::Land => LAND_MARKER,
            ReportKind::Ship => SHIP_MARKER,
            ReportKind::Buoy => BUOY_MARKER,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Land => write!(f, "land"),
            ReportKind::Ship => write!(f, "ship"),
            ReportKind::Buoy => write!(f, "buoy"),
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "land" | "synop" | "aaxx" => Ok(ReportKind::Land),
            "ship" | "bbxx" => Ok(ReportKind::Ship),
            "buoy" | "zzyy" => Ok(ReportKind::Buoy),
            other => Err(format!("unknown report kind '{}'", other)),
        }
    }
}

/// Unit in which wind speeds are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindUnit {
    MetresPerSecond,
    Knots,
}

/// Fixed station known to the station resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Station {
    pub fn new(id: u32, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Ship or buoy whose position comes from the report itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileStation {
    pub id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Who made an observation and where
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StationIdentity {
    Fixed(Station),
    Mobile(MobileStation),
}

impl StationIdentity {
    pub fn id(&self) -> u32 {
        match self {
            StationIdentity::Fixed(s) => s.id,
            StationIdentity::Mobile(s) => s.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StationIdentity::Fixed(s) => &s.name,
            StationIdentity::Mobile(s) => &s.name,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        match self {
            StationIdentity::Fixed(s) => (s.latitude, s.longitude),
            StationIdentity::Mobile(s) => (s.latitude, s.longitude),
        }
    }
}

/// One decoded report.
///
/// Every measured quantity is `None` when it was not reported, reported as
/// missing, or could not be decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub kind: ReportKind,
    pub time: DateTime<Utc>,
    pub station: StationIdentity,
    /// Correction stamp such as `RRA` when the report revises an earlier one
    pub correction: Option<String>,

    /// Sea level pressure or group 4 pressure (hPa)
    pub pressure: Option<f64>,
    /// Air temperature (°C)
    pub temperature: Option<f64>,
    /// Dew point temperature (°C)
    pub dew_point: Option<f64>,
    /// Relative humidity (%)
    pub relative_humidity: Option<f64>,
    /// Wind direction in degrees, multiple of 10 in [0, 360)
    pub wind_direction: Option<u16>,
    /// Mean wind speed (m/s)
    pub wind_speed: Option<f64>,
    /// Wind gust (m/s)
    pub wind_gust: Option<f64>,
    /// Horizontal visibility (m)
    pub visibility: Option<f64>,
    /// Height of the lowest cloud base (m)
    pub cloud_base_height: Option<f64>,
    /// Cloud cover in okta, 9 for sky obscured
    pub total_cloud_cover: Option<u8>,
    pub low_cloud_cover: Option<u8>,
    pub mid_cloud_cover: Option<u8>,
    pub high_cloud_cover: Option<u8>,
    pub low_cloud_type: Option<u8>,
    pub mid_cloud_type: Option<u8>,
    pub high_cloud_type: Option<u8>,
    /// Characteristic of pressure tendency (code table 0200)
    pub pressure_tendency: Option<u8>,
    /// Pressure change over the last three hours (hPa)
    pub pressure_change: Option<f64>,
    /// Precipitation amount (mm)
    pub precipitation: Option<f64>,
    /// Accumulation period of `precipitation` (hours)
    pub precipitation_period: Option<u8>,
    pub present_weather: Option<u8>,
    pub past_weather_1: Option<u8>,
    pub past_weather_2: Option<u8>,
    /// Maximum temperature (°C)
    pub max_temperature: Option<f64>,
    /// Minimum temperature (°C)
    pub min_temperature: Option<f64>,
    /// Sea surface temperature (°C)
    pub sea_surface_temperature: Option<f64>,
}

impl Observation {
    /// Create an observation with every measured quantity missing
    pub fn new(kind: ReportKind, time: DateTime<Utc>, station: StationIdentity) -> Self {
        Self {
            kind,
            time,
            station,
            correction: None,
            pressure: None,
            temperature: None,
            dew_point: None,
            relative_humidity: None,
            wind_direction: None,
            wind_speed: None,
            wind_gust: None,
            visibility: None,
            cloud_base_height: None,
            total_cloud_cover: None,
            low_cloud_cover: None,
            mid_cloud_cover: None,
            high_cloud_cover: None,
            low_cloud_type: None,
            mid_cloud_type: None,
            high_cloud_type: None,
            pressure_tendency: None,
            pressure_change: None,
            precipitation: None,
            precipitation_period: None,
            present_weather: None,
            past_weather_1: None,
            past_weather_2: None,
            max_temperature: None,
            min_temperature: None,
            sea_surface_temperature: None,
        }
    }

    /// Number of measured quantities that carry a value
    pub fn present_field_count(&self) -> usize {
        let floats = [
            self.pressure,
            self.temperature,
            self.dew_point,
            self.relative_humidity,
            self.wind_speed,
            self.wind_gust,
            self.visibility,
            self.cloud_base_height,
            self.pressure_change,
            self.precipitation,
            self.max_temperature,
            self.min_temperature,
            self.sea_surface_temperature,
        ];
        let codes = [
            self.total_cloud_cover,
            self.low_cloud_cover,
            self.mid_cloud_cover,
            self.high_cloud_cover,
            self.low_cloud_type,
            self.mid_cloud_type,
            self.high_cloud_type,
            self.pressure_tendency,
            self.precipitation_period,
            self.present_weather,
            self.past_weather_1,
            self.past_weather_2,
        ];

        floats.iter().filter(|v| v.is_some()).count()
            + codes.iter().filter(|v| v.is_some()).count()
            + usize::from(self.wind_direction.is_some())
    }
}

/// Result of decoding one report instance
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// Report decoded up to its natural end
    Success(Observation),
    /// Report ended early but validly (`NIL` or a missing section 0); the
    /// fields decoded so far are kept
    Empty(Observation),
    /// Not meteorological content, or a station that cannot be placed
    Ignorable { reason: String },
    /// A mandatory group is absent or structurally invalid
    Malformed { reason: String },
}

impl ReportOutcome {
    /// The observation carried by the outcome, if any
    pub fn observation(&self) -> Option<&Observation> {
        match self {
            ReportOutcome::Success(obs) | ReportOutcome::Empty(obs) => Some(obs),
            _ => None,
        }
    }
}

/// Per-outcome counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    pub blocks: usize,
    pub instances: usize,
    pub decoded: usize,
    pub empty: usize,
    pub ignored: usize,
    pub malformed: usize,
    pub files_processed: usize,
    pub files_failed: usize,
}

impl DecodeStats {
    /// Record the outcome of one instance
    pub fn record(&mut self, outcome: &ReportOutcome) {
        self.instances += 1;
        match outcome {
            ReportOutcome::Success(_) => self.decoded += 1,
            ReportOutcome::Empty(_) => self.empty += 1,
            ReportOutcome::Ignorable { .. } => self.ignored += 1,
            ReportOutcome::Malformed { .. } => self.malformed += 1,
        }
    }

    /// Observations handed to the collector
    pub fn observations(&self) -> usize {
        self.decoded + self.empty
    }

    /// Percentage of instances that yielded an observation
    pub fn success_rate(&self) -> f64 {
        if self.instances == 0 {
            0.0
        } else {
            (self.observations() as f64 / self.instances as f64) * 100.0
        }
    }

    pub fn merge(&mut self, other: &DecodeStats) {
        self.blocks += other.blocks;
        self.instances += other.instances;
        self.decoded += other.decoded;
        self.empty += other.empty;
        self.ignored += other.ignored;
        self.malformed += other.malformed;
        self.files_processed += other.files_processed;
        self.files_failed += other.files_failed;
    }
}

/// Everything decoded from one or more input texts
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub observations: Vec<Observation>,
    /// Land station ids that the resolver did not know
    pub unresolved_stations: BTreeSet<u32>,
    /// One line per malformed report
    pub diagnostics: Vec<String>,
    pub stats: DecodeStats,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another result: observations are concatenated, unresolved ids united
    pub fn merge(&mut self, other: BatchResult) {
        self.observations.extend(other.observations);
        self.unresolved_stations.extend(other.unresolved_stations);
        self.diagnostics.extend(other.diagnostics);
        self.stats.merge(&other.stats);
    }

    /// Rewrite mobile station ids, used after reconciling synthetic ids
    pub fn remap_mobile_ids(&mut self, remap: &HashMap<u32, u32>) {
        if remap.is_empty() {
            return;
        }
        for obs in &mut self.observations {
            if let StationIdentity::Mobile(station) = &mut obs.station {
                if let Some(&new_id) = remap.get(&station.id) {
                    station.id = new_id;
                }
            }
        }
    }

    /// Number of observations per station name, sorted by name
    pub fn observations_per_station(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for obs in &self.observations {
            *counts.entry(obs.station.name()).or_default() += 1;
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, n)| (name.to_string(), n))
            .collect();
        counts.sort();
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_observation(name: &str, id: u32) -> Observation {
        let time = Utc.with_ymd_and_hms(2024, 3, 18, 12, 0, 0).unwrap();
        Observation::new(
            ReportKind::Ship,
            time,
            StationIdentity::Mobile(MobileStation {
                id,
                name: name.to_string(),
                latitude: 45.3,
                longitude: -12.0,
            }),
        )
    }

    #[test]
    fn test_report_kind_from_str() {
        assert_eq!("land".parse::<ReportKind>().unwrap(), ReportKind::Land);
        assert_eq!("BBXX".parse::<ReportKind>().unwrap(), ReportKind::Ship);
        assert_eq!("Buoy".parse::<ReportKind>().unwrap(), ReportKind::Buoy);
        assert!("metar".parse::<ReportKind>().is_err());
        assert_eq!(ReportKind::Buoy.marker(), "ZZYY");
    }

    #[test]
    fn test_new_observation_is_all_missing() {
        let obs = sample_observation("SHIP", 1);
        assert_eq!(obs.present_field_count(), 0);
        assert!(obs.correction.is_none());
    }

    #[test]
    fn test_stats_record_and_rate() {
        let mut stats = DecodeStats::default();
        let obs = sample_observation("A", 1);
        stats.record(&ReportOutcome::Success(obs.clone()));
        stats.record(&ReportOutcome::Empty(obs));
        stats.record(&ReportOutcome::Malformed {
            reason: "x".to_string(),
        });
        stats.record(&ReportOutcome::Ignorable {
            reason: "y".to_string(),
        });

        assert_eq!(stats.instances, 4);
        assert_eq!(stats.observations(), 2);
        assert_eq!(stats.success_rate(), 50.0);
    }

    #[test]
    fn test_batch_merge_unions_unresolved() {
        let mut a = BatchResult::new();
        a.unresolved_stations.insert(1001);
        a.observations.push(sample_observation("A", 1));

        let mut b = BatchResult::new();
        b.unresolved_stations.insert(1001);
        b.unresolved_stations.insert(2002);
        b.observations.push(sample_observation("B", 2));

        a.merge(b);
        assert_eq!(a.observations.len(), 2);
        assert_eq!(a.unresolved_stations.len(), 2);
    }

    #[test]
    fn test_remap_mobile_ids() {
        let mut result = BatchResult::new();
        result.observations.push(sample_observation("A", 1_000_000));
        let remap = HashMap::from([(1_000_000, 1_000_005)]);
        result.remap_mobile_ids(&remap);
        assert_eq!(result.observations[0].station.id(), 1_000_005);
    }

    #[test]
    fn test_observations_per_station() {
        let mut result = BatchResult::new();
        result.observations.push(sample_observation("B", 2));
        result.observations.push(sample_observation("A", 1));
        result.observations.push(sample_observation("B", 2));
        assert_eq!(
            result.observations_per_station(),
            vec![("A".to_string(), 1), ("B".to_string(), 2)]
        );
    }
}
