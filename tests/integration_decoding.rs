//! Integration tests decoding bulletin files from tests/data
//!
//! Runs input discovery, station loading and the concurrent batch
//! processor the way the `synop` binary does.

use chrono::{DateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use synop_decoder::processor::discovery::discover_inputs;
use synop_decoder::{
    BatchProcessor, BatchResult, DecoderConfig, ReportKind, StationRegistry, StationResolver,
};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 18, 13, 0, 0).unwrap()
}

async fn decode(kind: ReportKind, pattern: &str) -> BatchResult {
    let files = discover_inputs(&[data_dir()], Some(pattern)).unwrap();
    assert!(!files.is_empty(), "no test files match {}", pattern);

    let registry = StationRegistry::from_csv(&data_dir().join("stations.csv")).unwrap();
    let resolver: Arc<dyn StationResolver> = Arc::new(registry);
    let config = DecoderConfig::for_kind(kind).with_reference_time(reference_time());

    BatchProcessor::new(config, resolver)
        .decode_files(&files)
        .await
}

fn approx(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|v| (v - expected).abs() < 1e-6)
}

#[tokio::test]
async fn test_decode_land_bulletin() {
    let result = decode(ReportKind::Land, "synop_*.txt").await;
    let stats = &result.stats;

    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.blocks, 2);
    assert_eq!(stats.instances, 6);
    assert_eq!(stats.decoded, 3);
    assert_eq!(stats.empty, 1);
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.malformed, 1);
    assert_eq!(result.observations.len(), 4);
    assert_eq!(result.unresolved_stations.iter().copied().collect::<Vec<_>>(), vec![99999]);

    let heathrow = &result.observations[1];
    assert_eq!(heathrow.station.name(), "LONDON HEATHROW");
    assert!(approx(heathrow.precipitation, 0.0));
    assert!(approx(heathrow.pressure, 1015.5));
    assert_eq!(heathrow.low_cloud_cover, Some(2));
    assert_eq!(heathrow.present_weather, Some(25));
    assert!(approx(heathrow.wind_gust, 15.0));

    // second block reports knots and carries a correction
    let corrected = &result.observations[3];
    assert_eq!(corrected.correction.as_deref(), Some("CCA"));
    assert!(approx(corrected.wind_speed, 15.0 * 0.514444));
    assert!(approx(corrected.wind_gust, 20.0 * 0.514444));
}

#[tokio::test]
async fn test_decode_ship_bulletin() {
    let result = decode(ReportKind::Ship, "ship.txt").await;

    assert_eq!(result.stats.instances, 3);
    assert_eq!(result.stats.decoded, 2);
    assert_eq!(result.stats.ignored, 1);

    let ship = &result.observations[1];
    assert_eq!(ship.station.name(), "WDE1234");
    let (latitude, longitude) = ship.station.position();
    assert!(approx(Some(latitude), -10.1));
    assert!(approx(Some(longitude), -120.0));
    assert!(approx(ship.sea_surface_temperature, 27.5));
    assert!(approx(ship.pressure_change, -1.0));
}

#[tokio::test]
async fn test_decode_buoy_bulletin() {
    let result = decode(ReportKind::Buoy, "buoy.txt").await;

    assert_eq!(result.stats.blocks, 2);
    assert_eq!(result.stats.decoded, 1);
    assert_eq!(result.stats.empty, 1);
    assert_eq!(result.observations[0].station.id(), 62001);
    assert!(approx(result.observations[0].sea_surface_temperature, 12.0));
}

#[tokio::test]
async fn test_decode_all_files_for_one_kind() {
    // other kinds' files contain no land blocks
    let result = decode(ReportKind::Land, "*.txt").await;
    assert_eq!(result.stats.files_processed, 3);
    assert_eq!(result.observations.len(), 4);
}
