//! Tests for concurrent file decoding

use super::*;
use crate::constants::SYNTHETIC_ID_BASE;
use crate::processor::BatchProcessor;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_decode_files_in_input_order() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first.txt");
    let second = temp_dir.path().join("second.txt");
    fs::write(&first, LAND_BULLETIN).unwrap();
    fs::write(&second, "AAXX 18091\n12345 12004 80000=\n").unwrap();

    let processor = BatchProcessor::new(test_config(ReportKind::Land), create_test_registry());
    let result = processor.decode_files(&[first, second]).await;

    assert_eq!(result.stats.files_processed, 2);
    assert_eq!(result.stats.files_failed, 0);
    assert_eq!(result.observations.len(), 3);
    assert_eq!(
        result.observations[2].time,
        Utc.with_ymd_and_hms(2024, 3, 18, 9, 0, 0).unwrap()
    );
    assert!(result.unresolved_stations.contains(&99999));
}

#[tokio::test]
async fn test_ship_ids_reconciled_across_files() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first.txt");
    let second = temp_dir.path().join("second.txt");
    fs::write(&first, ship_bulletin(&["ALPHA"])).unwrap();
    fs::write(&second, ship_bulletin(&["BRAVO", "ALPHA"])).unwrap();

    let processor = BatchProcessor::new(test_config(ReportKind::Ship), create_test_registry());
    let result = processor.decode_files(&[first, second]).await;

    let ids: Vec<(String, u32)> = result
        .observations
        .iter()
        .map(|o| (o.station.name().to_string(), o.station.id()))
        .collect();
    assert_eq!(
        ids,
        vec![
            ("ALPHA".to_string(), SYNTHETIC_ID_BASE),
            ("BRAVO".to_string(), SYNTHETIC_ID_BASE + 1),
            ("ALPHA".to_string(), SYNTHETIC_ID_BASE),
        ]
    );
}

#[tokio::test]
async fn test_unreadable_file_counted_as_failed() {
    let temp_dir = TempDir::new().unwrap();
    let good = temp_dir.path().join("good.txt");
    fs::write(&good, LAND_BULLETIN).unwrap();
    let missing = temp_dir.path().join("missing.txt");

    let processor = BatchProcessor::new(test_config(ReportKind::Land), create_test_registry());
    let result = processor.decode_files(&[missing, good]).await;

    assert_eq!(result.stats.files_processed, 1);
    assert_eq!(result.stats.files_failed, 1);
    assert_eq!(result.observations.len(), 2);
}

#[tokio::test]
async fn test_no_files() {
    let processor = BatchProcessor::new(test_config(ReportKind::Land), create_test_registry());
    let result = processor.decode_files(&[]).await;
    assert!(result.observations.is_empty());
    assert_eq!(result.stats, Default::default());
}

#[test]
fn test_reference_time_fixed_at_construction() {
    let processor = BatchProcessor::new(
        DecoderConfig::for_kind(ReportKind::Land),
        create_test_registry(),
    );
    assert!(processor.config().reference_time.is_some());
}
