//! Tests for buoy headers and sections

use super::*;
use crate::models::StationIdentity;

const BUOY: &str = "62001 18034 1130/ 745300 012000 6112/ 11100 01010 10150 29085 40130 22200 00120";

#[test]
fn test_buoy_report() {
    let obs = success(decode_buoy(BUOY));

    match &obs.station {
        StationIdentity::Mobile(buoy) => {
            assert_eq!(buoy.id, 62001);
            assert_eq!(buoy.name, "62001");
            assert_close(Some(buoy.latitude), 45.3);
            assert_close(Some(buoy.longitude), -12.0);
        }
        other => panic!("expected mobile station, got {:?}", other),
    }
    assert_eq!(obs.time, Utc.with_ymd_and_hms(2024, 3, 18, 11, 30, 0).unwrap());
    assert_eq!(obs.kind, ReportKind::Buoy);

    assert_eq!(obs.wind_direction, Some(100));
    assert_close(obs.wind_speed, 10.0);
    assert_close(obs.temperature, 15.0);
    assert_eq!(obs.relative_humidity, Some(85.0));
    assert_close(obs.pressure, 1013.0);
    assert_close(obs.sea_surface_temperature, 12.0);
}

#[test]
fn test_buoy_without_sections_is_empty() {
    match decode_buoy("62001 18034 1130/ 745300 012000") {
        ReportOutcome::Empty(obs) => {
            assert_eq!(obs.present_field_count(), 0);
            assert_eq!(obs.station.id(), 62001);
        }
        other => panic!("expected empty, got {:?}", other),
    }
}

#[test]
fn test_buoy_sea_section_only() {
    let obs = success(decode_buoy("62001 18034 1130/ 745300 012000 22200 01005"));
    assert_close(obs.sea_surface_temperature, -0.5);
    assert_eq!(obs.temperature, None);
}

#[test]
fn test_buoy_section_stops_at_sea_marker() {
    // only wind and temperature before the 222 marker
    let obs = success(decode_buoy(
        "62001 18034 1130/ 745300 012000 11100 01010 10150 22200 00120",
    ));
    assert_eq!(obs.dew_point, None);
    assert_close(obs.sea_surface_temperature, 12.0);
}

#[test]
fn test_buoy_later_sections_ignored() {
    let obs = success(decode_buoy(
        "62001 18034 1130/ 745300 012000 11100 10150 33300 40999",
    ));
    assert_close(obs.temperature, 15.0);
    assert_eq!(obs.pressure, None);
}

#[test]
fn test_buoy_nil_after_later_section_is_empty() {
    match decode_buoy("62001 18034 1130/ 745300 012000 11100 10150 333 NIL") {
        ReportOutcome::Empty(obs) => assert_close(obs.temperature, 15.0),
        other => panic!("expected empty, got {:?}", other),
    }
}

#[test]
fn test_buoy_position_precision() {
    let obs = success(decode_buoy("62001 18034 1130/ 14530/ 01200/ 11100 10150"));
    let (lat, lon) = obs.station.position();
    assert_close(Some(lat), 45.3);
    assert_close(Some(lon), 12.0);

    let obs = success(decode_buoy("62001 18034 1130/ 545/// 012/// 11100 10150"));
    let (lat, lon) = obs.station.position();
    assert_close(Some(lat), -45.0);
    assert_close(Some(lon), -12.0);
}

#[test]
fn test_buoy_extended_wind_in_knots() {
    let obs = success(decode_buoy(
        "62001 18034 11304 745300 012000 11100 02099 00110",
    ));
    assert_eq!(obs.wind_direction, Some(200));
    assert_close(obs.wind_speed, 110.0 * 0.514444);
}

#[test]
fn test_buoy_text_id_gets_synthetic_id() {
    let config = test_config(ReportKind::Buoy);
    let block = BlockContext::new(ReportKind::Buoy);
    let (outcome, ctx) = decode_with(
        &config,
        &block,
        "WXBUOY 18034 1130/ 745300 012000 11100 10150",
    );
    let obs = success(outcome);
    assert_eq!(obs.station.id(), crate::constants::SYNTHETIC_ID_BASE);
    assert_eq!(ctx.ships.get("WXBUOY"), Some(crate::constants::SYNTHETIC_ID_BASE));
}

#[test]
fn test_buoy_header_errors() {
    // month 13
    assert!(matches!(
        decode_buoy("62001 18134 1130/ 745300 012000 11100 10150"),
        ReportOutcome::Malformed { .. }
    ));
    // quadrant 2
    assert!(matches!(
        decode_buoy("62001 18034 1130/ 245300 012000 11100 10150"),
        ReportOutcome::Malformed { .. }
    ));
    // five character position groups
    assert!(matches!(
        decode_buoy("62001 18034 1130/ 74530 01200 11100 10150"),
        ReportOutcome::Malformed { .. }
    ));
    // truncated header
    assert!(matches!(
        decode_buoy("62001 18034 1130/"),
        ReportOutcome::Malformed { .. }
    ));
}
