//! End-to-end decoding of complete reports

use super::*;
use crate::models::StationIdentity;
use crate::stations::StationRegistry;

#[test]
fn test_land_report() {
    let config = test_config(ReportKind::Land);
    let (outcome, ctx) = decode_with(
        &config,
        &land_block(),
        "12345 12004 80000 10102 21056 30112 40122 50203 333 10110 20045",
    );
    let obs = success(outcome);

    assert_eq!(obs.station.id(), 12345);
    assert_eq!(obs.station.name(), "TESTSTN");
    assert_eq!(obs.station.position(), (60.0, 25.0));
    assert_eq!(obs.visibility, Some(400.0));
    assert_eq!(obs.cloud_base_height, Some(0.0));
    assert_eq!(obs.total_cloud_cover, Some(8));
    assert_eq!(obs.wind_direction, Some(0));
    assert_close(obs.wind_speed, 0.0);
    assert_close(obs.temperature, 10.2);
    assert_close(obs.dew_point, -5.6);
    assert_close(obs.pressure, 1012.2);
    assert_eq!(obs.pressure_tendency, Some(0));
    assert_close(obs.pressure_change, 20.3);
    assert_close(obs.max_temperature, 11.0);
    assert_close(obs.min_temperature, 4.5);
    assert_eq!(obs.precipitation, None);
    assert!(ctx.unresolved.is_empty());
}

#[test]
fn test_land_report_sample_lacks_wind_group() {
    // Same groups as test_land_report minus its 80000 wind group: nothing
    // separates iihVV from 10102, so 10102 fills the Nddff slot and no
    // temperature group remains.
    let config = test_config(ReportKind::Land);
    let (outcome, _) = decode_with(
        &config,
        &land_block(),
        "12345 12004 10102 21056 30112 40122 50203 333 10110 20045",
    );
    let obs = success(outcome);

    assert_eq!(obs.total_cloud_cover, Some(1));
    assert_eq!(obs.wind_direction, Some(10));
    assert_close(obs.wind_speed, 2.0);
    assert_eq!(obs.temperature, None);
    assert_close(obs.dew_point, -5.6);
    assert_close(obs.pressure, 1012.2);
    assert_close(obs.max_temperature, 11.0);
}

#[test]
fn test_ship_report() {
    let obs = success(decode_ship(
        "SHIPNAME 18121 99453 70120 46/// /1010 10150 40130 7022/ 22200 00120",
    ));

    assert!(matches!(obs.station, StationIdentity::Mobile(_)));
    assert_eq!(obs.station.name(), "SHIPNAME");
    let (lat, lon) = obs.station.position();
    assert_close(Some(lat), 45.3);
    assert_close(Some(lon), -12.0);
    assert_eq!(obs.total_cloud_cover, None);
    assert_eq!(obs.wind_direction, Some(100));
    assert_close(obs.wind_speed, 10.0);
    assert_close(obs.temperature, 15.0);
    assert_close(obs.pressure, 1013.0);
    assert_eq!(obs.present_weather, Some(2));
    assert_eq!(obs.past_weather_1, Some(2));
    assert_eq!(obs.past_weather_2, None);
    assert_close(obs.sea_surface_temperature, 12.0);
}

#[test]
fn test_same_ship_keeps_its_id() {
    let config = test_config(ReportKind::Ship);
    let resolver = MockStationResolver::new();
    let decoder = ReportDecoder::new(&config, &resolver);
    let block = BlockContext::new(ReportKind::Ship);
    let mut ctx = DecodeContext::new();

    let first = decoder.decode("ALPHA 18121 99453 70120 46/// /1010", &block, &mut ctx);
    let second = decoder.decode("BRAVO 18121 99453 70120 46/// /1010", &block, &mut ctx);
    let third = decoder.decode("ALPHA 18091 99450 70121 46/// /1010", &block, &mut ctx);

    let id = |outcome: &ReportOutcome| outcome.observation().map(|obs| obs.station.id());
    assert_eq!(id(&first), id(&third));
    assert_ne!(id(&first), id(&second));
    assert_eq!(ctx.ships.len(), 2);
}

#[test]
fn test_decoding_is_idempotent() {
    let config = test_config(ReportKind::Land);
    let resolver = MockStationResolver::new();
    let decoder = ReportDecoder::new(&config, &resolver);
    let block = land_block();
    let instance = "12345 12004 80000 10102 21056 30112 40122 50203 333 10110 20045";

    let mut ctx = DecodeContext::new();
    let first = decoder.decode(instance, &block, &mut ctx);
    let second = decoder.decode(instance, &block, &mut ctx);
    assert_eq!(first, second);
}

#[test]
fn test_all_outcomes() {
    assert!(matches!(
        decode_land("12345 12004 80000 10102"),
        ReportOutcome::Success(_)
    ));
    assert!(matches!(decode_land("12345 NIL"), ReportOutcome::Empty(_)));
    assert!(matches!(
        decode_land("99999 12004 80000"),
        ReportOutcome::Ignorable { .. }
    ));
    assert!(matches!(
        decode_land("12345 12004 80099"),
        ReportOutcome::Malformed { .. }
    ));
}

#[test]
fn test_correction_carried_to_observation() {
    let config = test_config(ReportKind::Land);
    let block = land_block().with_correction("CCA");
    let (outcome, _) = decode_with(&config, &block, "12345 12004 80000");
    assert_eq!(success(outcome).correction.as_deref(), Some("CCA"));
}

#[test]
fn test_decode_with_station_registry() {
    let config = test_config(ReportKind::Land);
    let registry: StationRegistry = [Station::new(1001, "JAN MAYEN", 70.94, -8.67)]
        .into_iter()
        .collect();
    let decoder = ReportDecoder::new(&config, &registry);
    let mut ctx = DecodeContext::new();

    let outcome = decoder.decode("01001 12004 80000", &land_block(), &mut ctx);
    assert_eq!(success(outcome).station.name(), "JAN MAYEN");

    let outcome = decoder.decode("12345 12004 80000", &land_block(), &mut ctx);
    assert!(matches!(outcome, ReportOutcome::Ignorable { .. }));
    assert!(ctx.unresolved.contains(&12345));
}
