//! Test utilities for the report decoder
//!
//! Provides a mock station resolver, a fixed reference time and helpers
//! that decode a single report instance.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;

use super::{BlockContext, BlockHeader, ReportDecoder};
use crate::config::DecoderConfig;
use crate::context::DecodeContext;
use crate::models::{Observation, ReportKind, ReportOutcome, Station, WindUnit};
use crate::stations::StationResolver;

// Test modules
mod buoy_tests;
mod scenario_tests;

/// Mock station resolver for testing
#[derive(Debug, Clone)]
pub struct MockStationResolver {
    stations: HashMap<u32, Station>,
}

impl Default for MockStationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStationResolver {
    pub fn new() -> Self {
        let mut stations = HashMap::new();
        stations.insert(12345, Station::new(12345, "TESTSTN", 60.0, 25.0));
        stations.insert(1001, Station::new(1001, "JAN MAYEN", 70.94, -8.67));
        Self { stations }
    }
}

impl StationResolver for MockStationResolver {
    fn resolve(&self, id: u32) -> Option<Station> {
        self.stations.get(&id).cloned()
    }
}

/// Fixed "now" used by all decoder tests: 2024-03-18 13:00 UTC
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 18, 13, 0, 0).unwrap()
}

pub fn test_config(kind: ReportKind) -> DecoderConfig {
    DecoderConfig::for_kind(kind).with_reference_time(reference_time())
}

/// Land block context for `18121`: day 18, 12 UTC, wind in m/s
pub fn land_block() -> BlockContext {
    BlockContext::new(ReportKind::Land).with_header(BlockHeader {
        day: 18,
        hour: 12,
        wind_unit: Some(WindUnit::MetresPerSecond),
    })
}

/// Decode one instance with a fresh context
pub fn decode_with(
    config: &DecoderConfig,
    block: &BlockContext,
    instance: &str,
) -> (ReportOutcome, DecodeContext) {
    let resolver = MockStationResolver::new();
    let decoder = ReportDecoder::new(config, &resolver);
    let mut ctx = DecodeContext::new();
    let outcome = decoder.decode(instance, block, &mut ctx);
    (outcome, ctx)
}

pub fn decode_land(instance: &str) -> ReportOutcome {
    decode_with(&test_config(ReportKind::Land), &land_block(), instance).0
}

pub fn decode_ship(instance: &str) -> ReportOutcome {
    let block = BlockContext::new(ReportKind::Ship);
    decode_with(&test_config(ReportKind::Ship), &block, instance).0
}

pub fn decode_buoy(instance: &str) -> ReportOutcome {
    let block = BlockContext::new(ReportKind::Buoy);
    decode_with(&test_config(ReportKind::Buoy), &block, instance).0
}

/// Observation of a successful outcome
pub fn success(outcome: ReportOutcome) -> Observation {
    match outcome {
        ReportOutcome::Success(obs) => obs,
        other => panic!("expected success, got {:?}", other),
    }
}

pub fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.unwrap_or_else(|| panic!("expected {}, got None", expected));
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}
