//! Tests for text and file batch decoding
//!
//! Uses small bulletins in the layout of GTS messages and temporary files.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use crate::config::DecoderConfig;
use crate::models::{ReportKind, Station};
use crate::stations::StationRegistry;

// Test modules
mod batch_tests;

/// Fixed "now" for batch tests: 2024-03-18 13:00 UTC
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 18, 13, 0, 0).unwrap()
}

pub fn test_config(kind: ReportKind) -> DecoderConfig {
    DecoderConfig::for_kind(kind)
        .with_reference_time(reference_time())
        .with_max_concurrent_files(2)
}

/// Helper to create a test station registry
pub fn create_test_registry() -> Arc<StationRegistry> {
    Arc::new(
        [
            Station::new(12345, "TESTSTN", 60.0, 25.0),
            Station::new(1001, "JAN MAYEN", 70.94, -8.67),
        ]
        .into_iter()
        .collect(),
    )
}

/// Land bulletin with one report of every outcome
pub const LAND_BULLETIN: &str = "SMXX01 EGRR 181200 RRA
AAXX 18121
12345 12004 80000 10102 21056 30112 40122 50203 333 10110 20045=
99999 12004 80000=
01001 NIL=
12345 12004 80099=
";

/// Ship bulletin with two ships
pub fn ship_bulletin(names: &[&str]) -> String {
    let mut text = String::from("SMVD01 KWBC 181200\nBBXX\n");
    for name in names {
        text.push_str(&format!("{} 18121 99453 70120 46/// /1010 10150=\n", name));
    }
    text
}
