//! Code tables and constants for SYNOP, SHIP and BUOY decoding
//!
//! Values follow the WMO FM 12 / FM 13 / FM 18 code forms.

// =============================================================================
// Block and Section Markers
// =============================================================================

/// Block marker introducing land station reports (FM 12)
pub const LAND_MARKER: &str = "AAXX";

/// Block marker introducing ship reports (FM 13)
pub const SHIP_MARKER: &str = "BBXX";

/// Block marker introducing buoy reports (FM 18)
pub const BUOY_MARKER: &str = "ZZYY";

/// Report instance terminator
pub const INSTANCE_TERMINATOR: char = '=';

/// Literal marking a report without content
pub const NIL_TOKEN: &str = "nil";

/// Section markers
pub mod sections {
    /// Section 2, maritime data (land/ship), `222Dsvs`
    pub const SEA: &str = "222";
    /// Section 3, regional data
    pub const REGIONAL: &str = "333";
    /// Section 5, national data
    pub const NATIONAL: &str = "555";
    /// Buoy section 1, `111QdQx`
    pub const BUOY_METEO: &str = "111";
    /// Buoy section 2, `222QdQx`
    pub const BUOY_SEA: &str = "222";
}

// =============================================================================
// Code Tables
// =============================================================================

/// Visibility in metres for codes 90..=99 (code table 4377)
pub const VISIBILITY_90_TO_99: [f64; 10] = [
    40.0, 50.0, 200.0, 500.0, 1000.0, 2000.0, 4000.0, 10000.0, 20000.0, 50000.0,
];

/// Visibility used for code 0, "less than 100 m"
pub const VISIBILITY_BELOW_100_M: f64 = 75.0;

/// Visibility used for the unassigned codes 51..=55
pub const VISIBILITY_UNASSIGNED: f64 = 5000.0;

/// Visibility used for code 89, "more than 70 km"
pub const VISIBILITY_ABOVE_70_KM: f64 = 75000.0;

/// Lower bound in metres of the cloud base class for codes 0..=9 (code table 1600)
pub const CLOUD_BASE_HEIGHT: [f64; 10] = [
    0.0, 50.0, 100.0, 200.0, 300.0, 600.0, 1000.0, 1500.0, 2000.0, 2500.0,
];

/// Precipitation period in hours for tR codes 1..=9 (code table 4019)
pub const PRECIPITATION_PERIOD_HOURS: [u8; 9] = [6, 12, 18, 24, 1, 2, 3, 9, 15];

// =============================================================================
// Numeric Constants
// =============================================================================

/// Metres per second in one knot
pub const KNOT_IN_MS: f64 = 0.514444;

/// Wind speed code announcing a `00fff` continuation group
pub const WIND_SPEED_EXTENDED: u32 = 99;

/// Wind direction code for a variable direction
pub const WIND_DIRECTION_VARIABLE: u32 = 99;

/// Precipitation codes from this value up encode tenths of a millimetre
pub const PRECIPITATION_TENTHS_FROM: u32 = 990;

/// Integer pressure part below this value lies in the 1000 hPa range
pub const PRESSURE_WRAP_BELOW: u32 = 500;

/// Spacing of the main synoptic hours
pub const SYNOPTIC_INTERVAL_HOURS: u32 = 3;

/// First identifier handed out to mobile stations without a numeric id
pub const SYNTHETIC_ID_BASE: u32 = 1_000_000;

/// How many months back a day/hour stamp may lie before it is rejected
pub const MAX_MONTHS_BACK: u32 = 12;
