//! Stateless decoders for fixed-width coded fields.
//!
//! Every decoder takes the characters of one field (not the whole group)
//! and returns `Ok(None)` when the field is reported as missing: a field
//! made up entirely of `/`, or entirely of `x`/`X`. Any other non-digit
//! content is a `ValueError`.

use crate::constants::{
    CLOUD_BASE_HEIGHT, KNOT_IN_MS, PRECIPITATION_PERIOD_HOURS, PRECIPITATION_TENTHS_FROM,
    PRESSURE_WRAP_BELOW, VISIBILITY_90_TO_99, VISIBILITY_ABOVE_70_KM, VISIBILITY_BELOW_100_M,
    VISIBILITY_UNASSIGNED, WIND_DIRECTION_VARIABLE,
};
use crate::error::ValueError;
use crate::models::WindUnit;

type ValueResult<T> = std::result::Result<T, ValueError>;

/// True when the whole field is a missing-value filler
pub fn is_missing(field: &str) -> bool {
    !field.is_empty()
        && (field.chars().all(|c| c == '/') || field.chars().all(|c| c == 'x' || c == 'X'))
}

/// Parse an unsigned numeric field of exactly `width` characters
pub fn parse_code(field: &str, width: usize, name: &'static str) -> ValueResult<Option<u32>> {
    if field.len() != width {
        return Err(ValueError::WrongWidth {
            field: name,
            expected: width,
            value: field.to_string(),
        });
    }
    if is_missing(field) {
        return Ok(None);
    }
    parse_digits(field, name).map(Some)
}

fn require_ascii(field: &str, name: &'static str) -> ValueResult<()> {
    if field.is_ascii() {
        Ok(())
    } else {
        Err(ValueError::InvalidCharacters {
            field: name,
            value: field.to_string(),
        })
    }
}

fn parse_digits(field: &str, name: &'static str) -> ValueResult<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValueError::InvalidCharacters {
            field: name,
            value: field.to_string(),
        });
    }
    field.parse::<u32>().map_err(|_| ValueError::InvalidCharacters {
        field: name,
        value: field.to_string(),
    })
}

/// Visibility code VV (code table 4377) to metres
pub fn decode_visibility(code: u32) -> ValueResult<f64> {
    let metres = match code {
        0 => VISIBILITY_BELOW_100_M,
        1..=50 => f64::from(code) * 100.0,
        // 51..=55 are not assigned; seen in practice, read as 5 km
        51..=55 => VISIBILITY_UNASSIGNED,
        56..=80 => f64::from(code - 50) * 1000.0,
        81..=88 => f64::from(code - 80) * 5000.0 + 30000.0,
        89 => VISIBILITY_ABOVE_70_KM,
        90..=99 => VISIBILITY_90_TO_99[(code - 90) as usize],
        _ => {
            return Err(ValueError::OutOfRange {
                field: "visibility",
                value: code,
            });
        }
    };
    Ok(metres)
}

/// Two character visibility field
pub fn decode_visibility_field(field: &str) -> ValueResult<Option<f64>> {
    parse_code(field, 2, "visibility")?
        .map(decode_visibility)
        .transpose()
}

/// Cloud base height code h (code table 1600) to metres
pub fn decode_cloud_base_height(field: &str) -> ValueResult<Option<f64>> {
    match parse_code(field, 1, "cloud base height")? {
        Some(code) => Ok(Some(CLOUD_BASE_HEIGHT[code as usize])),
        None => Ok(None),
    }
}

/// Single digit code such as cloud cover, cloud type or past weather
pub fn decode_digit(field: &str, name: &'static str) -> ValueResult<Option<u8>> {
    Ok(parse_code(field, 1, name)?.map(|d| d as u8))
}

/// Signed temperature `snTTT` without the group indicator.
///
/// The sign digit is 0 for positive and 1 for negative values. `TTT` is in
/// tenths of a degree; the short forms `snTT` and `snTT/` carry whole degrees.
pub fn decode_signed_temperature(field: &str) -> ValueResult<Option<f64>> {
    require_ascii(field, "temperature")?;
    if field.len() != 3 && field.len() != 4 {
        return Err(ValueError::WrongWidth {
            field: "temperature",
            expected: 4,
            value: field.to_string(),
        });
    }
    if is_missing(field) || is_missing(&field[1..]) {
        return Ok(None);
    }

    let sign = match &field[..1] {
        "0" => 1.0,
        "1" => -1.0,
        _ => {
            return Err(ValueError::InvalidCharacters {
                field: "temperature sign",
                value: field.to_string(),
            });
        }
    };

    let digits = &field[1..];
    let value = if digits.len() == 2 {
        f64::from(parse_digits(digits, "temperature")?)
    } else if digits.ends_with('/') {
        f64::from(parse_digits(&digits[..2], "temperature")?)
    } else {
        f64::from(parse_digits(digits, "temperature")?) / 10.0
    };

    Ok(Some(sign * value))
}

/// Pressure field `PPPP` in tenths of hPa with the thousands digit dropped.
///
/// Integer parts below 500 lie in the 1000 hPa range.
pub fn decode_pressure(field: &str) -> ValueResult<Option<f64>> {
    require_ascii(field, "pressure")?;
    if field.len() != 4 {
        return Err(ValueError::WrongWidth {
            field: "pressure",
            expected: 4,
            value: field.to_string(),
        });
    }
    if is_missing(field) || is_missing(&field[..3]) {
        return Ok(None);
    }

    let integer = parse_digits(&field[..3], "pressure")?;
    let tenths = match &field[3..] {
        "/" => 0,
        tenths => parse_digits(tenths, "pressure")?,
    };

    let value = f64::from(integer) + f64::from(tenths) / 10.0;
    if integer < PRESSURE_WRAP_BELOW {
        Ok(Some(1000.0 + value))
    } else {
        Ok(Some(value))
    }
}

/// Pressure tendency `appp`: characteristic and signed change in hPa
pub fn decode_tendency(field: &str) -> ValueResult<(Option<u8>, Option<f64>)> {
    require_ascii(field, "pressure tendency")?;
    if field.len() != 4 {
        return Err(ValueError::WrongWidth {
            field: "pressure tendency",
            expected: 4,
            value: field.to_string(),
        });
    }

    let characteristic = decode_digit(&field[..1], "pressure tendency")?;
    if let Some(a) = characteristic {
        if a > 8 {
            return Err(ValueError::OutOfRange {
                field: "pressure tendency",
                value: u32::from(a),
            });
        }
    }

    let change = parse_code(&field[1..], 3, "pressure change")?.map(|ppp| {
        let magnitude = f64::from(ppp) / 10.0;
        match characteristic {
            Some(4) => 0.0,
            Some(5..=8) => -magnitude,
            _ => magnitude,
        }
    });

    Ok((characteristic, change))
}

/// Precipitation amount `RRR` in mm; 990 and above are tenths of a mm
pub fn decode_precipitation(field: &str) -> ValueResult<Option<f64>> {
    Ok(parse_code(field, 3, "precipitation")?.map(|code| {
        if code >= PRECIPITATION_TENTHS_FROM {
            f64::from(code % 10) / 10.0
        } else {
            f64::from(code)
        }
    }))
}

/// Precipitation period code tR (code table 4019) to hours
pub fn decode_precipitation_period(field: &str) -> ValueResult<Option<u8>> {
    match parse_code(field, 1, "precipitation period")? {
        Some(code @ 1..=9) => Ok(Some(PRECIPITATION_PERIOD_HOURS[code as usize - 1])),
        _ => Ok(None),
    }
}

/// Wind direction `dd` in tens of degrees; calm is 0, variable is missing
pub fn decode_wind_direction(field: &str) -> ValueResult<Option<u16>> {
    match parse_code(field, 2, "wind direction")? {
        Some(0) => Ok(Some(0)),
        Some(dd @ 1..=36) => Ok(Some(((dd * 10) % 360) as u16)),
        Some(WIND_DIRECTION_VARIABLE) | None => Ok(None),
        Some(dd) => Err(ValueError::OutOfRange {
            field: "wind direction",
            value: dd,
        }),
    }
}

/// Wind speed in m/s for a value reported in `unit`
pub fn wind_speed_ms(value: u32, unit: WindUnit) -> f64 {
    match unit {
        WindUnit::MetresPerSecond => f64::from(value),
        WindUnit::Knots => f64::from(value) * KNOT_IN_MS,
    }
}

/// Wind unit announced by the indicator iw; `None` when not given
pub fn decode_wind_unit(indicator: char) -> Option<WindUnit> {
    match indicator {
        '0' | '1' => Some(WindUnit::MetresPerSecond),
        '3' | '4' => Some(WindUnit::Knots),
        _ => None,
    }
}

/// Apply the quadrant of the globe Qc to unsigned latitude and longitude
pub fn apply_quadrant(quadrant: char, latitude: f64, longitude: f64) -> ValueResult<(f64, f64)> {
    match quadrant {
        '1' => Ok((latitude, longitude)),
        '3' => Ok((-latitude, longitude)),
        '5' => Ok((-latitude, -longitude)),
        '7' => Ok((latitude, -longitude)),
        other => Err(ValueError::UnknownQuadrant(other)),
    }
}

fn check_position(latitude: f64, longitude: f64) -> ValueResult<(f64, f64)> {
    if latitude.abs() > 90.0 {
        return Err(ValueError::OutOfRange {
            field: "latitude",
            value: latitude.abs() as u32,
        });
    }
    if longitude.abs() > 180.0 {
        return Err(ValueError::OutOfRange {
            field: "longitude",
            value: longitude.abs() as u32,
        });
    }
    Ok((latitude, longitude))
}

/// Ship position from `99LaLaLa` and `QcLoLoLoLo`, both in tenths of a degree
pub fn decode_ship_position(latitude_group: &str, longitude_group: &str) -> ValueResult<(f64, f64)> {
    require_ascii(latitude_group, "ship latitude")?;
    require_ascii(longitude_group, "ship longitude")?;
    if latitude_group.len() != 5 || !latitude_group.starts_with("99") {
        return Err(ValueError::InvalidCharacters {
            field: "ship latitude",
            value: latitude_group.to_string(),
        });
    }
    if longitude_group.len() != 5 {
        return Err(ValueError::WrongWidth {
            field: "ship longitude",
            expected: 5,
            value: longitude_group.to_string(),
        });
    }

    let latitude = f64::from(parse_digits(&latitude_group[2..], "ship latitude")?) / 10.0;
    let longitude = f64::from(parse_digits(&longitude_group[1..], "ship longitude")?) / 10.0;
    let quadrant = longitude_group.chars().next().unwrap_or('/');

    let (latitude, longitude) = apply_quadrant(quadrant, latitude, longitude)?;
    check_position(latitude, longitude)
}

/// Degrees with `integer_width` integer digits followed by up to three
/// decimals. Trailing `/` characters reduce the precision.
fn decode_degrees(field: &str, integer_width: usize, name: &'static str) -> ValueResult<f64> {
    let integer = parse_digits(&field[..integer_width], name)?;
    let decimals = &field[integer_width..];

    let digits = decimals.find('/').unwrap_or(decimals.len());
    if !decimals[digits..].chars().all(|c| c == '/') {
        return Err(ValueError::InvalidCharacters {
            field: name,
            value: field.to_string(),
        });
    }

    let fraction = if digits == 0 {
        0.0
    } else {
        f64::from(parse_digits(&decimals[..digits], name)?) / 10f64.powi(digits as i32)
    };
    Ok(f64::from(integer) + fraction)
}

/// Buoy position from `QcLaLaLaLaLa` and `LoLoLoLoLoLo`.
///
/// Both fields are six characters wide. Whole degrees, tenths and
/// thousandths are told apart by trailing `/` characters.
pub fn decode_buoy_position(latitude_group: &str, longitude_group: &str) -> ValueResult<(f64, f64)> {
    if latitude_group.len() != 6 || !latitude_group.is_ascii() {
        return Err(ValueError::WrongWidth {
            field: "buoy latitude",
            expected: 6,
            value: latitude_group.to_string(),
        });
    }
    if longitude_group.len() != 6 || !longitude_group.is_ascii() {
        return Err(ValueError::WrongWidth {
            field: "buoy longitude",
            expected: 6,
            value: longitude_group.to_string(),
        });
    }

    let quadrant = latitude_group.chars().next().unwrap_or('/');
    let latitude = decode_degrees(&latitude_group[1..], 2, "buoy latitude")?;
    let longitude = decode_degrees(longitude_group, 3, "buoy longitude")?;

    let (latitude, longitude) = apply_quadrant(quadrant, latitude, longitude)?;
    check_position(latitude, longitude)
}
