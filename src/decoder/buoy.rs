//! Buoy reports (FM 18).
//!
//! ```text
//! A1bwnbnbnb YYMMJ GGggiw QcLaLaLaLaLa LoLoLoLoLoLo (6QlQtQA/)
//! 111QdQx 0ddff 1snTTT 2snTdTdTd 3P0P0P0P0 4PPPP 5appp
//! 222QdQx 0snTwTwTw ...
//! ```

use super::header::{ReportHeader, finish_time, is_numeric_group, required, resolve_buoy_time};
use super::{ReportDecoder, ReportScope, Step, Termination, field};
use crate::constants::{WIND_SPEED_EXTENDED, sections};
use crate::context::DecodeContext;
use crate::cursor::FieldCursor;
use crate::decoders::{
    decode_buoy_position, decode_pressure, decode_signed_temperature,
    decode_tendency, decode_wind_direction, decode_wind_unit, parse_code, wind_speed_ms,
};
use crate::error::ValueError;
use crate::models::{MobileStation, Observation, StationIdentity, WindUnit};
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

/// Date and time groups `YYMMJ GGggiw`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BuoyTime {
    day: u32,
    month: u32,
    year_digit: u32,
    hour: u32,
    minute: u32,
    wind_unit: Option<WindUnit>,
}

impl BuoyTime {
    fn parse(date: &str, time: &str) -> Result<Self, ValueError> {
        for (group, name) in [(date, "YYMMJ"), (time, "GGggiw")] {
            if group.len() != 5 || !group.is_ascii() {
                return Err(ValueError::WrongWidth {
                    field: name,
                    expected: 5,
                    value: group.to_string(),
                });
            }
        }

        let day = required(parse_code(&date[..2], 2, "day")?, "day", date)?;
        let month = required(parse_code(&date[2..4], 2, "month")?, "month", date)?;
        let year_digit = required(parse_code(&date[4..], 1, "year")?, "year", date)?;
        let hour = required(parse_code(&time[..2], 2, "hour")?, "hour", time)?;
        // minutes are often not reported
        let minute = parse_code(&time[2..4], 2, "minute")?.unwrap_or(0);

        for (name, value, range) in [
            ("day", day, 1..=31),
            ("month", month, 1..=12),
            ("hour", hour, 0..=23),
            ("minute", minute, 0..=59),
        ] {
            if !range.contains(&value) {
                return Err(ValueError::OutOfRange { field: name, value });
            }
        }

        Ok(Self {
            day,
            month,
            year_digit,
            hour,
            minute,
            wind_unit: decode_wind_unit(time.chars().nth(4).unwrap_or('/')),
        })
    }

    fn resolve(&self, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        resolve_buoy_time(
            self.day,
            self.month,
            self.year_digit,
            self.hour,
            self.minute,
            reference,
        )
    }
}

/// Buoy header: id, date, time and a six-character position pair
pub fn decode_buoy_header(
    decoder: &ReportDecoder<'_>,
    cursor: &mut FieldCursor<'_>,
    ctx: &mut DecodeContext,
) -> Step<ReportHeader> {
    let name = cursor.read_mandatory("buoy id")?;
    let date = cursor.read_mandatory("YYMMJ")?;
    let time = cursor.read_mandatory("GGggiw")?;
    let latitude_group = cursor.read_mandatory("QcLaLaLaLaLa")?;
    let longitude_group = cursor.read_mandatory("LoLoLoLoLoLo")?;

    let stamp = BuoyTime::parse(date, time).map_err(|e| {
        Termination::Malformed(format!("buoy {} time '{} {}': {}", name, date, time, e))
    })?;
    let observed = stamp.resolve(decoder.reference_time()).ok_or_else(|| {
        Termination::Malformed(format!(
            "buoy {} time '{} {}' cannot be placed before {}",
            name,
            date,
            time,
            decoder.reference_time()
        ))
    })?;

    let (latitude, longitude) = decode_buoy_position(latitude_group, longitude_group)
        .map_err(|e| Termination::Malformed(format!("buoy {} position: {}", name, e)))?;

    let id = match name.parse::<u32>() {
        Ok(id) if is_numeric_group(name) => id,
        _ => ctx.ships.id_for(name),
    };
    debug!("Buoy {} ({}) at {:.3},{:.3}", name, id, latitude, longitude);

    Ok(ReportHeader {
        station: StationIdentity::Mobile(MobileStation {
            id,
            name: name.to_string(),
            latitude,
            longitude,
        }),
        time: finish_time(decoder, observed),
        wind_unit: decoder.wind_unit(stamp.wind_unit),
    })
}

fn is_section_marker(group: &str, marker: &str) -> bool {
    group.len() == 5 && group.starts_with(marker)
}

/// Sections 3 and 4 hold sub-surface and engineering data
fn is_later_section(group: &str) -> bool {
    group.starts_with(sections::REGIONAL) || group.starts_with("444")
}

/// Buoy sections 1 and 2.
///
/// A report with neither section carries no measurements and is `Empty`.
pub fn decode_buoy_body(
    cursor: &mut FieldCursor<'_>,
    obs: &mut Observation,
    scope: &mut ReportScope,
) -> Step<()> {
    if cursor.peek()?.is_some_and(|g| g.len() == 5 && g.starts_with('6')) {
        cursor.read_mandatory("6QlQtQA/")?;
    }

    let mut found = false;
    while let Some(group) = cursor.read_optional("buoy section")? {
        if is_section_marker(group, sections::BUOY_METEO) {
            found = true;
            decode_meteo_section(cursor, obs, scope)?;
        } else if is_section_marker(group, sections::BUOY_SEA) {
            found = true;
            decode_sea_section(cursor, obs)?;
        } else if is_later_section(group) {
            // later sections are not decoded but may still hold a NIL
            cursor.advance_to(|_| false)?;
            break;
        } else {
            trace!("Skipping buoy group '{}'", group);
        }
    }

    if found { Ok(()) } else { Err(Termination::Empty) }
}

/// Next group of a section whose groups come in ascending indicator order
fn next_in_section<'a>(
    cursor: &mut FieldCursor<'a>,
    last: &mut Option<u8>,
) -> Step<Option<(u8, &'a str)>> {
    let Some(group) = cursor.peek()? else {
        return Ok(None);
    };
    if group.len() != 5
        || !group.is_ascii()
        || is_section_marker(group, sections::BUOY_SEA)
        || is_later_section(group)
    {
        return Ok(None);
    }
    let Some(digit) = group.chars().next().and_then(|c| c.to_digit(10)) else {
        return Ok(None);
    };
    let digit = digit as u8;
    if last.is_some_and(|l| digit <= l) {
        return Ok(None);
    }
    cursor.read_mandatory("buoy group")?;
    *last = Some(digit);
    Ok(Some((digit, group)))
}

/// `111QdQx` section: wind, temperature, humidity and pressure
fn decode_meteo_section(
    cursor: &mut FieldCursor<'_>,
    obs: &mut Observation,
    scope: &ReportScope,
) -> Step<()> {
    let mut last = None;
    while let Some((digit, group)) = next_in_section(cursor, &mut last)? {
        match digit {
            0 => {
                obs.wind_direction = field(decode_wind_direction(&group[1..3]), group);
                obs.wind_speed = match field(parse_code(&group[3..5], 2, "ff"), group) {
                    Some(WIND_SPEED_EXTENDED) => {
                        let extension = cursor.read_mandatory("00fff")?;
                        if extension.len() != 5 || !extension.starts_with("00") {
                            return Err(Termination::Malformed(format!(
                                "expected 00fff after '{}', found '{}'",
                                group, extension
                            )));
                        }
                        field(parse_code(&extension[2..], 3, "fff"), extension)
                            .map(|fff| wind_speed_ms(fff, scope.wind_unit))
                    }
                    Some(ff) => Some(wind_speed_ms(ff, scope.wind_unit)),
                    None => None,
                };
            }
            1 => obs.temperature = field(decode_signed_temperature(&group[1..]), group),
            2 if &group[1..2] == "9" => {
                obs.relative_humidity = field(parse_code(&group[2..], 3, "UUU"), group)
                    .filter(|&rh| rh <= 100)
                    .map(f64::from);
            }
            2 => obs.dew_point = field(decode_signed_temperature(&group[1..]), group),
            3 => trace!("Station pressure group '{}' not retained", group),
            4 => obs.pressure = field(decode_pressure(&group[1..]), group),
            5 => {
                if let Some((tendency, change)) =
                    field(decode_tendency(&group[1..]).map(Some), group)
                {
                    obs.pressure_tendency = tendency;
                    obs.pressure_change = change;
                }
            }
            _ => trace!("Skipping buoy group '{}'", group),
        }
    }
    Ok(())
}

/// `222QdQx` section: sea surface temperature
fn decode_sea_section(cursor: &mut FieldCursor<'_>, obs: &mut Observation) -> Step<()> {
    if let Some(group) = cursor.peek()? {
        if group.len() == 5 && group.is_ascii() && group.starts_with('0') {
            cursor.read_mandatory("0snTwTwTw")?;
            obs.sea_surface_temperature = field(decode_signed_temperature(&group[1..]), group);
        }
    }
    Ok(())
}
