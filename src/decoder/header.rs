//! Report headers: station identity and observation time.
//!
//! Land reports identify a fixed station by WMO id and take their time from
//! the `YYGGiw` group of the block. Ship reports carry a call sign, an
//! optional own `YYGGiw` group and a `99LaLaLa QcLoLoLoLo` position.

use super::{BlockContext, ReportDecoder, Step, Termination};
use crate::constants::{MAX_MONTHS_BACK, NIL_TOKEN, SYNOPTIC_INTERVAL_HOURS};
use crate::context::DecodeContext;
use crate::cursor::FieldCursor;
use crate::decoders::{decode_ship_position, decode_wind_unit, parse_code};
use crate::error::ValueError;
use crate::models::{MobileStation, StationIdentity, WindUnit};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Timelike, Utc};
use tracing::debug;

/// `YYGGiw` group: day, hour and wind speed indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub day: u32,
    pub hour: u32,
    pub wind_unit: Option<WindUnit>,
}

impl BlockHeader {
    pub fn parse(group: &str) -> Result<Self, ValueError> {
        if group.len() != 5 || !group.is_ascii() {
            return Err(ValueError::WrongWidth {
                field: "YYGGiw",
                expected: 5,
                value: group.to_string(),
            });
        }

        let day = required(parse_code(&group[..2], 2, "day")?, "day", group)?;
        let hour = required(parse_code(&group[2..4], 2, "hour")?, "hour", group)?;
        if !(1..=31).contains(&day) {
            return Err(ValueError::OutOfRange {
                field: "day",
                value: day,
            });
        }
        if hour > 23 {
            return Err(ValueError::OutOfRange {
                field: "hour",
                value: hour,
            });
        }

        let indicator = group.chars().nth(4).unwrap_or('/');
        Ok(Self {
            day,
            hour,
            wind_unit: decode_wind_unit(indicator),
        })
    }
}

pub(crate) fn required(
    value: Option<u32>,
    field: &'static str,
    group: &str,
) -> Result<u32, ValueError> {
    value.ok_or_else(|| ValueError::InvalidCharacters {
        field,
        value: group.to_string(),
    })
}

/// Identity, time and wind unit of one report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHeader {
    pub station: StationIdentity,
    pub time: DateTime<Utc>,
    pub wind_unit: WindUnit,
}

/// Most recent time not after `reference` that falls on `day` at
/// `hour:minute`, looking back at most a year
pub fn resolve_day_hour(
    day: u32,
    hour: u32,
    minute: u32,
    reference: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let first_of_month = NaiveDate::from_ymd_opt(reference.year(), reference.month(), 1)?;

    for months_back in 0..=MAX_MONTHS_BACK {
        let month = first_of_month.checked_sub_months(Months::new(months_back))?;
        let Some(date) = NaiveDate::from_ymd_opt(month.year(), month.month(), day) else {
            continue;
        };
        let time = Utc.from_utc_datetime(&date.and_hms_opt(hour, minute, 0)?);
        if time <= reference {
            return Some(time);
        }
    }
    None
}

/// Most recent time not after `reference` for a buoy date whose year is
/// only known by its last digit
pub fn resolve_buoy_time(
    day: u32,
    month: u32,
    year_digit: u32,
    hour: u32,
    minute: u32,
    reference: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let reference_year = reference.year();
    let latest = reference_year - (reference_year - year_digit as i32).rem_euclid(10);

    for year in [latest, latest - 10] {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let time = Utc.from_utc_datetime(&date.and_hms_opt(hour, minute, 0)?);
        if time <= reference {
            return Some(time);
        }
    }
    None
}

/// Round to the nearest main synoptic hour; half-way times round up
pub fn round_to_synoptic_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    let minutes = i64::from(time.hour() * 60 + time.minute());
    let step = i64::from(SYNOPTIC_INTERVAL_HOURS * 60);
    let rounded = (minutes + step / 2) / step * step;

    let midnight = time - Duration::minutes(minutes) - Duration::seconds(i64::from(time.second()));
    midnight + Duration::minutes(rounded)
}

/// Apply the configured rounding to a resolved time
pub(crate) fn finish_time(decoder: &ReportDecoder<'_>, time: DateTime<Utc>) -> DateTime<Utc> {
    if decoder.config().round_to_synoptic_hour {
        round_to_synoptic_hour(time)
    } else {
        time
    }
}

fn observation_time(decoder: &ReportDecoder<'_>, header: &BlockHeader) -> Step<DateTime<Utc>> {
    let time = resolve_day_hour(header.day, header.hour, 0, decoder.reference_time())
        .ok_or_else(|| {
            Termination::Malformed(format!(
                "day {} hour {} cannot be placed before {}",
                header.day,
                header.hour,
                decoder.reference_time()
            ))
        })?;
    Ok(finish_time(decoder, time))
}

pub(crate) fn is_numeric_group(token: &str) -> bool {
    token.len() == 5 && token.bytes().all(|b| b.is_ascii_digit())
}

fn is_latitude_group(token: &str) -> bool {
    is_numeric_group(token) && token.starts_with("99")
}

/// Land report header: `IIiii`
pub fn decode_land_header(
    decoder: &ReportDecoder<'_>,
    cursor: &mut FieldCursor<'_>,
    block: &BlockContext,
    ctx: &mut DecodeContext,
) -> Step<ReportHeader> {
    let group = cursor.read_mandatory("station id")?;
    if !is_numeric_group(group) {
        return Err(Termination::Ignorable(format!(
            "'{}' is not a land station id",
            group
        )));
    }
    let id: u32 = group
        .parse()
        .map_err(|_| Termination::Ignorable(format!("'{}' is not a land station id", group)))?;

    let header = block
        .header
        .ok_or_else(|| Termination::Malformed("land report without block header".to_string()))?;

    let Some(station) = decoder.resolver().resolve(id) else {
        ctx.record_unresolved(id);
        return Err(Termination::Ignorable(format!("unknown station {}", id)));
    };

    let time = observation_time(decoder, &header)?;
    Ok(ReportHeader {
        station: StationIdentity::Fixed(station),
        time,
        wind_unit: decoder.wind_unit(header.wind_unit),
    })
}

/// Ship report header: `D....D [YYGGiw] 99LaLaLa QcLoLoLoLo`.
///
/// The call sign may span several groups; everything before the optional
/// time group and the position groups belongs to it.
pub fn decode_ship_header(
    decoder: &ReportDecoder<'_>,
    cursor: &mut FieldCursor<'_>,
    block: &BlockContext,
    ctx: &mut DecodeContext,
) -> Step<ReportHeader> {
    let tokens = cursor.tokens().to_vec();

    let position = (1..tokens.len().saturating_sub(1))
        .find(|&i| is_latitude_group(tokens[i]) && is_numeric_group(tokens[i + 1]));

    let Some(position) = position else {
        if tokens.iter().any(|t| t.eq_ignore_ascii_case(NIL_TOKEN)) {
            return Err(Termination::Empty);
        }
        return Err(Termination::Malformed(
            "no 99LaLaLa QcLoLoLoLo position groups".to_string(),
        ));
    };

    let (name_end, time_group) = if position >= 2 && is_numeric_group(tokens[position - 1]) {
        (position - 1, Some(tokens[position - 1]))
    } else {
        (position, None)
    };
    let name = tokens[..name_end].join(" ");
    cursor.skip(position);

    let header = match time_group {
        Some(group) => BlockHeader::parse(group).map_err(|e| {
            Termination::Malformed(format!("invalid ship time group '{}': {}", group, e))
        })?,
        None => block.header.ok_or_else(|| {
            Termination::Malformed(format!("ship '{}' reported without time", name))
        })?,
    };

    let latitude_group = cursor.read_mandatory("99LaLaLa")?;
    let longitude_group = cursor.read_mandatory("QcLoLoLoLo")?;
    let (latitude, longitude) = decode_ship_position(latitude_group, longitude_group)
        .map_err(|e| Termination::Malformed(format!("ship '{}' position: {}", name, e)))?;

    let time = observation_time(decoder, &header)?;
    let id = ctx.ships.id_for(&name);
    debug!("Ship {} ({}) at {:.1},{:.1}", name, id, latitude, longitude);

    Ok(ReportHeader {
        station: StationIdentity::Mobile(MobileStation {
            id,
            name,
            latitude,
            longitude,
        }),
        time,
        wind_unit: decoder.wind_unit(header.wind_unit),
    })
}
