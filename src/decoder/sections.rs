//! Sections 0 to 3 of land and ship reports.
//!
//! ```text
//! iRixhVV Nddff (00fff) 1snTTT 2snTdTdTd 3P0P0P0P0 4PPPP 5appp 6RRRtR 7wwW1W2 8NhCLCMCH 9GGgg
//! 222Dsvs 0snTwTwTw ...
//! 333 1snTxTxTx 2snTnTnTn ... 6RRRtR ... 8NsChshs ... 910ff 911ff
//! ```

use super::{ReportScope, Step, Termination, field};
use crate::constants::{WIND_SPEED_EXTENDED, sections};
use crate::cursor::FieldCursor;
use crate::decoders::{
    decode_cloud_base_height, decode_digit, decode_precipitation, decode_precipitation_period,
    decode_pressure, decode_signed_temperature, decode_tendency, decode_visibility_field,
    decode_wind_direction, parse_code, wind_speed_ms,
};
use crate::models::Observation;
use tracing::{debug, trace};

/// Position of the decoder within a land or ship report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// `iRixhVV`
    Indicators,
    /// `Nddff` and its `00fff` continuation
    Wind,
    /// Section 1 groups; `last` is the indicator digit consumed last
    MainGroups { last: u8 },
    /// `222Dsvs` if it follows directly
    Sea,
    /// Scan for `333`
    Regional,
    Done,
}

/// Decoder of one section 1 group
type GroupDecoder = fn(&str, &mut Observation, &ReportScope);

/// Section 1 group decoders by indicator digit
const MAIN_GROUPS: [Option<GroupDecoder>; 10] = [
    None,
    Some(decode_temperature_group),
    Some(decode_humidity_group),
    Some(decode_station_pressure_group),
    Some(decode_pressure_group),
    Some(decode_tendency_group),
    Some(decode_precipitation_group),
    Some(decode_weather_group),
    Some(decode_cloud_group),
    Some(decode_time_group),
];

/// Decode everything after the header of a land or ship report
pub fn decode_body(
    cursor: &mut FieldCursor<'_>,
    obs: &mut Observation,
    scope: &mut ReportScope,
) -> Step<()> {
    let mut state = State::Indicators;
    while state != State::Done {
        state = step(state, cursor, obs, scope)?;
    }
    Ok(())
}

/// Run one state and return the next one
pub fn step(
    state: State,
    cursor: &mut FieldCursor<'_>,
    obs: &mut Observation,
    scope: &mut ReportScope,
) -> Step<State> {
    match state {
        State::Indicators => {
            let group = cursor
                .read_optional("iRixhVV")?
                .ok_or(Termination::Empty)?;
            decode_indicators(group, obs, scope);
            Ok(State::Wind)
        }
        State::Wind => {
            let group = cursor.read_optional("Nddff")?.ok_or(Termination::Empty)?;
            decode_wind(group, cursor, obs, scope)?;
            Ok(State::MainGroups { last: 0 })
        }
        State::MainGroups { last } => {
            let Some(group) = cursor.peek()? else {
                return Ok(State::Done);
            };
            if is_sea_marker(group) {
                return Ok(State::Sea);
            }
            match main_group_digit(group) {
                Some(digit) if digit > last => {
                    cursor.read_mandatory("section 1")?;
                    if let Some(decode) = MAIN_GROUPS[digit as usize] {
                        decode(group, obs, scope);
                    }
                    Ok(State::MainGroups { last: digit })
                }
                _ => {
                    trace!("Section 1 ends before '{}'", group);
                    Ok(State::Sea)
                }
            }
        }
        State::Sea => {
            if cursor.peek()?.is_some_and(is_sea_marker) {
                cursor.read_mandatory("222Dsvs")?;
                decode_sea_section(cursor, obs)?;
            }
            Ok(State::Regional)
        }
        State::Regional => {
            if cursor.advance_to(|t| t == sections::REGIONAL)?.is_some() {
                decode_regional_section(cursor, obs, scope)?;
            }
            Ok(State::Done)
        }
        State::Done => Ok(State::Done),
    }
}

pub(crate) fn is_sea_marker(group: &str) -> bool {
    group == sections::SEA || (group.len() == 5 && group.starts_with(sections::SEA))
}

/// Indicator digit of a section 1 group, `None` for anything else
fn main_group_digit(group: &str) -> Option<u8> {
    if !group.is_ascii() {
        return None;
    }
    let digit = group.chars().next()?.to_digit(10)? as u8;
    let width_ok = match digit {
        // short temperature forms
        1 | 2 => group.len() == 4 || group.len() == 5,
        _ => group.len() == 5,
    };
    (digit > 0 && width_ok).then_some(digit)
}

fn is_five_ascii(group: &str) -> bool {
    group.len() == 5 && group.is_ascii()
}

/// `iRixhVV`: precipitation indicator, cloud base and visibility
fn decode_indicators(group: &str, obs: &mut Observation, scope: &mut ReportScope) {
    if !is_five_ascii(group) {
        debug!("Ignoring malformed indicator group '{}'", group);
        return;
    }
    scope.precipitation_indicator = field(decode_digit(&group[..1], "iR"), group);
    obs.cloud_base_height = field(decode_cloud_base_height(&group[2..3]), group);
    obs.visibility = field(decode_visibility_field(&group[3..5]), group);
}

/// Speed `ff` (or `fff`) converted to m/s
fn wind_speed(
    speed: Option<u32>,
    group: &str,
    cursor: &mut FieldCursor<'_>,
    scope: &ReportScope,
) -> Step<Option<f64>> {
    match speed {
        Some(WIND_SPEED_EXTENDED) => {
            let extension = cursor.read_mandatory("00fff")?;
            if !is_five_ascii(extension) || !extension.starts_with("00") {
                return Err(Termination::Malformed(format!(
                    "expected 00fff after '{}', found '{}'",
                    group, extension
                )));
            }
            Ok(field(parse_code(&extension[2..], 3, "fff"), extension)
                .map(|fff| wind_speed_ms(fff, scope.wind_unit)))
        }
        Some(ff) => Ok(Some(wind_speed_ms(ff, scope.wind_unit))),
        None => Ok(None),
    }
}

/// Gust speed from `910ff`/`911ff`.
///
/// The `00fff` continuation is only taken when the next group has that
/// form; otherwise the gust is left missing and the group stays unread.
fn gust_speed(
    speed: Option<u32>,
    group: &str,
    cursor: &mut FieldCursor<'_>,
    scope: &ReportScope,
) -> Step<Option<f64>> {
    match speed {
        Some(WIND_SPEED_EXTENDED) => {
            let continuation = cursor
                .peek()?
                .filter(|next| is_five_ascii(next) && next.starts_with("00"));
            let Some(extension) = continuation else {
                debug!("No 00fff continuation after gust group '{}'", group);
                return Ok(None);
            };
            cursor.read_optional("00fff")?;
            Ok(field(parse_code(&extension[2..], 3, "fff"), extension)
                .map(|fff| wind_speed_ms(fff, scope.wind_unit)))
        }
        Some(ff) => Ok(Some(wind_speed_ms(ff, scope.wind_unit))),
        None => Ok(None),
    }
}

/// `Nddff`: total cloud cover and wind
fn decode_wind(
    group: &str,
    cursor: &mut FieldCursor<'_>,
    obs: &mut Observation,
    scope: &ReportScope,
) -> Step<()> {
    if !is_five_ascii(group) {
        debug!("Ignoring malformed wind group '{}'", group);
        return Ok(());
    }
    obs.total_cloud_cover = field(decode_digit(&group[..1], "N"), group);
    obs.wind_direction = field(decode_wind_direction(&group[1..3]), group);
    let speed = field(parse_code(&group[3..5], 2, "ff"), group);
    obs.wind_speed = wind_speed(speed, group, cursor, scope)?;
    Ok(())
}

fn decode_temperature_group(group: &str, obs: &mut Observation, _: &ReportScope) {
    obs.temperature = field(decode_signed_temperature(&group[1..]), group);
}

/// `2snTdTdTd` dew point, or `29UUU` relative humidity
fn decode_humidity_group(group: &str, obs: &mut Observation, _: &ReportScope) {
    if group.len() == 5 && &group[1..2] == "9" {
        obs.relative_humidity = field(parse_code(&group[2..], 3, "UUU"), group)
            .filter(|&rh| rh <= 100)
            .map(f64::from);
    } else {
        obs.dew_point = field(decode_signed_temperature(&group[1..]), group);
    }
}

/// Station level pressure is decoded for validation only
fn decode_station_pressure_group(group: &str, _: &mut Observation, _: &ReportScope) {
    let pressure = field(decode_pressure(&group[1..]), group);
    trace!("Station pressure {:?} not retained", pressure);
}

fn decode_pressure_group(group: &str, obs: &mut Observation, _: &ReportScope) {
    obs.pressure = field(decode_pressure(&group[1..]), group);
}

fn decode_tendency_group(group: &str, obs: &mut Observation, _: &ReportScope) {
    if let Some((tendency, change)) = field(decode_tendency(&group[1..]).map(Some), group) {
        obs.pressure_tendency = tendency;
        obs.pressure_change = change;
    }
}

/// `6RRRtR`: amount and accumulation period
fn decode_precipitation_group(group: &str, obs: &mut Observation, _: &ReportScope) {
    obs.precipitation = field(decode_precipitation(&group[1..4]), group);
    obs.precipitation_period = field(decode_precipitation_period(&group[4..5]), group);
}

/// `7wwW1W2`: present and past weather
fn decode_weather_group(group: &str, obs: &mut Observation, _: &ReportScope) {
    obs.present_weather = field(parse_code(&group[1..3], 2, "ww"), group).map(|ww| ww as u8);
    obs.past_weather_1 = field(decode_digit(&group[3..4], "W1"), group);
    obs.past_weather_2 = field(decode_digit(&group[4..5], "W2"), group);
}

/// `8NhCLCMCH`: amount of the lowest clouds and cloud types.
///
/// `Nh` refers to the low clouds if there are any, otherwise to the
/// middle clouds.
fn decode_cloud_group(group: &str, obs: &mut Observation, _: &ReportScope) {
    let amount = field(decode_digit(&group[1..2], "Nh"), group);
    obs.low_cloud_type = field(decode_digit(&group[2..3], "CL"), group);
    obs.mid_cloud_type = field(decode_digit(&group[3..4], "CM"), group);
    obs.high_cloud_type = field(decode_digit(&group[4..5], "CH"), group);

    match (obs.low_cloud_type, obs.mid_cloud_type) {
        (Some(cl), _) if cl != 0 => obs.low_cloud_cover = amount,
        (_, Some(cm)) if cm != 0 => obs.mid_cloud_cover = amount,
        _ if amount == Some(0) => obs.low_cloud_cover = amount,
        _ => {}
    }
}

/// `9GGgg`: exact time of observation, not used
fn decode_time_group(group: &str, _: &mut Observation, _: &ReportScope) {
    trace!("Skipping time group '{}'", group);
}

/// Section 2 after its `222Dsvs` marker: sea surface temperature
fn decode_sea_section(cursor: &mut FieldCursor<'_>, obs: &mut Observation) -> Step<()> {
    if let Some(group) = cursor.peek()? {
        if group.starts_with('0') && is_five_ascii(group) {
            cursor.read_mandatory("0snTwTwTw")?;
            obs.sea_surface_temperature = field(decode_signed_temperature(&group[1..]), group);
        }
    }
    Ok(())
}

/// Cloud amounts of the `8NsChshs` layers, by level
#[derive(Debug, Default)]
struct Layers {
    low: Option<u8>,
    mid: Option<u8>,
    high: Option<u8>,
}

impl Layers {
    fn add(&mut self, amount: u8, genus: u8) {
        let level = match genus {
            0..=2 => &mut self.high,
            3..=5 => &mut self.mid,
            _ => &mut self.low,
        };
        *level = Some(level.map_or(amount, |current| current.max(amount)));
    }

    fn fill(&self, obs: &mut Observation) {
        obs.low_cloud_cover = obs.low_cloud_cover.or(self.low);
        obs.mid_cloud_cover = obs.mid_cloud_cover.or(self.mid);
        obs.high_cloud_cover = obs.high_cloud_cover.or(self.high);
    }
}

/// Section 3 after its `333` marker.
///
/// Extremes are only taken while the groups are still in ascending order;
/// gust groups `910ff` and `911ff` are also looked for in section 5, and
/// `911` wins over `910`.
pub fn decode_regional_section(
    cursor: &mut FieldCursor<'_>,
    obs: &mut Observation,
    scope: &ReportScope,
) -> Step<()> {
    let mut last = 0u8;
    let mut national = false;
    let mut layers = Layers::default();
    let mut gust_910 = None;
    let mut gust_911 = None;

    while let Some(group) = cursor.read_optional("section 3")? {
        if group == sections::NATIONAL {
            national = true;
            continue;
        }
        if !is_five_ascii(group) {
            continue;
        }

        if group.starts_with("910") || group.starts_with("911") {
            let speed = field(parse_code(&group[3..5], 2, "ff"), group);
            let gust = gust_speed(speed, group, cursor, scope)?;
            if group.starts_with("911") {
                gust_911 = gust.or(gust_911);
            } else {
                gust_910 = gust.or(gust_910);
            }
            continue;
        }
        if national {
            continue;
        }

        let Some(digit) = group.chars().next().and_then(|c| c.to_digit(10)) else {
            continue;
        };
        let digit = digit as u8;
        match digit {
            1 if last < 1 => {
                obs.max_temperature = field(decode_signed_temperature(&group[1..]), group);
            }
            2 if last < 2 => {
                obs.min_temperature = field(decode_signed_temperature(&group[1..]), group);
            }
            6 if obs.precipitation.is_none() => {
                obs.precipitation = field(decode_precipitation(&group[1..4]), group);
                obs.precipitation_period =
                    field(decode_precipitation_period(&group[4..5]), group);
            }
            8 => {
                let amount = field(decode_digit(&group[1..2], "Ns"), group);
                let genus = field(decode_digit(&group[2..3], "C"), group);
                if let (Some(amount), Some(genus)) = (amount, genus) {
                    layers.add(amount, genus);
                }
            }
            _ => {}
        }
        last = last.max(digit);
    }

    layers.fill(obs);
    if let Some(gust) = gust_911.or(gust_910) {
        obs.wind_gust = Some(gust);
    }
    Ok(())
}
