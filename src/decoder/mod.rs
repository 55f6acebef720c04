//! Report decoder: turns one report instance into an observation.
//!
//! Decoding is organised as a state machine over the sections of the code
//! form. Transitions are driven by the leading digits of the next group,
//! because most groups are optional:
//!
//! - [`header`] - block header, station identity and observation time
//! - [`sections`] - land/ship sections 0 to 3
//! - [`buoy`] - buoy sections 1 and 2
//!
//! Every step returns `Result<_, Termination>`. `Termination::Empty` ends
//! the report early but keeps the fields decoded so far; the other variants
//! discard the observation.

pub mod buoy;
pub mod header;
pub mod sections;

#[cfg(test)]
pub mod tests;

use crate::config::DecoderConfig;
use crate::context::DecodeContext;
use crate::cursor::FieldCursor;
use crate::error::ValueError;
use crate::models::{Observation, ReportKind, ReportOutcome, WindUnit};
use crate::stations::StationResolver;
use crate::tokenizer::Block;
use chrono::{DateTime, Utc};
use tracing::trace;

pub use header::{BlockHeader, ReportHeader};

/// Why decoding of a report stopped before its natural end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// `NIL` or an absent section 0: valid, keep what was decoded
    Empty,
    /// Not a report this decoder should look at
    Ignorable(String),
    /// A mandatory group is absent or structurally invalid
    Malformed(String),
}

/// Result of one decoding step
pub type Step<T> = std::result::Result<T, Termination>;

/// Facts shared by all reports of one block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockContext {
    pub kind: ReportKind,
    /// `YYGGiw` group of land blocks
    pub header: Option<BlockHeader>,
    pub correction: Option<String>,
}

impl BlockContext {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            header: None,
            correction: None,
        }
    }

    pub fn with_header(mut self, header: BlockHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_correction(mut self, correction: impl Into<String>) -> Self {
        self.correction = Some(correction.into());
        self
    }

    /// Context for a tokenized block. Land blocks without a valid
    /// `YYGGiw` group cannot be dated and are ignored as a whole.
    pub fn from_block(block: &Block<'_>) -> Step<Self> {
        let (header_group, _) = block.header_and_body();
        let header = match block.kind {
            ReportKind::Land => {
                let group = header_group
                    .ok_or_else(|| Termination::Ignorable("empty land block".to_string()))?;
                let header = BlockHeader::parse(group).map_err(|e| {
                    Termination::Ignorable(format!("invalid block header '{}': {}", group, e))
                })?;
                Some(header)
            }
            ReportKind::Ship | ReportKind::Buoy => None,
        };

        Ok(Self {
            kind: block.kind,
            header,
            correction: block.correction.clone(),
        })
    }
}

/// Per-report values that influence later sections
#[derive(Debug, Clone)]
pub struct ReportScope {
    pub wind_unit: WindUnit,
    /// Precipitation indicator iR of section 0
    pub precipitation_indicator: Option<u8>,
}

impl ReportScope {
    pub fn new(wind_unit: WindUnit) -> Self {
        Self {
            wind_unit,
            precipitation_indicator: None,
        }
    }

    /// Apply what the indicators imply once all groups have been read
    pub fn finish(&self, obs: &mut Observation) {
        // iR = 3: no precipitation, group 6 omitted
        if self.precipitation_indicator == Some(3) && obs.precipitation.is_none() {
            obs.precipitation = Some(0.0);
        }
    }
}

/// Field value from a decode result; failures leave the field missing
pub(crate) fn field<T>(result: Result<Option<T>, ValueError>, group: &str) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Ignoring field of group '{}': {}", group, e);
            None
        }
    }
}

/// Decodes report instances of one kind against a fixed reference time
pub struct ReportDecoder<'a> {
    config: &'a DecoderConfig,
    resolver: &'a dyn StationResolver,
    reference_time: DateTime<Utc>,
}

impl<'a> ReportDecoder<'a> {
    /// Create a decoder; the reference time is fixed here
    pub fn new(config: &'a DecoderConfig, resolver: &'a dyn StationResolver) -> Self {
        Self {
            config,
            resolver,
            reference_time: config.resolve_reference_time(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        self.config
    }

    pub fn resolver(&self) -> &dyn StationResolver {
        self.resolver
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    /// Wind unit for a report: configuration override, then header
    /// indicator, then metres per second
    pub fn wind_unit(&self, announced: Option<WindUnit>) -> WindUnit {
        self.config
            .wind_unit
            .or(announced)
            .unwrap_or(WindUnit::MetresPerSecond)
    }

    /// Decode one report instance
    pub fn decode(
        &self,
        instance: &str,
        block: &BlockContext,
        ctx: &mut DecodeContext,
    ) -> ReportOutcome {
        let mut cursor = FieldCursor::new(instance);

        let header = match block.kind {
            ReportKind::Land => header::decode_land_header(self, &mut cursor, block, ctx),
            ReportKind::Ship => header::decode_ship_header(self, &mut cursor, block, ctx),
            ReportKind::Buoy => buoy::decode_buoy_header(self, &mut cursor, ctx),
        };

        let header = match header {
            Ok(header) => header,
            Err(Termination::Empty) => {
                return ReportOutcome::Ignorable {
                    reason: "NIL report without station position".to_string(),
                };
            }
            Err(Termination::Ignorable(reason)) => return ReportOutcome::Ignorable { reason },
            Err(Termination::Malformed(reason)) => return ReportOutcome::Malformed { reason },
        };

        let mut obs = Observation::new(block.kind, header.time, header.station);
        obs.correction = block.correction.clone();
        let mut scope = ReportScope::new(header.wind_unit);

        let body = match block.kind {
            ReportKind::Land | ReportKind::Ship => {
                sections::decode_body(&mut cursor, &mut obs, &mut scope)
            }
            ReportKind::Buoy => buoy::decode_buoy_body(&mut cursor, &mut obs, &mut scope),
        };
        scope.finish(&mut obs);

        trace!(
            "Report from {} ended after {} of {} groups",
            obs.station.name(),
            cursor.position(),
            cursor.tokens().len()
        );

        match body {
            Ok(()) => ReportOutcome::Success(obs),
            Err(Termination::Empty) => ReportOutcome::Empty(obs),
            Err(Termination::Ignorable(reason)) => ReportOutcome::Ignorable { reason },
            Err(Termination::Malformed(reason)) => ReportOutcome::Malformed { reason },
        }
    }
}
