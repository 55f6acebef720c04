//! Configuration management and validation.
//!
//! Provides the settings consumed by the report decoder and the file
//! batch driver.

use crate::error::{Result, SynopError};
use crate::models::{ReportKind, WindUnit};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Decoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Code form to look for in the input texts
    pub kind: ReportKind,

    /// Round observation times to the nearest main synoptic hour
    pub round_to_synoptic_hour: bool,

    /// Override the wind unit announced by the report header
    pub wind_unit: Option<WindUnit>,

    /// Time that day/hour stamps are resolved against (None = wall clock)
    pub reference_time: Option<DateTime<Utc>>,

    /// Number of files decoded concurrently
    pub max_concurrent_files: usize,

    /// Glob applied to file names found when walking directories
    pub file_pattern: Option<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            kind: ReportKind::Land,
            round_to_synoptic_hour: false,
            wind_unit: None,
            reference_time: None,
            max_concurrent_files: num_cpus::get().max(1),
            file_pattern: None,
        }
    }
}

impl DecoderConfig {
    /// Create configuration for a report kind
    pub fn for_kind(kind: ReportKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Enable rounding to the 3-hourly synoptic grid
    pub fn with_synoptic_rounding(mut self) -> Self {
        self.round_to_synoptic_hour = true;
        self
    }

    /// Force the wind unit regardless of the header indicator
    pub fn with_wind_unit(mut self, unit: WindUnit) -> Self {
        self.wind_unit = Some(unit);
        self
    }

    /// Resolve timestamps against a fixed time instead of the wall clock
    pub fn with_reference_time(mut self, time: DateTime<Utc>) -> Self {
        self.reference_time = Some(time);
        self
    }

    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Only decode files whose name matches the glob
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = Some(pattern.into());
        self
    }

    /// Reference time, falling back to the current time
    pub fn resolve_reference_time(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    /// Check the configuration for values the decoder cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_files == 0 {
            return Err(SynopError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }

        if let Some(time) = self.reference_time {
            if time.year() < 1950 {
                return Err(SynopError::Configuration {
                    message: format!("reference time {} predates SYNOP reports", time),
                });
            }
        }

        if let Some(pattern) = &self.file_pattern {
            glob::Pattern::new(pattern).map_err(|e| SynopError::Pattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
        }

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}
