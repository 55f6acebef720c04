//! Command-line interface components.

use crate::config::DecoderConfig;
use crate::error::{Result, SynopError};
use crate::models::{ReportKind, WindUnit};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "synop")]
#[command(about = "Decode WMO SYNOP, SHIP and BUOY reports into observations")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Bulletin files, directories or glob patterns
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Report kind to decode (land, ship, buoy)
    #[arg(short, long, value_name = "KIND", default_value = "land")]
    pub kind: ReportKind,

    /// Round observation times to the nearest synoptic hour
    #[arg(long)]
    pub round: bool,

    /// Treat all wind speeds as knots
    #[arg(long, conflicts_with = "metres_per_second")]
    pub knots: bool,

    /// Treat all wind speeds as metres per second
    #[arg(long)]
    pub metres_per_second: bool,

    /// Resolve day/hour stamps against this time instead of now (RFC 3339)
    #[arg(long, value_name = "TIME")]
    pub reference_time: Option<DateTime<Utc>>,

    /// Number of files decoded concurrently
    #[arg(short, long, value_name = "COUNT")]
    pub jobs: Option<usize>,

    /// File name glob applied when walking input directories
    #[arg(short, long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Station list CSV with id,name,latitude,longitude columns
    #[arg(short, long, value_name = "FILE")]
    pub stations: Option<PathBuf>,

    /// Print one line per decoded observation
    #[arg(short, long)]
    pub list: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Progress bars are hidden in quiet mode
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Wind unit forced on the command line
    pub fn wind_unit(&self) -> Option<WindUnit> {
        if self.knots {
            Some(WindUnit::Knots)
        } else if self.metres_per_second {
            Some(WindUnit::MetresPerSecond)
        } else {
            None
        }
    }

    /// Build and validate the decoder configuration
    pub fn to_config(&self) -> Result<DecoderConfig> {
        let mut config = DecoderConfig::for_kind(self.kind);
        if self.round {
            config = config.with_synoptic_rounding();
        }
        if let Some(unit) = self.wind_unit() {
            config = config.with_wind_unit(unit);
        }
        if let Some(time) = self.reference_time {
            config = config.with_reference_time(time);
        }
        if let Some(jobs) = self.jobs {
            config = config.with_max_concurrent_files(jobs);
        }
        if let Some(pattern) = &self.pattern {
            config = config.with_file_pattern(pattern.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

/// Set up structured logging on stderr; `RUST_LOG` overrides the level
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("synop_decoder={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| SynopError::Configuration {
            message: format!("cannot initialise logging: {}", e),
        })?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
