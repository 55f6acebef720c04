//! SYNOP Decoder Library
//!
//! Decodes WMO synoptic weather reports in the SYNOP (AAXX), SHIP (BBXX)
//! and BUOY (ZZYY) code forms into structured observation records.
//!
//! This library provides tools for:
//! - Splitting bulletin text into report blocks and report instances
//! - Decoding fixed-width coded fields into physical values
//! - Decoding complete reports section by section, with per-report failures
//! - Resolving land station ids against a station list
//! - Decoding many bulletin files concurrently

pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod cursor;
pub mod decoder;
pub mod decoders;
pub mod error;
pub mod models;
pub mod processor;
pub mod stations;
pub mod tokenizer;

// Re-export commonly used types
pub use config::DecoderConfig;
pub use context::DecodeContext;
pub use decoder::{BlockContext, ReportDecoder};
pub use error::{Result, SynopError};
pub use models::{BatchResult, Observation, ReportKind, ReportOutcome, Station, WindUnit};
pub use processor::{BatchProcessor, decode_text};
pub use stations::{StationRegistry, StationResolver};
