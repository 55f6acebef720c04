//! Error handling for SYNOP decoding operations.
//!
//! `SynopError` covers failures around the decoder (input files, station
//! lists, configuration). `ValueError` describes why a single coded field
//! could not be turned into a value; it never escapes the report decoder.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynopError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Input not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Invalid station file: {path} - {reason}")]
    StationFile { path: PathBuf, reason: String },

    #[error("Invalid input pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type Result<T> = std::result::Result<T, SynopError>;

/// Failure to decode one fixed-width coded field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("{field}: unexpected characters in '{value}'")]
    InvalidCharacters { field: &'static str, value: String },

    #[error("{field}: expected {expected} characters, found '{value}'")]
    WrongWidth {
        field: &'static str,
        expected: usize,
        value: String,
    },

    #[error("{field}: value {value} out of range")]
    OutOfRange { field: &'static str, value: u32 },

    #[error("unknown quadrant of the globe '{0}'")]
    UnknownQuadrant(char),
}
