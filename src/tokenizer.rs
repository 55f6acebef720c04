//! Splitting of bulletin text into report blocks and report instances.
//!
//! A block starts at a block marker (`AAXX`, `BBXX` or `ZZYY`) and holds
//! one or more report instances terminated by `=`. Text after the last
//! terminator of a block belongs to the bulletin heading of the next block
//! and may carry a correction stamp such as `RRA`.

use crate::constants::INSTANCE_TERMINATOR;
use crate::models::ReportKind;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

static LAND_MARKER_ANY_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)AAXX").expect("valid marker regex"));
static SHIP_MARKER_ANY_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)BBXX").expect("valid marker regex"));
static BUOY_MARKER_ANY_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ZZYY").expect("valid marker regex"));

/// Correction stamps: RRx (delayed), CCx (corrected), AAx (amended)
static CORRECTION_STAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:RR|CC|AA)[A-Z]$").expect("valid correction regex"));

/// Text between two block markers
#[derive(Debug, Clone, PartialEq)]
pub struct Block<'a> {
    pub kind: ReportKind,
    /// Block content, leading line breaks removed
    pub text: &'a str,
    /// Heading text carried over from before the marker
    pub preamble: &'a str,
    /// Correction stamp found in the preamble
    pub correction: Option<String>,
}

impl<'a> Block<'a> {
    /// Split off the block header group.
    ///
    /// Land blocks start with a `YYGGiw` group shared by all reports of the
    /// block; ship and buoy reports carry their own header groups.
    pub fn header_and_body(&self) -> (Option<&'a str>, &'a str) {
        match self.kind {
            ReportKind::Land => {
                let text = self.text.trim_start();
                match text.find(char::is_whitespace) {
                    Some(end) => (Some(&text[..end]), &text[end..]),
                    None if text.is_empty() => (None, text),
                    None => (Some(text), ""),
                }
            }
            ReportKind::Ship | ReportKind::Buoy => (None, self.text),
        }
    }

    /// Report instances of the block, blank instances dropped
    pub fn instances(&self) -> Vec<&'a str> {
        let (_, body) = self.header_and_body();
        split_instances(body)
    }
}

/// Split report text on the instance terminator
pub fn split_instances(body: &str) -> Vec<&str> {
    body.split(INSTANCE_TERMINATOR)
        .map(str::trim)
        .filter(|instance| !instance.is_empty())
        .collect()
}

/// Find the first correction stamp in a piece of heading text
pub fn find_correction(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|token| CORRECTION_STAMP.is_match(token))
        .map(|token| token.to_ascii_uppercase())
}

fn marker_any_case(kind: ReportKind) -> &'static Regex {
    match kind {
        ReportKind::Land => &LAND_MARKER_ANY_CASE,
        ReportKind::Ship => &SHIP_MARKER_ANY_CASE,
        ReportKind::Buoy => &BUOY_MARKER_ANY_CASE,
    }
}

/// Split bulletin text into blocks of the requested kind.
///
/// The upper case marker is tried first; when it never occurs the marker
/// is matched in any case. No marker at all yields no blocks.
pub fn split_blocks(text: &str, kind: ReportKind) -> Vec<Block<'_>> {
    let marker = kind.marker();
    let parts: Vec<&str> = if text.contains(marker) {
        text.split(marker).collect()
    } else {
        marker_any_case(kind).split(text).collect()
    };

    let Some((&first, raw_blocks)) = parts.split_first() else {
        return Vec::new();
    };
    if raw_blocks.is_empty() {
        trace!("No {} marker in text", marker);
        return Vec::new();
    }

    let mut carried = first;
    let block_count = raw_blocks.len();

    let mut blocks = Vec::with_capacity(block_count);
    for (index, &raw) in raw_blocks.iter().enumerate() {
        let raw = raw.trim_start_matches(['\r', '\n']);
        let is_last = index + 1 == block_count;

        // Text after the last terminator heads the next block
        let (body, leftover) = match raw.rfind(INSTANCE_TERMINATOR) {
            Some(pos) if !is_last => (&raw[..=pos], &raw[pos + 1..]),
            _ => (raw, ""),
        };

        blocks.push(Block {
            kind,
            text: body,
            preamble: carried.trim(),
            correction: find_correction(carried),
        });
        carried = leftover;
    }

    debug!("Split text into {} {} blocks", blocks.len(), kind);
    blocks
}
