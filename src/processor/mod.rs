//! Batch decoding of bulletin texts and files.
//!
//! `decode_text` runs the tokenizer and the report decoder over one text.
//! `BatchProcessor` decodes many files concurrently and merges their
//! results in input order.

pub mod discovery;

#[cfg(test)]
pub mod tests;

use crate::config::DecoderConfig;
use crate::context::DecodeContext;
use crate::decoder::{BlockContext, ReportDecoder, Termination};
use crate::error::{Result, SynopError};
use crate::models::{BatchResult, ReportOutcome};
use crate::stations::StationResolver;
use crate::tokenizer::split_blocks;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::task;
use tracing::{debug, error, info, trace};

/// First groups of an instance, used to identify it in diagnostics
fn instance_head(instance: &str) -> String {
    instance
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode every report of the decoder's kind found in `text`.
///
/// Failures are caught per report instance; a block whose header cannot
/// be read counts all of its instances as ignored.
pub fn decode_text(
    text: &str,
    decoder: &ReportDecoder<'_>,
    ctx: &mut DecodeContext,
) -> BatchResult {
    let mut result = BatchResult::new();

    for block in split_blocks(text, decoder.config().kind) {
        result.stats.blocks += 1;
        let instances = block.instances();

        let block_context = match BlockContext::from_block(&block) {
            Ok(context) => context,
            Err(Termination::Ignorable(reason)) | Err(Termination::Malformed(reason)) => {
                debug!("Ignoring block of {} reports: {}", instances.len(), reason);
                result.stats.instances += instances.len();
                result.stats.ignored += instances.len();
                continue;
            }
            Err(Termination::Empty) => continue,
        };

        for instance in instances {
            let outcome = decoder.decode(instance, &block_context, ctx);
            result.stats.record(&outcome);

            match outcome {
                ReportOutcome::Success(obs) | ReportOutcome::Empty(obs) => {
                    trace!("Decoded report from {}", obs.station.name());
                    result.observations.push(obs);
                }
                ReportOutcome::Ignorable { reason } => {
                    trace!("Ignored '{}': {}", instance_head(instance), reason);
                }
                ReportOutcome::Malformed { reason } => {
                    debug!("Malformed '{}': {}", instance_head(instance), reason);
                    result
                        .diagnostics
                        .push(format!("{}: {}", instance_head(instance), reason));
                }
            }
        }
    }

    result
        .unresolved_stations
        .extend(ctx.unresolved.iter().copied());
    result
}

/// Concurrent decoder for bulletin files
pub struct BatchProcessor {
    config: Arc<DecoderConfig>,
    resolver: Arc<dyn StationResolver>,
    show_progress: bool,
}

impl BatchProcessor {
    /// Create a processor. The reference time is fixed here so that all
    /// files are dated against the same instant.
    pub fn new(config: DecoderConfig, resolver: Arc<dyn StationResolver>) -> Self {
        let reference_time = config.resolve_reference_time();
        Self {
            config: Arc::new(config.with_reference_time(reference_time)),
            resolver,
            show_progress: false,
        }
    }

    /// Show a progress bar while decoding
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Decoding files");
        pb
    }

    /// Decode all files. A file that cannot be read or decoded is counted
    /// as failed and does not stop the batch.
    pub async fn decode_files(&self, files: &[PathBuf]) -> BatchResult {
        let pb = self.progress_bar(files.len());
        let concurrent_limit = self.config.max_concurrent_files.clamp(1, files.len().max(1));
        debug!(
            "Decoding {} files with concurrency {}",
            files.len(),
            concurrent_limit
        );

        let outcomes: Vec<(PathBuf, Result<(BatchResult, DecodeContext)>)> =
            stream::iter(files.iter().cloned())
                .map(|path| {
                    let config = Arc::clone(&self.config);
                    let resolver = Arc::clone(&self.resolver);
                    let pb = pb.clone();
                    async move {
                        if let Some(file_name) = path.file_name() {
                            pb.set_message(format!("Decoding: {}", file_name.to_string_lossy()));
                        }
                        let result = decode_file(&path, config, resolver).await;
                        pb.inc(1);
                        (path, result)
                    }
                })
                .buffered(concurrent_limit)
                .collect()
                .await;

        let mut combined = BatchResult::new();
        let mut ctx = DecodeContext::new();

        for (path, outcome) in outcomes {
            match outcome {
                Ok((mut result, file_ctx)) => {
                    let remap = ctx.ships.merge(file_ctx.ships);
                    result.remap_mobile_ids(&remap);
                    result.stats.files_processed += 1;
                    debug!(
                        "{}: {} observations",
                        path.display(),
                        result.observations.len()
                    );
                    combined.merge(result);
                }
                Err(e) => {
                    error!("Failed to decode {}: {}", path.display(), e);
                    combined.stats.files_failed += 1;
                    combined.diagnostics.push(e.to_string());
                }
            }
        }

        pb.finish_with_message("Decoding complete");
        info!(
            "Decoded {} observations from {} files ({} failed)",
            combined.observations.len(),
            combined.stats.files_processed,
            combined.stats.files_failed
        );
        combined
    }
}

/// Read one file and decode it on the blocking pool
async fn decode_file(
    path: &Path,
    config: Arc<DecoderConfig>,
    resolver: Arc<dyn StationResolver>,
) -> Result<(BatchResult, DecodeContext)> {
    let bytes = fs::read(path).await?;
    // bulletins occasionally carry stray non-UTF-8 bytes
    let text = String::from_utf8_lossy(&bytes).into_owned();

    task::spawn_blocking(move || {
        let decoder = ReportDecoder::new(&config, resolver.as_ref());
        let mut ctx = DecodeContext::new();
        let result = decode_text(&text, &decoder, &mut ctx);
        (result, ctx)
    })
    .await
    .map_err(|e| SynopError::ProcessingFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
