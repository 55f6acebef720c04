use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::sync::Arc;
use std::time::Instant;
use synop_decoder::cli::{Args, setup_logging};
use synop_decoder::processor::discovery::discover_inputs;
use synop_decoder::{BatchProcessor, BatchResult, StationRegistry, StationResolver};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args)?;

    let config = args.to_config()?;
    let files = discover_inputs(&args.inputs, config.file_pattern.as_deref())
        .context("Failed to enumerate inputs")?;

    if files.is_empty() {
        warn!("No input files found");
        return Ok(());
    }

    let resolver: Arc<dyn StationResolver> = match &args.stations {
        Some(path) => {
            let registry = StationRegistry::from_csv(path)
                .with_context(|| format!("Failed to load stations from {}", path.display()))?;
            info!("Loaded {} stations", registry.station_count());
            Arc::new(registry)
        }
        None => {
            if config.kind == synop_decoder::ReportKind::Land {
                warn!("No station list given; all land reports will be unresolved");
            }
            Arc::new(StationRegistry::new())
        }
    };

    let start_time = Instant::now();
    let processor = BatchProcessor::new(config, resolver).with_progress(args.show_progress());
    let result = processor.decode_files(&files).await;

    if args.list {
        print_observations(&result);
    }
    print_summary(&result, start_time.elapsed().as_millis());
    Ok(())
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.1}", v))
}

fn print_observations(result: &BatchResult) {
    for obs in &result.observations {
        let (latitude, longitude) = obs.station.position();
        println!(
            "{} {:>8} {:<20} {:>8.3} {:>9.3}  T {:>6} Td {:>6} P {:>7} dd {:>4} ff {:>5}",
            obs.time.format("%Y-%m-%d %H:%M"),
            obs.station.id(),
            obs.station.name(),
            latitude,
            longitude,
            format_value(obs.temperature),
            format_value(obs.dew_point),
            format_value(obs.pressure),
            obs.wind_direction.map_or_else(|| "-".to_string(), |d| d.to_string()),
            format_value(obs.wind_speed),
        );
    }
}

fn print_summary(result: &BatchResult, elapsed_ms: u128) {
    let stats = &result.stats;

    println!("\n{}", "Decoding Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        elapsed_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {} in {} blocks",
        "Reports:".bright_cyan(),
        stats.instances.to_string().bright_white(),
        stats.blocks
    );
    println!(
        "  {} {}  {} {}  {} {}  {} {}",
        "Decoded:".bright_cyan(),
        stats.decoded.to_string().bright_white().bold(),
        "Empty:".bright_cyan(),
        stats.empty,
        "Ignored:".bright_cyan(),
        stats.ignored,
        "Malformed:".bright_yellow(),
        stats.malformed
    );
    println!(
        "  {} {:.1}%",
        "Success rate:".bright_cyan(),
        stats.success_rate()
    );

    let per_station = result.observations_per_station();
    if !per_station.is_empty() {
        println!("\n{}", "Observations per station".bright_green());
        for (name, count) in &per_station {
            println!("  {:<24} {}", name, count);
        }
    }

    if !result.unresolved_stations.is_empty() {
        let ids: Vec<String> = result
            .unresolved_stations
            .iter()
            .map(|id| format!("{:05}", id))
            .collect();
        println!(
            "\n{} {}",
            "Unresolved stations:".bright_yellow(),
            ids.join(" ")
        );
    }
}
