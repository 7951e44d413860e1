mod config;
mod error;
mod fetch;
mod model;
mod parser;
mod scraper;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use config::Settings;
use fetch::HttpSource;
use store::Accumulator;

#[derive(Parser)]
#[command(name = "stl_scraper", about = "SaintéLyon results scraper (livetrail.net)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every edition and write the results and checkpoint tables
    Run {
        /// Only scrape these years (repeatable; default: all)
        #[arg(short, long)]
        year: Vec<u16>,
        /// Leave out the ranking-table-only edition
        #[arg(long)]
        skip_legacy: bool,
        /// Results table path
        #[arg(long)]
        results: Option<PathBuf>,
        /// Checkpoint table path
        #[arg(long)]
        checkpoints: Option<PathBuf>,
    },
    /// Print one edition's checkpoints
    Checkpoints {
        #[arg(short, long)]
        year: u16,
    },
    /// Summarise an existing results table
    Stats {
        /// Results table path (default: configured path)
        #[arg(long)]
        results: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    match cli.command {
        Commands::Run {
            year,
            skip_legacy,
            results,
            checkpoints,
        } => {
            settings.restrict_to(&year);
            if skip_legacy {
                settings.legacy = None;
            }
            if let Some(path) = results {
                settings.results_path = path;
            }
            if let Some(path) = checkpoints {
                settings.checkpoints_path = path;
            }

            let paths = settings.output_paths();
            let mut acc = Accumulator::default();
            let stats = scraper::run(&HttpSource::new(), &settings, &paths, &mut acc).await?;

            println!(
                "Done: {} runners over {} editions ({} bibs skipped).",
                stats.runners, stats.years, stats.skipped
            );
            println!(
                "Saved {} rows to {} and {} rows to {}",
                acc.records().len(),
                paths.results.display(),
                acc.checkpoints().len(),
                paths.checkpoints.display()
            );
        }
        Commands::Checkpoints { year } => {
            let edition = settings
                .edition(year)
                .with_context(|| format!("no edition configured for {}", year))?;
            let Some(info) =
                scraper::fetch_checkpoints(&HttpSource::new(), edition, &settings.exclusions()).await
            else {
                println!("No readable runner page for {}.", year);
                return Ok(());
            };

            println!("{:>3} | {:<28} | {:>7} | {:>6} | {:>6}", "#", "Checkpoint", "km", "alt", "D+");
            println!("{}", "-".repeat(62));
            for (i, cp) in info.checkpoints.iter().enumerate() {
                println!(
                    "{:>3} | {:<28} | {:>7} | {:>6} | {:>6}",
                    i, cp.name, cp.distance, cp.height, cp.elevation_gain
                );
            }
        }
        Commands::Stats { results } => {
            let path = results.unwrap_or(settings.results_path);
            let records = store::read_results(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            if records.is_empty() {
                println!("No results in {}.", path.display());
                return Ok(());
            }

            println!("{:>6} | {:>8} | {:>9} | {:>9}", "Year", "Runners", "Last slot", "Reached");
            println!("{}", "-".repeat(44));
            for (year, y) in store::summarize(&records).iter().rev() {
                let slot = y.last_slot.map(|s| format!("Pt{s}")).unwrap_or_else(|| "-".into());
                println!("{:>6} | {:>8} | {:>9} | {:>9}", year, y.runners, slot, y.reached_last);
            }
            println!("\n{} runners in {}", records.len(), path.display());
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
