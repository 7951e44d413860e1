use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::{Edition, LegacyEdition, Settings};
use crate::fetch::Source;
use crate::model::{CheckpointInfo, RunnerRecord};
use crate::parser::{self, bibs, legacy, Document, ExclusionSet};
use crate::store::{Accumulator, OutputPaths};

/// Counts for one edition.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct YearStats {
    pub bibs: usize,
    pub ok: usize,
    pub skipped: usize,
}

/// Totals returned after a full run.
#[derive(Debug, Default)]
pub struct ScrapeStats {
    pub years: usize,
    pub runners: usize,
    pub skipped: usize,
}

/// Bib numbers listed on a ranking page. A failed fetch means no runners
/// for that year, not a failed run.
pub async fn fetch_bib_numbers<S: Source>(source: &S, url: &str) -> Vec<String> {
    match source.fetch(url).await {
        Ok(markup) => bibs::extract(&markup),
        Err(e) => {
            warn!("Failed to retrieve ranking page: {}", e);
            Vec::new()
        }
    }
}

/// Checkpoint geometry of an edition, from the first runner page that parses.
pub async fn fetch_checkpoints<S: Source>(
    source: &S,
    edition: &Edition,
    excluded: &ExclusionSet,
) -> Option<CheckpointInfo> {
    for bib in fetch_bib_numbers(source, &edition.ranking_url).await {
        let page = match source.fetch(&edition.runner_page(&bib)).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Skipping bib {}: {}", bib, e);
                continue;
            }
        };
        let info = Document::parse(&page)
            .and_then(|doc| parser::checkpoints::extract(&doc, edition.year, excluded));
        match info {
            Ok(info) => return Some(info),
            Err(e) => warn!("Skipping bib {}: {}", bib, e),
        }
    }
    None
}

/// Scrape every runner of one edition into `acc`.
pub async fn scrape_edition<S: Source>(
    source: &S,
    edition: &Edition,
    excluded: &ExclusionSet,
    acc: &mut Accumulator,
) -> YearStats {
    let bibs = fetch_bib_numbers(source, &edition.ranking_url).await;
    let mut stats = YearStats {
        bibs: bibs.len(),
        ..Default::default()
    };
    if bibs.is_empty() {
        warn!("No runners found for {}", edition.year);
        return stats;
    }

    let pb = progress_bar(bibs.len(), edition.year);
    let mut have_checkpoints = false;

    for bib in &bibs {
        match scrape_runner(source, edition, bib, excluded, !have_checkpoints).await {
            Ok(page) => {
                match page.checkpoints {
                    Some(Ok(info)) => {
                        acc.push_checkpoints(info);
                        have_checkpoints = true;
                    }
                    Some(Err(e)) => pb.suspend(|| {
                        warn!("No checkpoints from {} bib {}, trying next page: {}", edition.year, bib, e)
                    }),
                    None => {}
                }
                acc.push_record(page.record);
                stats.ok += 1;
            }
            Err(e) => {
                let what = if e.is_schema() { "unreadable page" } else { "fetch failed" };
                pb.suspend(|| warn!("Skipping {} bib {} ({}): {}", edition.year, bib, what, e));
                stats.skipped += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "{}: {} runners ({} skipped of {} bibs)",
        edition.year, stats.ok, stats.skipped, stats.bibs
    );
    stats
}

async fn scrape_runner<S: Source>(
    source: &S,
    edition: &Edition,
    bib: &str,
    excluded: &ExclusionSet,
    with_checkpoints: bool,
) -> crate::error::Result<parser::RunnerPage> {
    let page = source.fetch(&edition.runner_page(bib)).await?;
    parser::process_runner_page(&page, edition.year, bib, excluded, with_checkpoints)
}

/// Records of the flat-table edition. A failed fetch or unreadable table
/// is logged and yields nothing.
pub async fn scrape_legacy<S: Source>(source: &S, edition: &LegacyEdition) -> Vec<RunnerRecord> {
    let table = match source.fetch(&edition.url).await {
        Ok(table) => table,
        Err(e) => {
            warn!("Failed to retrieve {} ranking table: {}", edition.year, e);
            return Vec::new();
        }
    };

    match Document::parse(&table).and_then(|doc| legacy::records(&doc, edition.year)) {
        Ok(records) => {
            info!("{}: {} runners from ranking table", edition.year, records.len());
            records
        }
        Err(e) => {
            warn!("Unreadable {} ranking table: {}", edition.year, e);
            Vec::new()
        }
    }
}

/// Full run: every edition in order, flushing both tables after each one,
/// then the legacy edition and a final flush.
pub async fn run<S: Source>(
    source: &S,
    settings: &Settings,
    paths: &OutputPaths,
    acc: &mut Accumulator,
) -> Result<ScrapeStats> {
    let excluded = settings.exclusions();
    let mut stats = ScrapeStats::default();

    for edition in &settings.editions {
        let year = scrape_edition(source, edition, &excluded, acc).await;
        stats.years += 1;
        stats.runners += year.ok;
        stats.skipped += year.skipped;

        acc.flush(paths)
            .with_context(|| format!("failed to save results after {}", edition.year))?;
    }

    if let Some(edition) = &settings.legacy {
        let records = scrape_legacy(source, edition).await;
        stats.years += 1;
        stats.runners += records.len();
        acc.extend_records(records);
    }

    acc.flush(paths).context("failed to save final results")?;
    Ok(stats)
}

fn progress_bar(len: usize, year: u16) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} [{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(format!("Processing {year} results"));
    pb
}
