use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScrapeError};
use crate::model::{Achievement, CheckpointInfo, RunnerRecord, Split, SLOT_COUNT};

const IDENTITY_HEADERS: [&str; 12] = [
    "Year",
    "Bib Number",
    "Last Name",
    "First Name",
    "Sex",
    "Category",
    "Club",
    "Nationality",
    "Global Rank",
    "Category Rank",
    "Gender Rank",
    "UTMB Index",
];
const ACHIEVEMENTS_HEADER: &str = "Past Achievements";

/// Output locations for the two tables.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub results: PathBuf,
    pub checkpoints: PathBuf,
}

/// Everything scraped so far in this run. Append-only; `flush` rewrites
/// both tables from scratch.
#[derive(Debug, Default)]
pub struct Accumulator {
    records: Vec<RunnerRecord>,
    checkpoints: Vec<CheckpointInfo>,
}

impl Accumulator {
    pub fn push_record(&mut self, record: RunnerRecord) {
        self.records.push(record);
    }

    pub fn extend_records(&mut self, records: impl IntoIterator<Item = RunnerRecord>) {
        self.records.extend(records);
    }

    pub fn push_checkpoints(&mut self, info: CheckpointInfo) {
        self.checkpoints.push(info);
    }

    pub fn records(&self) -> &[RunnerRecord] {
        &self.records
    }

    pub fn checkpoints(&self) -> &[CheckpointInfo] {
        &self.checkpoints
    }

    pub fn flush(&self, paths: &OutputPaths) -> Result<()> {
        write_results(&paths.results, &self.records)?;
        write_checkpoints(&paths.checkpoints, &self.checkpoints)?;
        Ok(())
    }
}

pub fn results_header() -> Vec<String> {
    let mut header: Vec<String> = IDENTITY_HEADERS.iter().map(|h| h.to_string()).collect();
    for i in 0..SLOT_COUNT {
        header.push(format!("Pt{i} time"));
        header.push(format!("Pt{i} rank"));
    }
    header.push(ACHIEVEMENTS_HEADER.to_string());
    header
}

pub fn write_results(path: &Path, records: &[RunnerRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(results_header())?;

    for r in records {
        let mut row = vec![
            r.year.to_string(),
            r.bib.clone(),
            r.last_name.clone(),
            r.first_name.clone().unwrap_or_default(),
            r.sex.clone(),
            r.category.clone(),
            r.club.clone(),
            r.nationality.clone(),
            r.global_rank.clone(),
            r.category_rank.clone().unwrap_or_default(),
            r.gender_rank.clone().unwrap_or_default(),
            r.utmb_index.clone().unwrap_or_default(),
        ];
        for slot in &r.splits {
            match slot {
                Some(split) => {
                    row.push(split.time.clone());
                    row.push(split.rank.clone());
                }
                None => row.extend([String::new(), String::new()]),
            }
        }
        row.push(serde_json::to_string(&r.achievements)?);
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// One row per edition. Columns cover the edition with the most
/// checkpoints; shorter editions leave their trailing cells empty.
pub fn write_checkpoints(path: &Path, infos: &[CheckpointInfo]) -> Result<()> {
    let width = infos.iter().map(|i| i.checkpoints.len()).max().unwrap_or(0);

    let mut header = vec!["Year".to_string()];
    for i in 0..width {
        header.push(format!("Pt{i} name"));
        header.push(format!("Pt{i} distance"));
        header.push(format!("Pt{i} height"));
        header.push(format!("Pt{i} total elevation"));
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&header)?;

    for info in infos {
        let mut row = vec![info.year.to_string()];
        for cp in &info.checkpoints {
            row.extend([
                cp.name.clone(),
                cp.distance.clone(),
                cp.height.clone(),
                cp.elevation_gain.clone(),
            ]);
        }
        row.resize(header.len(), String::new());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read a results table back. Empty cells become absent values and
/// missing slots.
pub fn read_results(path: &Path) -> Result<Vec<RunnerRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let cell = |i: usize| row.get(i).unwrap_or("").to_string();
        let opt = |i: usize| Some(cell(i)).filter(|v| !v.is_empty());

        let mut splits: [Option<Split>; SLOT_COUNT] = Default::default();
        for (slot, split) in splits.iter_mut().enumerate() {
            let base = IDENTITY_HEADERS.len() + slot * 2;
            *split = opt(base).map(|time| Split {
                time,
                rank: cell(base + 1),
            });
        }

        let achievements_col = IDENTITY_HEADERS.len() + SLOT_COUNT * 2;
        let achievements: Vec<Achievement> = match opt(achievements_col) {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        records.push(RunnerRecord {
            year: cell(0).parse().map_err(|_| ScrapeError::InvalidCell {
                column: "Year",
                value: cell(0),
            })?,
            bib: cell(1),
            last_name: cell(2),
            first_name: opt(3),
            sex: cell(4),
            category: cell(5),
            club: cell(6),
            nationality: cell(7),
            global_rank: cell(8),
            category_rank: opt(9),
            gender_rank: opt(10),
            utmb_index: opt(11),
            splits,
            achievements,
        });
    }

    Ok(records)
}

/// Per-edition counts for a results table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct YearSummary {
    pub runners: usize,
    /// Furthest slot any runner of the edition has a time for.
    pub last_slot: Option<usize>,
    /// Runners timed at `last_slot`.
    pub reached_last: usize,
}

pub fn summarize(records: &[RunnerRecord]) -> BTreeMap<u16, YearSummary> {
    let mut years: BTreeMap<u16, YearSummary> = BTreeMap::new();
    for r in records {
        let y = years.entry(r.year).or_default();
        y.runners += 1;

        let Some((slot, _)) = r.last_split() else { continue };
        match y.last_slot {
            Some(last) if slot < last => {}
            Some(last) if slot == last => y.reached_last += 1,
            _ => {
                y.last_slot = Some(slot);
                y.reached_last = 1;
            }
        }
    }
    years
}
