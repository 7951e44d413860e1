pub mod bibs;
pub mod checkpoints;
pub mod document;
pub mod legacy;
pub mod runner;

pub use checkpoints::ExclusionSet;
pub use document::Document;

use crate::error::Result;
use crate::model::{CheckpointInfo, RunnerRecord};

/// A parsed runner page. Checkpoint geometry, when asked for, is read
/// separately so a geometry failure never costs the runner's record.
pub struct RunnerPage {
    pub record: RunnerRecord,
    pub checkpoints: Option<Result<CheckpointInfo>>,
}

pub fn process_runner_page(
    xml: &str,
    year: u16,
    bib: &str,
    excluded: &ExclusionSet,
    with_checkpoints: bool,
) -> Result<RunnerPage> {
    let doc = Document::parse(xml)?;
    let record = runner::normalize(&doc, year, bib, excluded)?;
    let checkpoints = with_checkpoints.then(|| checkpoints::extract(&doc, year, excluded));
    Ok(RunnerPage { record, checkpoints })
}
