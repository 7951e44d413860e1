use std::collections::HashSet;

use super::document::Document;
use crate::error::Result;
use crate::model::{Checkpoint, CheckpointInfo};

/// Checkpoint names that are not part of the race itself (start-line
/// animations, sponsor markers).
pub const DEFAULT_EXCLUDED: &[&str] = &["Animation 500m", "KM BV SPORT"];

#[derive(Debug, Clone)]
pub struct ExclusionSet(HashSet<String>);

impl ExclusionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED.iter().copied())
    }
}

/// One `pts/pt` entry: the id splits refer to, and its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointRef {
    pub id: String,
    pub name: String,
}

/// All declared checkpoints of a runner page, excluded ones included.
pub fn checkpoint_refs(doc: &Document) -> Result<Vec<CheckpointRef>> {
    doc.expect("pts")?;
    doc.find_all("pts", "pt")
        .map(|pt| {
            Ok(CheckpointRef {
                id: pt.require("idpt")?.to_string(),
                name: pt.require("n")?.to_string(),
            })
        })
        .collect()
}

/// Race geometry of one edition, read from any of its runner pages.
/// Slot `i` is the `i`-th checkpoint that survives the exclusion filter.
pub fn extract(doc: &Document, year: u16, excluded: &ExclusionSet) -> Result<CheckpointInfo> {
    doc.expect("pts")?;

    let mut checkpoints = Vec::new();
    for pt in doc.find_all("pts", "pt") {
        let name = pt.require("n")?;
        if excluded.contains(name) {
            continue;
        }
        checkpoints.push(Checkpoint {
            name: name.to_string(),
            distance: pt.require("km")?.to_string(),
            height: pt.require("a")?.to_string(),
            elevation_gain: pt.require("d")?.to_string(),
        });
    }

    Ok(CheckpointInfo { year, checkpoints })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;

    fn fixture(name: &str) -> Document {
        let xml = std::fs::read_to_string(format!("tests/fixtures/{}.xml", name)).unwrap();
        Document::parse(&xml).unwrap()
    }

    #[test]
    fn skips_animation_points() {
        let doc = fixture("runner_2023");
        let info = extract(&doc, 2023, &ExclusionSet::default()).unwrap();

        assert_eq!(info.year, 2023);
        let names: Vec<&str> = info.checkpoints.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["Saint-Etienne", "Sainte-Catherine", "Saint-Genou", "Soucieu", "Chaponost", "Lyon"]
        );
        let first = &info.checkpoints[0];
        assert_eq!(first.distance, "0");
        assert_eq!(first.height, "520");
        assert_eq!(first.elevation_gain, "0");
    }

    #[test]
    fn extraction_is_repeatable() {
        let doc = fixture("runner_2023");
        let excluded = ExclusionSet::default();
        let a = extract(&doc, 2023, &excluded).unwrap();
        let b = extract(&doc, 2023, &excluded).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn refs_keep_excluded_points() {
        let doc = fixture("runner_2023");
        let refs = checkpoint_refs(&doc).unwrap();
        assert_eq!(refs.len(), 8);
        assert_eq!(refs[1].name, "Animation 500m");
    }

    #[test]
    fn custom_exclusions() {
        let doc = fixture("runner_2023");
        let info = extract(&doc, 2023, &ExclusionSet::new(["Lyon"])).unwrap();
        assert_eq!(info.checkpoints.len(), 7);
        assert!(info.checkpoints.iter().any(|c| c.name == "KM BV SPORT"));
    }

    #[test]
    fn ranking_page_is_not_a_runner_page() {
        let doc = fixture("legacy_2017");
        let err = extract(&doc, 2017, &ExclusionSet::default()).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingElement("pts")));
    }
}
