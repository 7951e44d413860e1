use std::collections::HashMap;

use super::checkpoints::{checkpoint_refs, CheckpointRef, ExclusionSet};
use super::document::Document;
use crate::error::Result;
use crate::model::{empty_slots, Achievement, RunnerRecord, Slot, Split, SLOT_COUNT};

/// One `pass/e` entry. Runners only get entries where a time was taken,
/// so this is a sparse, ordered subsequence of the declared checkpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub checkpoint: String,
    pub time: String,
    pub rank: Option<String>,
}

impl Passage {
    pub fn new(checkpoint: &str, time: &str, rank: Option<&str>) -> Self {
        Self {
            checkpoint: checkpoint.to_string(),
            time: time.to_string(),
            rank: rank.map(str::to_string),
        }
    }
}

/// Build a runner's record from their page.
///
/// `identite`, `state` and `pts` must exist; everything the source
/// sometimes leaves out resolves to `None` (or an empty club).
pub fn normalize(doc: &Document, year: u16, bib: &str, excluded: &ExclusionSet) -> Result<RunnerRecord> {
    let identity = doc.expect("identite")?;
    let state = doc.expect("state")?;

    let checkpoints = checkpoint_refs(doc)?;
    let passages = doc
        .find_all("pass", "e")
        .map(|e| {
            Ok(Passage::new(
                e.require("idpt")?,
                e.require("tps")?,
                e.attrs.get("clt"),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let achievements = doc
        .find_all("palm", "e")
        .map(|e| {
            Ok(Achievement {
                year: e.require("year")?.to_string(),
                race: e.require("race")?.to_string(),
                position: e.require("pos")?.to_string(),
                time: e.require("tps")?.to_string(),
                distance: e.require("dist")?.to_string(),
                elevation_gain: e.attrs.opt("deniv"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RunnerRecord {
        year,
        bib: bib.to_string(),
        last_name: identity.require("nom")?.to_string(),
        first_name: identity.attrs.opt("prenom"),
        sex: identity.require("sx")?.to_string(),
        category: identity.require("cat")?.to_string(),
        club: identity.attrs.opt("club").unwrap_or_default(),
        nationality: identity.require("nat")?.to_string(),
        global_rank: state.require("clt")?.to_string(),
        category_rank: state.attrs.opt("cltcat"),
        gender_rank: state.attrs.opt("cltsx"),
        utmb_index: doc.find("palm").and_then(|p| p.attrs.opt("cote")),
        splits: align_splits(&checkpoints, &passages, excluded),
        achievements,
    })
}

/// Place each recorded passage in the slot of the checkpoint it belongs to.
///
/// Walks the declared checkpoints with a cursor into `passages`. A
/// passage is consumed only when its checkpoint id matches the current
/// checkpoint; otherwise the slot stays missing and the cursor waits.
///
/// Excluded checkpoints take no slot. The cursor skips over an excluded
/// passage only while the walk is on an excluded checkpoint, whichever
/// one it is. A passage at an excluded point that the walk has already
/// left behind stalls the cursor, and every later slot reads as missing.
pub fn align_splits(
    checkpoints: &[CheckpointRef],
    passages: &[Passage],
    excluded: &ExclusionSet,
) -> [Slot; SLOT_COUNT] {
    let names: HashMap<&str, &str> = checkpoints
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    let is_excluded = |id: &str| names.get(id).is_some_and(|name| excluded.contains(name));

    let mut slots = empty_slots();
    let mut slot = 0;
    let mut cursor = 0;

    for cp in checkpoints {
        if slot == SLOT_COUNT {
            break;
        }
        let next = passages.get(cursor);

        if excluded.contains(&cp.name) {
            if next.is_some_and(|p| is_excluded(&p.checkpoint)) {
                cursor += 1;
            }
            continue;
        }

        if let Some(p) = next.filter(|p| p.checkpoint == cp.id) {
            slots[slot] = Some(Split::new(&p.time, p.rank.as_deref()));
            cursor += 1;
        }
        slot += 1;
    }

    slots
}
