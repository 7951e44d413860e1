use super::document::Document;
use crate::error::Result;
use crate::model::{empty_slots, RunnerRecord, Split, SLOT_COUNT};

/// Records from a flat `classement/c` ranking table.
///
/// Used for the edition whose runner pages are unavailable: only identity,
/// ranks and the finish time are known, so the finish lands in the last
/// slot and every other slot stays missing.
pub fn records(doc: &Document, year: u16) -> Result<Vec<RunnerRecord>> {
    doc.expect("classement")?;

    doc.find_all("classement", "c")
        .map(|c| {
            let a = &c.attrs;
            let rank = a.get("class");

            let mut splits = empty_slots();
            // An unranked finish keeps an empty rank, unlike a runner page's `-`.
            splits[SLOT_COUNT - 1] = a.get("tps").map(|tps| Split {
                time: tps.to_string(),
                rank: rank.unwrap_or_default().to_string(),
            });

            Ok(RunnerRecord {
                year,
                bib: c.require("doss")?.to_string(),
                last_name: c.require("nom")?.to_string(),
                first_name: a.opt("prenom"),
                sex: a.opt("sx").unwrap_or_default(),
                category: a.opt("cat").unwrap_or_default(),
                club: a.opt("club").unwrap_or_default(),
                nationality: a.opt("pays").unwrap_or_default(),
                global_rank: rank.map(str::to_string).unwrap_or_default(),
                category_rank: a.opt("classcat"),
                gender_rank: None,
                utmb_index: a.opt("index"),
                splits,
                achievements: Vec::new(),
            })
        })
        .collect()
}
