use serde::{Deserialize, Serialize};

/// Checkpoint slots kept per runner in the results table.
pub const SLOT_COUNT: usize = 7;

/// Rank written for a recorded split that carries no `clt`.
pub const RANK_UNKNOWN: &str = "-";

/// Time and rank recorded at one checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub time: String,
    pub rank: String,
}

impl Split {
    pub fn new(time: impl Into<String>, rank: Option<&str>) -> Self {
        Self {
            time: time.into(),
            rank: rank.unwrap_or(RANK_UNKNOWN).to_string(),
        }
    }
}

/// `None` is the missing sentinel: no time was recorded at that slot.
pub type Slot = Option<Split>;

pub fn empty_slots() -> [Slot; SLOT_COUNT] {
    Default::default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Race")]
    pub race: String,
    #[serde(rename = "Position")]
    pub position: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Distance")]
    pub distance: String,
    /// Past races before 2016 carry no elevation data.
    #[serde(rename = "Elevation Gain")]
    pub elevation_gain: Option<String>,
}

/// One participant's result in one edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerRecord {
    pub year: u16,
    pub bib: String,
    pub last_name: String,
    pub first_name: Option<String>,
    pub sex: String,
    pub category: String,
    pub club: String,
    pub nationality: String,
    pub global_rank: String,
    pub category_rank: Option<String>,
    pub gender_rank: Option<String>,
    pub utmb_index: Option<String>,
    pub splits: [Slot; SLOT_COUNT],
    pub achievements: Vec<Achievement>,
}

impl RunnerRecord {
    /// Furthest checkpoint with a recorded time, as (slot, split).
    pub fn last_split(&self) -> Option<(usize, &Split)> {
        self.splits
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, s)| s.as_ref().map(|s| (i, s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub name: String,
    pub distance: String,
    pub height: String,
    pub elevation_gain: String,
}

/// Checkpoint geometry of one edition, shared by all its runners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointInfo {
    pub year: u16,
    pub checkpoints: Vec<Checkpoint>,
}
