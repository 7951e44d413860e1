use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::parser::checkpoints::DEFAULT_EXCLUDED;
use crate::parser::ExclusionSet;
use crate::store::OutputPaths;

const CONFIG_FILE: &str = "stl_scraper";
const ENV_PREFIX: &str = "STL";

/// One edition with per-runner pages.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Edition {
    pub year: u16,
    pub ranking_url: String,
    /// The bib number is appended to this to get a runner page.
    pub runner_url: String,
}

impl Edition {
    pub fn runner_page(&self, bib: &str) -> String {
        format!("{}{}", self.runner_url, bib)
    }
}

/// The edition only available as a flat ranking table.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LegacyEdition {
    pub year: u16,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub results_path: PathBuf,
    pub checkpoints_path: PathBuf,
    pub editions: Vec<Edition>,
    pub legacy: Option<LegacyEdition>,
    pub excluded_checkpoints: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            results_path: "Saintelyon_Results.csv".into(),
            checkpoints_path: "Saintelyon_checkpoints.csv".into(),
            editions: default_editions(),
            legacy: Some(LegacyEdition {
                year: 2017,
                url: "https://livetrail.net/histo/saintelyon_2017/classement.php?course=72km&cat=scratch"
                    .to_string(),
            }),
            excluded_checkpoints: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// No 2020 edition; 2017 runner pages are broken and come from `legacy`.
fn default_editions() -> Vec<Edition> {
    let live = |year, course: &str| Edition {
        year,
        ranking_url: format!("https://saintelyon.livetrail.net/classement.php?course={course}&cat=scratch"),
        runner_url: "https://saintelyon.livetrail.net/coureur.php?rech=".to_string(),
    };
    let histo = |year: u16, course: &str| Edition {
        year,
        ranking_url: format!(
            "https://livetrail.net/histo/saintelyon_{year}/classement.php?course={course}&cat=scratch"
        ),
        runner_url: format!("https://livetrail.net/histo/saintelyon_{year}/coureur.php?rech="),
    };

    vec![
        live(2024, "82km"),
        histo(2023, "78km"),
        histo(2022, "78km"),
        histo(2021, "78km"),
        histo(2019, "76km"),
        histo(2018, "81km"),
        histo(2016, "72km"),
        histo(2015, "75km"),
        histo(2014, "75km"),
        histo(2013, "75km"),
    ]
}

impl Settings {
    /// Defaults, then `stl_scraper.toml` if present, then `STL_*` env vars.
    pub fn load() -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("excluded_checkpoints")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    pub fn exclusions(&self) -> ExclusionSet {
        ExclusionSet::new(self.excluded_checkpoints.iter().cloned())
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            results: self.results_path.clone(),
            checkpoints: self.checkpoints_path.clone(),
        }
    }

    pub fn edition(&self, year: u16) -> Option<&Edition> {
        self.editions.iter().find(|e| e.year == year)
    }

    /// Keep only the listed years; an empty list keeps everything.
    pub fn restrict_to(&mut self, years: &[u16]) {
        if years.is_empty() {
            return;
        }
        self.editions.retain(|e| years.contains(&e.year));
        if self.legacy.as_ref().is_some_and(|l| !years.contains(&l.year)) {
            self.legacy = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_editions_skip_2020_and_2017() {
        let s = Settings::default();
        let years: Vec<u16> = s.editions.iter().map(|e| e.year).collect();
        assert_eq!(years, [2024, 2023, 2022, 2021, 2019, 2018, 2016, 2015, 2014, 2013]);
        assert_eq!(s.legacy.as_ref().map(|l| l.year), Some(2017));
    }

    #[test]
    fn runner_page_appends_bib() {
        let s = Settings::default();
        let e = s.edition(2019).unwrap();
        assert_eq!(
            e.runner_page("1042"),
            "https://livetrail.net/histo/saintelyon_2019/coureur.php?rech=1042"
        );
        assert!(e.ranking_url.contains("course=76km"));
    }

    #[test]
    fn restrict_to_years() {
        let mut s = Settings::default();
        s.restrict_to(&[2023, 2013]);
        assert_eq!(s.editions.len(), 2);
        assert!(s.legacy.is_none());

        let mut s = Settings::default();
        s.restrict_to(&[2017]);
        assert!(s.editions.is_empty());
        assert!(s.legacy.is_some());

        let mut s = Settings::default();
        s.restrict_to(&[]);
        assert_eq!(s.editions.len(), 10);
    }

    #[test]
    fn env_vars_override_defaults() {
        std::env::set_var("STL_RESULTS_PATH", "env/results.csv");
        std::env::set_var("STL_EXCLUDED_CHECKPOINTS", "Animation 500m,Ravito");
        let loaded = Settings::load();
        std::env::remove_var("STL_RESULTS_PATH");
        std::env::remove_var("STL_EXCLUDED_CHECKPOINTS");

        let s = loaded.unwrap();
        assert_eq!(s.results_path, PathBuf::from("env/results.csv"));
        assert_eq!(s.checkpoints_path, PathBuf::from("Saintelyon_checkpoints.csv"));
        assert_eq!(s.excluded_checkpoints, ["Animation 500m", "Ravito"]);
        assert!(!s.exclusions().contains("KM BV SPORT"));
        assert_eq!(s.editions.len(), 10);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let s: Settings = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                results_path = "out/results.csv"

                [[editions]]
                year = 2030
                ranking_url = "http://localhost/ranking"
                runner_url = "http://localhost/runner?bib="
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(s.results_path, PathBuf::from("out/results.csv"));
        assert_eq!(s.checkpoints_path, PathBuf::from("Saintelyon_checkpoints.csv"));
        assert_eq!(s.editions.len(), 1);
        assert_eq!(s.editions[0].runner_page("5"), "http://localhost/runner?bib=5");
        assert!(s.exclusions().contains("KM BV SPORT"));
    }
}
