use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{BenchmarkAxis, BenchmarkComparison, ReferenceDistribution};

/// Upper z bound and percentile for each band, checked in order.
const PERCENTILE_BANDS: [(f64, f64); 11] = [
    (-2.5, 1.0),
    (-2.0, 2.0),
    (-1.5, 7.0),
    (-1.0, 16.0),
    (-0.5, 31.0),
    (0.0, 50.0),
    (0.5, 69.0),
    (1.0, 84.0),
    (1.5, 93.0),
    (2.0, 98.0),
    (2.5, 99.0),
];
const TOP_PERCENTILE: f64 = 99.5;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to read reference table {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("reference table {path} is not valid JSON")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct GlobalEntry {
    #[serde(default = "default_global_key")]
    key: String,
    avg_score: f64,
    std_dev: f64,
    sample_size: u64,
}

fn default_global_key() -> String {
    "global".to_string()
}

#[derive(Debug, Deserialize)]
struct ReferenceFile {
    global: GlobalEntry,
    #[serde(default)]
    age_groups: Vec<ReferenceDistribution>,
    #[serde(default)]
    professions: Vec<ReferenceDistribution>,
}

/// Population reference distributions keyed by axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    pub global: ReferenceDistribution,
    pub age_groups: Vec<ReferenceDistribution>,
    pub professions: Vec<ReferenceDistribution>,
}

impl ReferenceTable {
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ReferenceError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ReferenceError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let file: ReferenceFile = serde_json::from_str(raw)?;
        Ok(Self {
            global: ReferenceDistribution {
                key: file.global.key,
                avg_score: file.global.avg_score,
                std_dev: file.global.std_dev,
                sample_size: file.global.sample_size,
            },
            age_groups: file.age_groups,
            professions: file.professions,
        })
    }

    pub fn age_group(&self, key: &str) -> Option<&ReferenceDistribution> {
        find_key(&self.age_groups, key)
    }

    pub fn profession(&self, key: &str) -> Option<&ReferenceDistribution> {
        find_key(&self.professions, key)
    }
}

fn find_key<'a>(
    distributions: &'a [ReferenceDistribution],
    key: &str,
) -> Option<&'a ReferenceDistribution> {
    distributions
        .iter()
        .find(|distribution| distribution.key.eq_ignore_ascii_case(key.trim()))
}

/// Optional axes to compare against besides the global distribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct BenchmarkAxes<'a> {
    pub age_group: Option<&'a str>,
    pub profession: Option<&'a str>,
}

pub fn percentile(score: f64, avg_score: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        return if score == avg_score {
            50.0
        } else if score > avg_score {
            100.0
        } else {
            0.0
        };
    }

    let z = (score - avg_score) / std_dev;
    PERCENTILE_BANDS
        .iter()
        .find(|(bound, _)| z <= *bound)
        .map(|(_, value)| *value)
        .unwrap_or(TOP_PERCENTILE)
}

pub fn compare_with(
    score: f64,
    axis: BenchmarkAxis,
    reference: &ReferenceDistribution,
) -> BenchmarkComparison {
    BenchmarkComparison {
        axis,
        reference_key: reference.key.clone(),
        avg_score: reference.avg_score,
        difference: score - reference.avg_score,
        percentile: percentile(score, reference.avg_score, reference.std_dev),
        sample_size: reference.sample_size,
    }
}

/// Global comparison first, then whichever optional axes have a reference.
pub fn compare(
    score: f64,
    table: &ReferenceTable,
    axes: BenchmarkAxes<'_>,
) -> Vec<BenchmarkComparison> {
    let mut comparisons = vec![compare_with(score, BenchmarkAxis::Global, &table.global)];

    if let Some(key) = axes.age_group {
        match table.age_group(key) {
            Some(reference) => {
                comparisons.push(compare_with(score, BenchmarkAxis::AgeGroup, reference))
            }
            None => tracing::debug!(age_group = key, "no age group reference"),
        }
    }

    if let Some(key) = axes.profession {
        match table.profession(key) {
            Some(reference) => {
                comparisons.push(compare_with(score, BenchmarkAxis::Profession, reference))
            }
            None => tracing::debug!(profession = key, "no profession reference"),
        }
    }

    comparisons
}
