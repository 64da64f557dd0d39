/// Normative reference data
///
/// The percentile bands ship as a versioned JSON dataset embedded at compile
/// time. Alternative datasets can be loaded from disk; every dataset is
/// validated before use so lookups never see malformed rows.
use chrono::NaiveDate;
use std::path::Path;

use crate::errors::{EngineError, Result};
use crate::models::exercise::TestType;
use crate::models::scoring::{Gender, NormativeData, NormativeDataset};

/// Version of the dataset compiled into the crate
pub const EMBEDDED_VERSION: &str = "2024.1";

const EMBEDDED_DATASET: &str = include_str!("../../data/normative_v1.json");

/// Validated, read-only normative table
#[derive(Debug, Clone)]
pub struct NormativeTable {
    dataset: NormativeDataset,
}

impl NormativeTable {
    /// The dataset compiled into the crate
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_DATASET)
    }

    /// Parse and validate a dataset from JSON
    pub fn from_json(content: &str) -> Result<Self> {
        let dataset: NormativeDataset = serde_json::from_str(content)?;
        Self::from_dataset(dataset)
    }

    /// Load and validate a dataset file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_dataset(dataset: NormativeDataset) -> Result<Self> {
        validate(&dataset)?;
        tracing::debug!(
            version = %dataset.version,
            rows = dataset.rows.len(),
            "Loaded normative dataset"
        );
        Ok(Self { dataset })
    }

    pub fn version(&self) -> &str {
        &self.dataset.version
    }

    pub fn published(&self) -> NaiveDate {
        self.dataset.published
    }

    pub fn source(&self) -> Option<&str> {
        self.dataset.source.as_deref()
    }

    pub fn rows(&self) -> &[NormativeData] {
        &self.dataset.rows
    }

    /// Rows for one test type, in dataset order
    pub fn rows_for(&self, test_type: TestType) -> impl Iterator<Item = &NormativeData> {
        self.dataset
            .rows
            .iter()
            .filter(move |row| row.test_type == test_type)
    }

    /// Row for a test type, gender and age; `Other` resolves to the male rows
    pub fn lookup(&self, test_type: TestType, gender: Gender, age: i32) -> Option<&NormativeData> {
        let gender = gender.normative_lookup();
        self.dataset
            .rows
            .iter()
            .find(|row| row.matches(test_type, gender, age))
    }
}

fn validate(dataset: &NormativeDataset) -> Result<()> {
    for (index, row) in dataset.rows.iter().enumerate() {
        let invalid = |reason: &str| EngineError::InvalidNormativeRow {
            index,
            test_type: row.test_type.to_string(),
            gender: row.gender.to_string(),
            reason: reason.to_string(),
        };

        if row.age_min > row.age_max {
            return Err(invalid("age_min is greater than age_max"));
        }
        if row.gender == Gender::Other {
            return Err(invalid("rows must be keyed by male or female"));
        }

        let anchors = row.percentiles.anchors();
        if anchors[0].0 <= 0.0 {
            return Err(invalid("p10 must be positive"));
        }
        if anchors.windows(2).any(|pair| pair[1].0 < pair[0].0) {
            return Err(invalid("percentile anchors must be non-decreasing"));
        }
    }
    Ok(())
}
