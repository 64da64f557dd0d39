use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::EngineError;
use crate::models::exercise::TestType;

/// Athlete gender as recorded in the profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Gender used to select normative rows; `Other` is looked up as `Male`
    pub fn normative_lookup(&self) -> Gender {
        match self {
            Gender::Female => Gender::Female,
            Gender::Male | Gender::Other => Gender::Male,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Gender {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" | "o" => Ok(Gender::Other),
            other => Err(EngineError::UnknownGender(other.to_string())),
        }
    }
}

/// Athlete context needed for normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
}

impl AthleteProfile {
    /// Whole years of age on the given date
    pub fn age_on(&self, as_of: NaiveDate) -> i32 {
        age_on(self.date_of_birth, as_of)
    }
}

/// Whole years between `date_of_birth` and `as_of`, minus one if the
/// birthday has not occurred yet that year
pub fn age_on(date_of_birth: NaiveDate, as_of: NaiveDate) -> i32 {
    use chrono::Datelike;

    let mut age = as_of.year() - date_of_birth.year();
    if (as_of.month(), as_of.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// Raw-score anchors for the 10th/25th/50th/75th/90th percentiles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Percentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl Percentiles {
    /// Anchor pairs of (raw score, percentile) in ascending order
    pub fn anchors(&self) -> [(f64, f64); 5] {
        [
            (self.p10, 10.0),
            (self.p25, 25.0),
            (self.p50, 50.0),
            (self.p75, 75.0),
            (self.p90, 90.0),
        ]
    }
}

/// One reference row of the normative table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormativeData {
    pub test_type: TestType,
    pub gender: Gender,
    pub age_min: i32,
    pub age_max: i32,
    pub percentiles: Percentiles,
}

impl NormativeData {
    pub fn matches(&self, test_type: TestType, gender: Gender, age: i32) -> bool {
        self.test_type == test_type
            && self.gender == gender
            && (self.age_min..=self.age_max).contains(&age)
    }
}

/// Versioned collection of normative rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormativeDataset {
    pub version: String,
    pub published: NaiveDate,
    #[serde(default)]
    pub source: Option<String>,
    pub rows: Vec<NormativeData>,
}

/// Letter grade derived from the standardized score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_percentile(percentile: u32) -> Self {
        if percentile >= 80 {
            Grade::A
        } else if percentile >= 60 {
            Grade::B
        } else if percentile >= 40 {
            Grade::C
        } else if percentile >= 20 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{}", letter)
    }
}

/// Final normalized result of a fitness test
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestScore {
    pub raw_score: f64,
    /// Form-adjusted percentile (0-100)
    pub standardized_score: u32,
    /// Raw normative percentile (0-99)
    pub percentile: u32,
    pub grade: Grade,
    pub feedback: Vec<String>,
}
