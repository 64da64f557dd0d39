use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use fitness_assess::models::{AthleteProfile, Gender, RepetitionData, TestType};
use fitness_assess::EngineConfig;
use std::fs;
use std::path::PathBuf;

use super::report::print_score;
use super::scoring_service;

#[derive(Args)]
pub struct ScoreCommand {
    /// Test type (squats, pushups, situps, pullups, jump, running)
    #[arg(short, long)]
    test: TestType,

    /// Raw result: repetitions, steps per minute, or jump height in cm
    #[arg(short, long, allow_negative_numbers = true)]
    raw: f64,

    /// Athlete gender (male, female, other)
    #[arg(short, long)]
    gender: Gender,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    dob: NaiveDate,

    /// Date the test was taken (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// JSON file with the tracked repetitions, for form and consistency
    #[arg(long)]
    repetitions: Option<PathBuf>,

    /// Alternative normative dataset (JSON)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Print the score as JSON
    #[arg(long)]
    json: bool,
}

impl ScoreCommand {
    pub fn execute(self, config: &EngineConfig) -> Result<()> {
        let service = scoring_service(config, self.dataset.as_deref())?;

        let repetitions: Vec<RepetitionData> = match &self.repetitions {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&contents).context("Failed to parse repetitions")?
            }
            None => Vec::new(),
        };

        let as_of = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let athlete = AthleteProfile {
            gender: self.gender,
            date_of_birth: self.dob,
        };
        let score = service.score_athlete(self.test, self.raw, &repetitions, &athlete, as_of);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&score)?);
        } else {
            print_score(&score);
        }

        Ok(())
    }
}
