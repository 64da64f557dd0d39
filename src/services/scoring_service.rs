/// Scoring Service
///
/// Converts a raw test result into a normative percentile, a form-adjusted
/// standardized score, a letter grade and tiered feedback. Stateless apart
/// from the read-only normative table, so one instance can serve any number
/// of sessions concurrently.
use chrono::{NaiveDate, Utc};
use statrs::statistics::Statistics;
use tracing::{info, warn};

use crate::config::ScoringConfig;
use crate::errors::{EngineError, Result};
use crate::models::exercise::{RepetitionData, TestType};
use crate::models::scoring::{AthleteProfile, Gender, Grade, Percentiles, TestScore};
use crate::services::normative_data::NormativeTable;

#[derive(Debug, Clone)]
pub struct ScoringService {
    table: NormativeTable,
    config: ScoringConfig,
}

impl ScoringService {
    /// Scoring against the embedded dataset with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(NormativeTable::embedded()?, ScoringConfig::default())
    }

    /// Scoring against a specific dataset; the dataset version must match
    /// the configured one
    pub fn with_config(table: NormativeTable, config: ScoringConfig) -> Result<Self> {
        if table.version() != config.normative_version {
            return Err(EngineError::VersionMismatch {
                expected: config.normative_version,
                found: table.version().to_string(),
            });
        }
        Ok(Self { table, config })
    }

    pub fn table(&self) -> &NormativeTable {
        &self.table
    }

    /// Score a test using today's date for the athlete's age
    pub fn calculate_score(
        &self,
        test_type: TestType,
        raw_score: f64,
        repetitions: &[RepetitionData],
        gender: Gender,
        date_of_birth: NaiveDate,
    ) -> TestScore {
        let today = Utc::now().date_naive();
        self.calculate_score_as_of(test_type, raw_score, repetitions, gender, date_of_birth, today)
    }

    pub fn calculate_score_as_of(
        &self,
        test_type: TestType,
        raw_score: f64,
        repetitions: &[RepetitionData],
        gender: Gender,
        date_of_birth: NaiveDate,
        as_of: NaiveDate,
    ) -> TestScore {
        let athlete = AthleteProfile {
            gender,
            date_of_birth,
        };
        self.score_athlete(test_type, raw_score, repetitions, &athlete, as_of)
    }

    /// Score a test for an athlete, taking their age on `as_of`
    pub fn score_athlete(
        &self,
        test_type: TestType,
        raw_score: f64,
        repetitions: &[RepetitionData],
        athlete: &AthleteProfile,
        as_of: NaiveDate,
    ) -> TestScore {
        let gender = athlete.gender;
        let age = athlete.age_on(as_of).clamp(self.config.min_age, self.config.max_age);

        let percentile = match self.table.lookup(test_type, gender, age) {
            Some(row) => interpolate_percentile(raw_score, &row.percentiles),
            None => {
                warn!(
                    test_type = %test_type,
                    gender = %gender,
                    age,
                    "No normative row, using fallback percentile"
                );
                self.config.fallback_percentile
            }
        };

        let average_form = average_form_score(repetitions);
        let adjusted = adjusted_percentile(percentile, average_form, self.config.form_weight);
        let standardized_score = adjusted.clamp(0.0, 100.0) as u32;
        let grade = Grade::from_percentile(standardized_score);

        info!(
            test_type = %test_type,
            raw_score,
            percentile,
            average_form,
            standardized_score,
            grade = %grade,
            "Computed test score"
        );

        TestScore {
            raw_score,
            standardized_score,
            percentile: percentile.round().clamp(0.0, 99.0) as u32,
            grade,
            feedback: generate_feedback(test_type, raw_score, percentile, average_form, repetitions),
        }
    }
}

/// Piecewise-linear percentile over the five anchors.
///
/// Below p10 the percentile scales linearly from 0; above p90 it continues
/// the p75→p90 slope and is capped at 99.
pub fn interpolate_percentile(raw_score: f64, percentiles: &Percentiles) -> f64 {
    let anchors = percentiles.anchors();
    let (p10, _) = anchors[0];

    if raw_score <= p10 {
        if p10 <= 0.0 {
            return 0.0;
        }
        return (raw_score / p10 * 10.0).clamp(0.0, 10.0);
    }

    for pair in anchors.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if raw_score <= x1 {
            if x1 - x0 <= f64::EPSILON {
                return y1;
            }
            return y0 + (raw_score - x0) / (x1 - x0) * (y1 - y0);
        }
    }

    let (p75, _) = anchors[3];
    let (p90, _) = anchors[4];
    if p90 - p75 <= f64::EPSILON {
        return 99.0;
    }
    (90.0 + (raw_score - p90) * 15.0 / (p90 - p75)).min(99.0)
}

/// Mean repetition form score, 100 when no repetitions were tracked
pub fn average_form_score(repetitions: &[RepetitionData]) -> f64 {
    if repetitions.is_empty() {
        return 100.0;
    }
    repetitions.iter().map(|rep| rep.form_score as f64).mean()
}

/// Scale the percentile by form quality; form never replaces the percentile
pub fn adjusted_percentile(percentile: f64, average_form: f64, form_weight: f64) -> f64 {
    (percentile * (1.0 - form_weight) + percentile * (average_form / 100.0) * form_weight).round()
}

fn performance_feedback(percentile: f64) -> &'static str {
    if percentile >= 90.0 {
        "Outstanding performance! You're in the top 10% for your age group."
    } else if percentile >= 75.0 {
        "Excellent work! You're well above average for your age group."
    } else if percentile >= 50.0 {
        "Good job! You're performing above the median for your age group."
    } else if percentile >= 25.0 {
        "Fair performance. There's room to improve with regular training."
    } else {
        "Keep working at it. Consistent training will raise your score."
    }
}

fn form_feedback(average_form: f64) -> &'static str {
    if average_form >= 90.0 {
        "Your form was excellent throughout the test."
    } else if average_form >= 75.0 {
        "Your form was good, with a few minor deviations."
    } else if average_form >= 60.0 {
        "Your form needs some attention to avoid losing reps and risking injury."
    } else {
        "Focus on technique first: poor form limited your result."
    }
}

fn exercise_tips(test_type: TestType, raw_score: f64) -> Vec<&'static str> {
    let mut tips = Vec::new();
    match test_type {
        TestType::Squats => {
            if raw_score < 20.0 {
                tips.push("Build leg strength with bodyweight box squats three times a week.");
            }
            tips.push("Keep your weight in your heels and your chest up on every squat.");
        }
        TestType::Pushups => {
            if raw_score < 10.0 {
                tips.push("Start with incline or knee push-ups to build pressing strength.");
            }
            tips.push("Hold a rigid plank from head to heels on every push-up.");
        }
        TestType::Situps => {
            if raw_score < 20.0 {
                tips.push("Add planks and dead bugs to strengthen your core.");
            }
            tips.push("Anchor your feet and exhale as you curl up.");
        }
        TestType::Pullups => {
            if raw_score < 3.0 {
                tips.push("Practice negative pull-ups and dead hangs to build grip and back strength.");
            }
            tips.push("Start every rep from a full hang so it counts.");
        }
        TestType::Jump => {
            if raw_score < 30.0 {
                tips.push("Add squat jumps and box jumps to develop explosive power.");
            }
            tips.push("Swing your arms upward at take-off to add height.");
        }
        TestType::Running => {
            tips.push("Aim for quick, light steps that land under your hips.");
            if raw_score < 140.0 {
                tips.push("Raise your cadence with short, relaxed interval runs.");
            }
        }
    }
    tips
}

fn consistency_feedback(repetitions: &[RepetitionData]) -> Option<&'static str> {
    if repetitions.len() < 3 {
        return None;
    }

    let durations: Vec<f64> = repetitions.iter().map(|rep| rep.duration_ms as f64).collect();
    let mean = durations.iter().mean();
    if mean <= 0.0 {
        return None;
    }
    let std_dev = durations.iter().population_std_dev();

    if std_dev < 0.15 * mean {
        Some("Great consistency: your repetition tempo was very steady.")
    } else if std_dev > 0.30 * mean {
        Some("Your tempo varied a lot between repetitions; aim for a steady, controlled pace.")
    } else {
        None
    }
}

/// Feedback in fixed order: performance, form, test tips, consistency
pub fn generate_feedback(
    test_type: TestType,
    raw_score: f64,
    percentile: f64,
    average_form: f64,
    repetitions: &[RepetitionData],
) -> Vec<String> {
    let mut feedback = vec![
        performance_feedback(percentile).to_string(),
        form_feedback(average_form).to_string(),
    ];
    feedback.extend(exercise_tips(test_type, raw_score).into_iter().map(String::from));
    feedback.extend(consistency_feedback(repetitions).map(String::from));
    feedback
}
