use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;
use colored::Colorize;
use fitness_assess::models::{
    AthleteProfile, ExerciseState, Gender, Pose, RepetitionData, TestScore, TestType,
};
use fitness_assess::{EngineConfig, ExerciseTracker};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::report::print_score;
use super::scoring_service;

#[derive(Args)]
pub struct TrackCommand {
    /// JSON-lines file with one pose per line
    input: PathBuf,

    /// Test type (squats, pushups, situps, pullups, jump, running)
    #[arg(short, long)]
    test: TestType,

    /// Use the first frame as the calibration pose
    #[arg(long)]
    calibrate: bool,

    /// Athlete gender; with --dob the result is scored
    #[arg(short, long, requires = "dob")]
    gender: Option<Gender>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long, requires = "gender")]
    dob: Option<NaiveDate>,

    /// Date the test was taken (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Alternative normative dataset (JSON)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Print each frame's state as a JSON line
    #[arg(long)]
    frames: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

/// Outcome of replaying a pose file
#[derive(Debug, Serialize)]
pub struct TrackSummary {
    pub session_id: Uuid,
    pub test_type: TestType,
    pub frames: usize,
    pub state: ExerciseState,
    pub raw_score: f64,
    pub repetitions: Vec<RepetitionData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<TestScore>,
}

impl TrackCommand {
    pub fn execute(self, config: &EngineConfig) -> Result<()> {
        let poses = read_poses(&self.input)?;
        let mut tracker = ExerciseTracker::with_config(self.test, config);
        tracing::info!(
            session_id = %tracker.session_id(),
            test_type = %self.test,
            frames = poses.len(),
            "Replaying pose stream"
        );

        let mut frames = poses.iter();
        if self.calibrate {
            if let Some(first) = frames.next() {
                if !tracker.calibrate(first) {
                    tracing::warn!("First frame lacks the nose or ankles, continuing uncalibrated");
                }
            }
        } else {
            tracker.start();
        }

        for pose in frames {
            let state = tracker.process_pose(pose);
            if self.frames {
                println!("{}", serde_json::to_string(&state)?);
            }
        }
        let state = tracker.finish();

        let score = match (self.gender, self.dob) {
            (Some(gender), Some(date_of_birth)) => {
                let service = scoring_service(config, self.dataset.as_deref())?;
                let as_of = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
                let athlete = AthleteProfile {
                    gender,
                    date_of_birth,
                };
                Some(service.score_athlete(
                    self.test,
                    tracker.raw_score(),
                    tracker.repetitions(),
                    &athlete,
                    as_of,
                ))
            }
            _ => None,
        };

        let summary = TrackSummary {
            session_id: tracker.session_id(),
            test_type: self.test,
            frames: poses.len(),
            state,
            raw_score: tracker.raw_score(),
            repetitions: tracker.repetitions().to_vec(),
            score,
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else if !self.frames {
            print_summary(&summary);
        }

        Ok(())
    }
}

/// Parse a JSON-lines pose file, skipping blank lines
fn read_poses(path: &Path) -> Result<Vec<Pose>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut poses = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let pose: Pose = serde_json::from_str(&line)
            .with_context(|| format!("Invalid pose on line {}", index + 1))?;
        poses.push(pose);
    }

    Ok(poses)
}

fn print_summary(summary: &TrackSummary) {
    let state = &summary.state;

    println!("{} {}", "Session".bold(), summary.session_id);
    println!("Test:        {}", summary.test_type);
    println!("Frames:      {}", summary.frames);
    match summary.test_type {
        TestType::Running => {
            println!("Steps:       {}", state.rep_count);
            println!("Rate:        {:.0} steps/min", summary.raw_score);
            if let Some(cadence) = state.cadence {
                println!("Cadence:     {:.0} steps/min", cadence);
            }
            if let Some(distance) = state.distance {
                println!("Distance:    {:.0} px", distance);
            }
        }
        TestType::Jump => {
            println!("Jumps:       {}", state.rep_count);
            println!("Best height: {:.1} cm", summary.raw_score);
        }
        _ => println!("Repetitions: {}", state.rep_count),
    }

    if !summary.repetitions.is_empty() {
        println!();
        println!("{:<5} {:>10} {:>6}  {}", "rep", "duration", "form", "issues");
        for (i, rep) in summary.repetitions.iter().enumerate() {
            let issues: Vec<&str> = rep.issues.iter().map(|issue| issue.code()).collect();
            println!(
                "{:<5} {:>8}ms {:>6.0}  {}",
                i + 1,
                rep.duration_ms,
                rep.form_score,
                issues.join(", ")
            );
        }
    }

    if let Some(score) = &summary.score {
        println!();
        print_score(score);
    }
}
