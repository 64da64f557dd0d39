use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::EngineError;

/// Fitness test types supported by the tracking engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Squats,
    Pushups,
    Situps,
    Pullups,
    #[serde(alias = "vertical_jump")]
    Jump,
    Running,
}

impl TestType {
    pub const ALL: [TestType; 6] = [
        TestType::Squats,
        TestType::Pushups,
        TestType::Situps,
        TestType::Pullups,
        TestType::Jump,
        TestType::Running,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Squats => "squats",
            TestType::Pushups => "pushups",
            TestType::Situps => "situps",
            TestType::Pullups => "pullups",
            TestType::Jump => "jump",
            TestType::Running => "running",
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "squats" | "squat" => Ok(TestType::Squats),
            "pushups" | "pushup" | "push_up" | "push_ups" => Ok(TestType::Pushups),
            "situps" | "situp" | "sit_up" | "sit_ups" => Ok(TestType::Situps),
            "pullups" | "pullup" | "pull_up" | "pull_ups" => Ok(TestType::Pullups),
            "jump" | "vertical_jump" => Ok(TestType::Jump),
            "running" | "run" => Ok(TestType::Running),
            other => Err(EngineError::UnknownTestType(other.to_string())),
        }
    }
}

/// Stage of an exercise's repetition cycle
///
/// The meaning of `Down` and `Up` is exercise specific: `Down` is the squat
/// bottom for squats but the grounded stance for a jump.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExercisePhase {
    #[default]
    Idle,
    Starting,
    Down,
    Up,
    Completed,
}

impl std::fmt::Display for ExercisePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExercisePhase::Idle => write!(f, "idle"),
            ExercisePhase::Starting => write!(f, "starting"),
            ExercisePhase::Down => write!(f, "down"),
            ExercisePhase::Up => write!(f, "up"),
            ExercisePhase::Completed => write!(f, "completed"),
        }
    }
}

/// Severity level of detected form issues
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Minor,
    Warning,
    Critical,
}

/// Technique deviation detected by an exercise analyzer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FormIssue {
    KneesPastToes,
    ExcessiveForwardLean,
    HipSag,
    HipPike,
    KneesSeparated,
    InsufficientChinClearance,
    ExcessiveSwing,
    KneesCaving,
    TorsoLean,
}

impl FormIssue {
    pub fn severity(&self) -> IssueSeverity {
        match self {
            FormIssue::HipSag | FormIssue::KneesCaving | FormIssue::ExcessiveForwardLean => {
                IssueSeverity::Critical
            }
            FormIssue::KneesPastToes
            | FormIssue::HipPike
            | FormIssue::InsufficientChinClearance
            | FormIssue::ExcessiveSwing => IssueSeverity::Warning,
            FormIssue::KneesSeparated | FormIssue::TorsoLean => IssueSeverity::Minor,
        }
    }

    /// Stable code used in persisted repetition records
    pub fn code(&self) -> &'static str {
        match self {
            FormIssue::KneesPastToes => "knees_past_toes",
            FormIssue::ExcessiveForwardLean => "excessive_forward_lean",
            FormIssue::HipSag => "hip_sag",
            FormIssue::HipPike => "hip_pike",
            FormIssue::KneesSeparated => "knees_separated",
            FormIssue::InsufficientChinClearance => "insufficient_chin_clearance",
            FormIssue::ExcessiveSwing => "excessive_swing",
            FormIssue::KneesCaving => "knees_caving",
            FormIssue::TorsoLean => "torso_lean",
        }
    }

    /// Corrective cue shown to the athlete
    pub fn message(&self) -> &'static str {
        match self {
            FormIssue::KneesPastToes => "Keep your knees behind your toes",
            FormIssue::ExcessiveForwardLean => "Keep your chest up, you're leaning too far forward",
            FormIssue::HipSag => "Tighten your core, your hips are sagging",
            FormIssue::HipPike => "Lower your hips to keep a straight body line",
            FormIssue::KneesSeparated => "Keep your knees together",
            FormIssue::InsufficientChinClearance => "Pull higher, get your chin over the bar",
            FormIssue::ExcessiveSwing => "Control the swing, keep your body still",
            FormIssue::KneesCaving => "Push your knees out as you land",
            FormIssue::TorsoLean => "Run tall, avoid leaning from the waist",
        }
    }

    /// Pick the most severe issue; ties keep the first detected
    pub fn most_severe(issues: &[FormIssue]) -> Option<FormIssue> {
        issues.iter().copied().fold(None, |best, issue| match best {
            Some(current) if current.severity() >= issue.severity() => Some(current),
            _ => Some(issue),
        })
    }
}

impl std::fmt::Display for FormIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Form score for a frame: 100 minus a fixed penalty per issue, floored at 0
pub fn form_score(issue_count: usize, penalty_per_issue: f32) -> f32 {
    (100.0 - penalty_per_issue * issue_count as f32).max(0.0)
}

/// Per-frame snapshot for live feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseState {
    pub phase: ExercisePhase,
    /// Completed repetitions, or steps for running
    pub rep_count: u32,
    /// Form quality of the latest frame (0-100)
    pub form_score: f32,
    /// Primary joint angle in degrees, when measurable
    pub current_angle: Option<f32>,
    pub feedback: String,
    /// Steps per minute (running only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f32>,
    /// Estimated stride length in pixels (running only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stride_length: Option<f32>,
    /// Steps times stride length in pixels (running only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    /// Height above the calibrated stance as a fraction of body height (jump only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump_height_ratio: Option<f32>,
}

impl Default for ExerciseState {
    fn default() -> Self {
        Self {
            phase: ExercisePhase::Idle,
            rep_count: 0,
            form_score: 100.0,
            current_angle: None,
            feedback: String::new(),
            cadence: None,
            stride_length: None,
            distance: None,
            jump_height_ratio: None,
        }
    }
}

/// Record of one completed repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepetitionData {
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    pub duration_ms: u64,
    pub form_score: f32,
    pub issues: Vec<FormIssue>,
}

impl RepetitionData {
    pub fn new(start_time_ms: u64, end_time_ms: u64, form_score: f32, issues: Vec<FormIssue>) -> Self {
        Self {
            start_time_ms,
            end_time_ms,
            duration_ms: end_time_ms.saturating_sub(start_time_ms),
            form_score,
            issues,
        }
    }
}
