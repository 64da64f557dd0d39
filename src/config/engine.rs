use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::errors::{EngineError, Result};
use crate::models::keypoint::MIN_CONFIDENCE;

/// Engine configuration: every tunable threshold used by the analyzers,
/// the tracker and the scoring engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub thresholds: ExerciseThresholds,

    #[serde(default)]
    pub running: RunningConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    #[serde(default = "default_min_phase_duration_ms")]
    pub min_phase_duration_ms: u64,

    #[serde(default = "default_form_penalty")]
    pub form_penalty_per_issue: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseThresholds {
    pub squat: SquatThresholds,
    pub pushup: PushupThresholds,
    pub situp: SitupThresholds,
    pub pullup: PullupThresholds,
    pub jump: JumpThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquatThresholds {
    pub standing_knee_angle: f32,
    pub standing_tolerance: f32,
    pub squat_knee_angle: f32,
    pub squat_tolerance: f32,
    /// Horizontal knee-ahead-of-ankle distance in pixels
    pub knee_forward_px: f32,
    /// Hip angle (shoulder-hip-knee) below which the torso leans too far
    pub forward_lean_hip_angle: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushupThresholds {
    pub extended_elbow_angle: f32,
    pub extended_tolerance: f32,
    pub bent_elbow_angle: f32,
    pub bent_tolerance: f32,
    /// Shoulder-hip-ankle angle below which the body line is broken
    pub body_line_angle: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitupThresholds {
    pub down_hip_angle: f32,
    pub down_tolerance: f32,
    pub up_hip_angle: f32,
    pub up_tolerance: f32,
    /// Knee gap allowed as a multiple of hip width
    pub knee_separation_ratio: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PullupThresholds {
    pub extended_elbow_angle: f32,
    pub extended_tolerance: f32,
    pub bent_elbow_angle: f32,
    pub bent_tolerance: f32,
    /// Horizontal hip offset from the shoulders in pixels
    pub max_swing_px: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpThresholds {
    /// Height above baseline, as a fraction of body height, that counts as airborne
    pub airborne_height_ratio: f32,
    /// Knee gap below this fraction of ankle gap flags caving knees
    pub knee_caving_ratio: f32,
    /// Athlete height used to convert a height ratio into centimetres
    pub reference_height_cm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunningConfig {
    pub history_len: usize,
    pub step_lift_px: f32,
    pub min_step_interval_ms: u64,
    /// Leg length multiplier for stride estimation
    pub stride_factor: f32,
    pub cadence_window: usize,
    pub max_torso_lean_degrees: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Version of the normative dataset the scores are computed against
    pub normative_version: String,
    pub min_age: i32,
    pub max_age: i32,
    /// Share of the percentile that form quality can scale
    pub form_weight: f64,
    pub fallback_percentile: f64,
}

// Default value functions
fn default_min_confidence() -> f32 {
    MIN_CONFIDENCE
}

fn default_min_phase_duration_ms() -> u64 {
    200
}

fn default_form_penalty() -> f32 {
    15.0
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            min_phase_duration_ms: default_min_phase_duration_ms(),
            form_penalty_per_issue: default_form_penalty(),
        }
    }
}

impl Default for SquatThresholds {
    fn default() -> Self {
        Self {
            standing_knee_angle: 160.0,
            standing_tolerance: 10.0,
            squat_knee_angle: 90.0,
            squat_tolerance: 15.0,
            knee_forward_px: 30.0,
            forward_lean_hip_angle: 70.0,
        }
    }
}

impl Default for PushupThresholds {
    fn default() -> Self {
        Self {
            extended_elbow_angle: 160.0,
            extended_tolerance: 15.0,
            bent_elbow_angle: 90.0,
            bent_tolerance: 15.0,
            body_line_angle: 160.0,
        }
    }
}

impl Default for SitupThresholds {
    fn default() -> Self {
        Self {
            down_hip_angle: 160.0,
            down_tolerance: 10.0,
            up_hip_angle: 45.0,
            up_tolerance: 20.0,
            knee_separation_ratio: 1.5,
        }
    }
}

impl Default for PullupThresholds {
    fn default() -> Self {
        Self {
            extended_elbow_angle: 160.0,
            extended_tolerance: 10.0,
            bent_elbow_angle: 90.0,
            bent_tolerance: 20.0,
            max_swing_px: 40.0,
        }
    }
}

impl Default for JumpThresholds {
    fn default() -> Self {
        Self {
            airborne_height_ratio: 0.1,
            knee_caving_ratio: 0.7,
            reference_height_cm: 170.0,
        }
    }
}

impl Default for RunningConfig {
    fn default() -> Self {
        Self {
            history_len: 10,
            step_lift_px: 10.0,
            min_step_interval_ms: 200,
            stride_factor: 1.3,
            cadence_window: 10,
            max_torso_lean_degrees: 20.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            normative_version: crate::services::normative_data::EMBEDDED_VERSION.to_string(),
            min_age: 18,
            max_age: 55,
            form_weight: 0.2,
            fallback_percentile: 50.0,
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the step detector cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.running.min_step_interval_ms == 0 {
            return Err(EngineError::InvalidSetting {
                field: "running.min_step_interval_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.running.history_len < 5 {
            return Err(EngineError::InvalidSetting {
                field: "running.history_len",
                reason: format!("{} is shorter than the 5-sample lift window", self.running.history_len),
            });
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Overlay values from environment variables
    pub fn apply_env(mut self) -> Self {
        if let Some(value) = env_parse::<f32>("FITNESS_MIN_CONFIDENCE") {
            self.tracking.min_confidence = value.clamp(0.0, 1.0);
        }
        if let Some(value) = env_parse::<u64>("FITNESS_MIN_PHASE_MS") {
            self.tracking.min_phase_duration_ms = value;
        }
        if let Ok(version) = env::var("FITNESS_NORMS_VERSION") {
            self.scoring.normative_version = version;
        }
        self
    }

    /// Serialize back to TOML for display
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}
