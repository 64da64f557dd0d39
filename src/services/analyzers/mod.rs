/// Exercise analyzers
///
/// One analyzer per test type behind [`ExerciseAnalyzer`]. An analyzer is a
/// pure function of a pose (plus the session's calibration baseline) that
/// reports the primary joint angle, the two position predicates bracketing the
/// repetition cycle, and any detected form issues.
use crate::config::EngineConfig;
use crate::models::exercise::{ExercisePhase, FormIssue, TestType};
use crate::models::keypoint::{CocoKeypoint as Kp, Pose};
use crate::services::geometry::get_keypoint;

mod jump;
mod pullup;
mod pushup;
mod running;
mod situp;
mod squat;

pub use jump::JumpAnalyzer;
pub use pullup::PullupAnalyzer;
pub use pushup::PushupAnalyzer;
pub use running::RunningAnalyzer;
pub use situp::SitupAnalyzer;
pub use squat::SquatAnalyzer;

/// Reference measurements captured before a test starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    /// Average y of the visible ankles in pixels
    pub ankle_y: f32,
    /// Vertical nose-to-ankle distance in pixels
    pub body_height: f32,
}

impl Baseline {
    /// Measure a baseline from a standing pose; needs the nose and one ankle
    pub fn from_pose(pose: &Pose, min_confidence: f32) -> Option<Self> {
        let nose = get_keypoint(pose, Kp::Nose, min_confidence)?;
        let ankles: Vec<f32> = [Kp::LeftAnkle, Kp::RightAnkle]
            .iter()
            .filter_map(|point| get_keypoint(pose, *point, min_confidence))
            .map(|kp| kp.y)
            .collect();
        if ankles.is_empty() {
            return None;
        }

        let ankle_y = ankles.iter().sum::<f32>() / ankles.len() as f32;
        let body_height = (nose.y - ankle_y).abs();
        if body_height <= f32::EPSILON {
            return None;
        }

        Some(Self { ankle_y, body_height })
    }
}

/// Which phase is the reference ("armed") position and which is the engaged
/// extreme; a repetition is counted on the return to `armed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseCycle {
    pub armed: ExercisePhase,
    pub engaged: ExercisePhase,
}

impl PhaseCycle {
    /// Standing/extended is `Up`, the bottom is `Down` (squats, push-ups)
    pub const TOP_ARMED: PhaseCycle = PhaseCycle {
        armed: ExercisePhase::Up,
        engaged: ExercisePhase::Down,
    };

    /// Lying/hanging/grounded is `Down`, the effort is `Up` (sit-ups, pull-ups, jump)
    pub const BOTTOM_ARMED: PhaseCycle = PhaseCycle {
        armed: ExercisePhase::Down,
        engaged: ExercisePhase::Up,
    };
}

/// Per-frame analysis output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    /// Primary joint angle in degrees
    pub primary_angle: Option<f32>,
    /// In the reference position the repetition returns to
    pub is_armed: bool,
    /// At the working extreme of the repetition
    pub is_engaged: bool,
    pub issues: Vec<FormIssue>,
    /// Jump height as a fraction of body height
    pub jump_height_ratio: Option<f32>,
    /// Left and right ankle y in pixels
    pub ankle_heights: [Option<f32>; 2],
    /// Estimated stride length in pixels
    pub stride_length: Option<f32>,
}

/// Common interface of the per-exercise analyzers
pub trait ExerciseAnalyzer: Send + Sync {
    fn test_type(&self) -> TestType;

    /// Keypoint OR-groups: each group needs at least one confident keypoint
    fn required_keypoints(&self) -> &'static [&'static [Kp]];

    /// Phase cycle, or `None` for continuous (step counting) exercises
    fn cycle(&self) -> Option<PhaseCycle>;

    fn analyze(&self, pose: &Pose, baseline: Option<&Baseline>) -> AnalysisResult;
}

/// Build the analyzer for a test type
pub fn analyzer_for(test_type: TestType, config: &EngineConfig) -> Box<dyn ExerciseAnalyzer> {
    let min_confidence = config.tracking.min_confidence;
    let thresholds = &config.thresholds;

    match test_type {
        TestType::Squats => Box::new(SquatAnalyzer::new(thresholds.squat.clone(), min_confidence)),
        TestType::Pushups => Box::new(PushupAnalyzer::new(thresholds.pushup.clone(), min_confidence)),
        TestType::Situps => Box::new(SitupAnalyzer::new(thresholds.situp.clone(), min_confidence)),
        TestType::Pullups => Box::new(PullupAnalyzer::new(thresholds.pullup.clone(), min_confidence)),
        TestType::Jump => Box::new(JumpAnalyzer::new(thresholds.jump.clone(), min_confidence)),
        TestType::Running => Box::new(RunningAnalyzer::new(config.running.clone(), min_confidence)),
    }
}
