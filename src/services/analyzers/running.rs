use crate::config::RunningConfig;
use crate::models::exercise::{FormIssue, TestType};
use crate::models::keypoint::{CocoKeypoint as Kp, Pose};
use crate::services::geometry::{get_keypoint, midpoint, pick_side, side_angle, LEFT_LEG, RIGHT_LEG};

use super::{AnalysisResult, Baseline, ExerciseAnalyzer, PhaseCycle};

const REQUIRED: &[&[Kp]] = &[
    &[Kp::LeftHip, Kp::RightHip],
    &[Kp::LeftAnkle, Kp::RightAnkle],
];

/// Running: per-side ankle heights for step detection and a stride estimate
pub struct RunningAnalyzer {
    config: RunningConfig,
    min_confidence: f32,
}

impl RunningAnalyzer {
    pub fn new(config: RunningConfig, min_confidence: f32) -> Self {
        Self {
            config,
            min_confidence,
        }
    }

    /// Leg length (hip to ankle) scaled by the stride factor
    pub fn stride_length(&self, pose: &Pose) -> Option<f32> {
        let [hip, ankle] = pick_side(
            pose,
            [Kp::LeftHip, Kp::LeftAnkle],
            [Kp::RightHip, Kp::RightAnkle],
            self.min_confidence,
        )?;
        Some(hip.distance_to(ankle) * self.config.stride_factor)
    }

    /// Torso angle from vertical in degrees
    fn torso_lean(&self, pose: &Pose) -> Option<f32> {
        let (sx, sy) = midpoint(pose, Kp::LeftShoulder, Kp::RightShoulder, self.min_confidence)?;
        let (hx, hy) = midpoint(pose, Kp::LeftHip, Kp::RightHip, self.min_confidence)?;
        let dy = hy - sy;
        if dy <= 0.0 {
            return None;
        }
        Some((sx - hx).abs().atan2(dy).to_degrees())
    }
}

impl ExerciseAnalyzer for RunningAnalyzer {
    fn test_type(&self) -> TestType {
        TestType::Running
    }

    fn required_keypoints(&self) -> &'static [&'static [Kp]] {
        REQUIRED
    }

    fn cycle(&self) -> Option<PhaseCycle> {
        None
    }

    fn analyze(&self, pose: &Pose, _baseline: Option<&Baseline>) -> AnalysisResult {
        let ankle_y = |point| get_keypoint(pose, point, self.min_confidence).map(|kp| kp.y);

        let mut issues = Vec::new();
        if self
            .torso_lean(pose)
            .is_some_and(|lean| lean > self.config.max_torso_lean_degrees)
        {
            issues.push(FormIssue::TorsoLean);
        }

        AnalysisResult {
            primary_angle: side_angle(pose, LEFT_LEG, RIGHT_LEG, self.min_confidence),
            issues,
            ankle_heights: [ankle_y(Kp::LeftAnkle), ankle_y(Kp::RightAnkle)],
            stride_length: self.stride_length(pose),
            ..Default::default()
        }
    }
}
