use crate::config::SitupThresholds;
use crate::models::exercise::{FormIssue, TestType};
use crate::models::keypoint::{CocoKeypoint as Kp, Pose};
use crate::services::geometry::{horizontal_gap, side_angle, LEFT_HIP_HINGE, RIGHT_HIP_HINGE};

use super::{AnalysisResult, Baseline, ExerciseAnalyzer, PhaseCycle};

const REQUIRED: &[&[Kp]] = &[
    &[Kp::LeftShoulder, Kp::RightShoulder],
    &[Kp::LeftHip, Kp::RightHip],
    &[Kp::LeftKnee, Kp::RightKnee],
];

/// Sit-ups: hip angle (shoulder-hip-knee), torso down vs. torso up
pub struct SitupAnalyzer {
    thresholds: SitupThresholds,
    min_confidence: f32,
}

impl SitupAnalyzer {
    pub fn new(thresholds: SitupThresholds, min_confidence: f32) -> Self {
        Self {
            thresholds,
            min_confidence,
        }
    }

    pub fn is_torso_down(&self, hip_angle: f32) -> bool {
        hip_angle >= self.thresholds.down_hip_angle - self.thresholds.down_tolerance
    }

    pub fn is_torso_up(&self, hip_angle: f32) -> bool {
        hip_angle <= self.thresholds.up_hip_angle + self.thresholds.up_tolerance
    }

    fn knees_separated(&self, pose: &Pose) -> bool {
        let knee_gap = horizontal_gap(pose, Kp::LeftKnee, Kp::RightKnee, self.min_confidence);
        let hip_gap = horizontal_gap(pose, Kp::LeftHip, Kp::RightHip, self.min_confidence);

        match (knee_gap, hip_gap) {
            (Some(knees), Some(hips)) if hips > 0.0 => {
                knees > hips * self.thresholds.knee_separation_ratio
            }
            _ => false,
        }
    }
}

impl ExerciseAnalyzer for SitupAnalyzer {
    fn test_type(&self) -> TestType {
        TestType::Situps
    }

    fn required_keypoints(&self) -> &'static [&'static [Kp]] {
        REQUIRED
    }

    fn cycle(&self) -> Option<PhaseCycle> {
        Some(PhaseCycle::BOTTOM_ARMED)
    }

    fn analyze(&self, pose: &Pose, _baseline: Option<&Baseline>) -> AnalysisResult {
        let hip_angle = side_angle(pose, LEFT_HIP_HINGE, RIGHT_HIP_HINGE, self.min_confidence);

        let mut issues = Vec::new();
        if self.knees_separated(pose) {
            issues.push(FormIssue::KneesSeparated);
        }

        AnalysisResult {
            primary_angle: hip_angle,
            is_armed: hip_angle.is_some_and(|angle| self.is_torso_down(angle)),
            is_engaged: hip_angle.is_some_and(|angle| self.is_torso_up(angle)),
            issues,
            ..Default::default()
        }
    }
}
