use crate::config::SquatThresholds;
use crate::models::exercise::{FormIssue, TestType};
use crate::models::keypoint::{CocoKeypoint as Kp, Pose};
use crate::services::geometry::{
    angle_between, pick_side, side_angle, LEFT_HIP_HINGE, LEFT_LEG, RIGHT_HIP_HINGE, RIGHT_LEG,
};

use super::{AnalysisResult, Baseline, ExerciseAnalyzer, PhaseCycle};

const REQUIRED: &[&[Kp]] = &[
    &[Kp::LeftHip, Kp::RightHip],
    &[Kp::LeftKnee, Kp::RightKnee],
    &[Kp::LeftAnkle, Kp::RightAnkle],
];

/// Squats: knee angle (hip-knee-ankle), standing vs. squat depth
pub struct SquatAnalyzer {
    thresholds: SquatThresholds,
    min_confidence: f32,
}

impl SquatAnalyzer {
    pub fn new(thresholds: SquatThresholds, min_confidence: f32) -> Self {
        Self {
            thresholds,
            min_confidence,
        }
    }

    pub fn is_standing_position(&self, knee_angle: f32) -> bool {
        knee_angle >= self.thresholds.standing_knee_angle - self.thresholds.standing_tolerance
    }

    pub fn is_squat_position(&self, knee_angle: f32) -> bool {
        knee_angle <= self.thresholds.squat_knee_angle + self.thresholds.squat_tolerance
    }

    fn form_issues(&self, pose: &Pose) -> Vec<FormIssue> {
        let mut issues = Vec::new();

        if let Some([_, knee, ankle]) = pick_side(pose, LEFT_LEG, RIGHT_LEG, self.min_confidence) {
            if (knee.x - ankle.x).abs() > self.thresholds.knee_forward_px {
                issues.push(FormIssue::KneesPastToes);
            }
        }

        if let Some([shoulder, hip, knee]) =
            pick_side(pose, LEFT_HIP_HINGE, RIGHT_HIP_HINGE, self.min_confidence)
        {
            if angle_between(shoulder, hip, knee) < self.thresholds.forward_lean_hip_angle {
                issues.push(FormIssue::ExcessiveForwardLean);
            }
        }

        issues
    }
}

impl ExerciseAnalyzer for SquatAnalyzer {
    fn test_type(&self) -> TestType {
        TestType::Squats
    }

    fn required_keypoints(&self) -> &'static [&'static [Kp]] {
        REQUIRED
    }

    fn cycle(&self) -> Option<PhaseCycle> {
        Some(PhaseCycle::TOP_ARMED)
    }

    fn analyze(&self, pose: &Pose, _baseline: Option<&Baseline>) -> AnalysisResult {
        let knee_angle = side_angle(pose, LEFT_LEG, RIGHT_LEG, self.min_confidence);

        AnalysisResult {
            primary_angle: knee_angle,
            is_armed: knee_angle.is_some_and(|angle| self.is_standing_position(angle)),
            is_engaged: knee_angle.is_some_and(|angle| self.is_squat_position(angle)),
            issues: self.form_issues(pose),
            ..Default::default()
        }
    }
}
