use crate::config::PullupThresholds;
use crate::models::exercise::{FormIssue, TestType};
use crate::models::keypoint::{CocoKeypoint as Kp, Pose};
use crate::services::geometry::{get_keypoint, midpoint, side_angle, LEFT_ARM, RIGHT_ARM};

use super::{AnalysisResult, Baseline, ExerciseAnalyzer, PhaseCycle};

const REQUIRED: &[&[Kp]] = &[
    &[Kp::Nose],
    &[Kp::LeftShoulder, Kp::RightShoulder],
    &[Kp::LeftElbow, Kp::RightElbow],
    &[Kp::LeftWrist, Kp::RightWrist],
];

/// Pull-ups: elbow angle plus chin clearance over the bar (taken at the wrists)
pub struct PullupAnalyzer {
    thresholds: PullupThresholds,
    min_confidence: f32,
}

impl PullupAnalyzer {
    pub fn new(thresholds: PullupThresholds, min_confidence: f32) -> Self {
        Self {
            thresholds,
            min_confidence,
        }
    }

    pub fn is_arms_extended(&self, elbow_angle: f32) -> bool {
        elbow_angle >= self.thresholds.extended_elbow_angle - self.thresholds.extended_tolerance
    }

    pub fn is_arms_bent(&self, elbow_angle: f32) -> bool {
        elbow_angle <= self.thresholds.bent_elbow_angle + self.thresholds.bent_tolerance
    }

    fn chin_above_bar(&self, pose: &Pose) -> Option<bool> {
        let nose = get_keypoint(pose, Kp::Nose, self.min_confidence)?;
        let (_, bar_y) = midpoint(pose, Kp::LeftWrist, Kp::RightWrist, self.min_confidence)?;
        Some(nose.y < bar_y)
    }

    fn swing_offset(&self, pose: &Pose) -> Option<f32> {
        let (shoulder_x, _) =
            midpoint(pose, Kp::LeftShoulder, Kp::RightShoulder, self.min_confidence)?;
        let (hip_x, _) = midpoint(pose, Kp::LeftHip, Kp::RightHip, self.min_confidence)?;
        Some((hip_x - shoulder_x).abs())
    }
}

impl ExerciseAnalyzer for PullupAnalyzer {
    fn test_type(&self) -> TestType {
        TestType::Pullups
    }

    fn required_keypoints(&self) -> &'static [&'static [Kp]] {
        REQUIRED
    }

    fn cycle(&self) -> Option<PhaseCycle> {
        Some(PhaseCycle::BOTTOM_ARMED)
    }

    fn analyze(&self, pose: &Pose, _baseline: Option<&Baseline>) -> AnalysisResult {
        let elbow_angle = side_angle(pose, LEFT_ARM, RIGHT_ARM, self.min_confidence);
        let chin_above_bar = self.chin_above_bar(pose).unwrap_or(false);
        let bent = elbow_angle.is_some_and(|angle| self.is_arms_bent(angle));

        let mut issues = Vec::new();
        if bent && !chin_above_bar {
            issues.push(FormIssue::InsufficientChinClearance);
        }
        if self
            .swing_offset(pose)
            .is_some_and(|offset| offset > self.thresholds.max_swing_px)
        {
            issues.push(FormIssue::ExcessiveSwing);
        }

        AnalysisResult {
            primary_angle: elbow_angle,
            is_armed: elbow_angle.is_some_and(|angle| self.is_arms_extended(angle)),
            is_engaged: bent && chin_above_bar,
            issues,
            ..Default::default()
        }
    }
}
