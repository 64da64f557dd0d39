use crate::config::PushupThresholds;
use crate::models::exercise::{FormIssue, TestType};
use crate::models::keypoint::{CocoKeypoint as Kp, Pose};
use crate::services::geometry::{
    angle_between, pick_side, side_angle, LEFT_ARM, LEFT_BODY_LINE, RIGHT_ARM, RIGHT_BODY_LINE,
};

use super::{AnalysisResult, Baseline, ExerciseAnalyzer, PhaseCycle};

const REQUIRED: &[&[Kp]] = &[
    &[Kp::LeftShoulder, Kp::RightShoulder],
    &[Kp::LeftElbow, Kp::RightElbow],
    &[Kp::LeftWrist, Kp::RightWrist],
    &[Kp::LeftHip, Kp::RightHip],
];

/// Push-ups: elbow angle (shoulder-elbow-wrist), arms extended vs. bent
pub struct PushupAnalyzer {
    thresholds: PushupThresholds,
    min_confidence: f32,
}

impl PushupAnalyzer {
    pub fn new(thresholds: PushupThresholds, min_confidence: f32) -> Self {
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

    /// Hip sag or pike when the shoulder-hip-ankle line bends
    fn body_line_issue(&self, pose: &Pose) -> Option<FormIssue> {
        let [shoulder, hip, ankle] =
            pick_side(pose, LEFT_BODY_LINE, RIGHT_BODY_LINE, self.min_confidence)?;

        if angle_between(shoulder, hip, ankle) >= self.thresholds.body_line_angle {
            return None;
        }

        let dx = ankle.x - shoulder.x;
        if dx.abs() < f32::EPSILON {
            return None;
        }

        // Image y grows downwards: a hip below the shoulder-ankle line sags
        let line_y = shoulder.y + (ankle.y - shoulder.y) * (hip.x - shoulder.x) / dx;
        if hip.y > line_y {
            Some(FormIssue::HipSag)
        } else {
            Some(FormIssue::HipPike)
        }
    }
}

impl ExerciseAnalyzer for PushupAnalyzer {
    fn test_type(&self) -> TestType {
        TestType::Pushups
    }

    fn required_keypoints(&self) -> &'static [&'static [Kp]] {
        REQUIRED
    }

    fn cycle(&self) -> Option<PhaseCycle> {
        Some(PhaseCycle::TOP_ARMED)
    }

    fn analyze(&self, pose: &Pose, _baseline: Option<&Baseline>) -> AnalysisResult {
        let elbow_angle = side_angle(pose, LEFT_ARM, RIGHT_ARM, self.min_confidence);

        AnalysisResult {
            primary_angle: elbow_angle,
            is_armed: elbow_angle.is_some_and(|angle| self.is_arms_extended(angle)),
            is_engaged: elbow_angle.is_some_and(|angle| self.is_arms_bent(angle)),
            issues: self.body_line_issue(pose).into_iter().collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::pose;
    use super::*;

    fn analyzer() -> PushupAnalyzer {
        PushupAnalyzer::new(PushupThresholds::default(), 0.3)
    }

    /// Side-view plank: shoulder at x=200, ankle at x=600, hip offset vertically
    fn plank(hip_offset: f32, elbow: (f32, f32)) -> Pose {
        pose(&[
            ("left_shoulder", 200.0, 400.0),
            ("left_elbow", elbow.0, elbow.1),
            ("left_wrist", 200.0, 560.0),
            ("left_hip", 400.0, 450.0 + hip_offset),
            ("left_ankle", 600.0, 500.0),
        ])
    }

    #[test]
    fn test_extended_arms_with_straight_body() {
        let result = analyzer().analyze(&plank(0.0, (200.0, 480.0)), None);
        assert!((result.primary_angle.unwrap() - 180.0).abs() < 0.5);
        assert!(result.is_armed);
        assert!(!result.is_engaged);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_bent_arms() {
        // Elbow out to the side of the shoulder-wrist line forms ~90°
        let result = analyzer().analyze(&plank(0.0, (280.0, 480.0)), None);
        assert!(result.is_engaged);
        assert!(!result.is_armed);
    }

    #[test]
    fn test_hip_sag_and_pike() {
        let sag = analyzer().analyze(&plank(80.0, (200.0, 480.0)), None);
        assert_eq!(sag.issues, vec![FormIssue::HipSag]);

        let pike = analyzer().analyze(&plank(-80.0, (200.0, 480.0)), None);
        assert_eq!(pike.issues, vec![FormIssue::HipPike]);
    }
}
