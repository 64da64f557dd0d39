use crate::config::JumpThresholds;
use crate::models::exercise::{FormIssue, TestType};
use crate::models::keypoint::{CocoKeypoint as Kp, Pose};
use crate::services::geometry::{horizontal_gap, midpoint, side_angle, LEFT_LEG, RIGHT_LEG};

use super::{AnalysisResult, Baseline, ExerciseAnalyzer, PhaseCycle};

const REQUIRED: &[&[Kp]] = &[
    &[Kp::LeftHip, Kp::RightHip],
    &[Kp::LeftKnee, Kp::RightKnee],
    &[Kp::LeftAnkle, Kp::RightAnkle],
];

/// Vertical jump: ankle rise over the calibrated stance, normalized by body height
pub struct JumpAnalyzer {
    thresholds: JumpThresholds,
    min_confidence: f32,
}

impl JumpAnalyzer {
    pub fn new(thresholds: JumpThresholds, min_confidence: f32) -> Self {
        Self {
            thresholds,
            min_confidence,
        }
    }

    /// Height ratio over the baseline; 0 when uncalibrated or unmeasurable
    pub fn height_ratio(&self, pose: &Pose, baseline: Option<&Baseline>) -> f32 {
        let Some(baseline) = baseline else {
            return 0.0;
        };
        match midpoint(pose, Kp::LeftAnkle, Kp::RightAnkle, self.min_confidence) {
            Some((_, ankle_y)) => ((baseline.ankle_y - ankle_y) / baseline.body_height).max(0.0),
            None => 0.0,
        }
    }

    pub fn is_airborne(&self, height_ratio: f32) -> bool {
        height_ratio > self.thresholds.airborne_height_ratio
    }

    fn knees_caving(&self, pose: &Pose) -> bool {
        let knee_gap = horizontal_gap(pose, Kp::LeftKnee, Kp::RightKnee, self.min_confidence);
        let ankle_gap = horizontal_gap(pose, Kp::LeftAnkle, Kp::RightAnkle, self.min_confidence);

        match (knee_gap, ankle_gap) {
            (Some(knees), Some(ankles)) if ankles > 0.0 => {
                knees < ankles * self.thresholds.knee_caving_ratio
            }
            _ => false,
        }
    }
}

impl ExerciseAnalyzer for JumpAnalyzer {
    fn test_type(&self) -> TestType {
        TestType::Jump
    }

    fn required_keypoints(&self) -> &'static [&'static [Kp]] {
        REQUIRED
    }

    fn cycle(&self) -> Option<PhaseCycle> {
        Some(PhaseCycle::BOTTOM_ARMED)
    }

    fn analyze(&self, pose: &Pose, baseline: Option<&Baseline>) -> AnalysisResult {
        let ratio = self.height_ratio(pose, baseline);
        let airborne = self.is_airborne(ratio);

        let mut issues = Vec::new();
        // Valgus only matters on the ground (take-off and landing)
        if !airborne && self.knees_caving(pose) {
            issues.push(FormIssue::KneesCaving);
        }

        AnalysisResult {
            primary_angle: side_angle(pose, LEFT_LEG, RIGHT_LEG, self.min_confidence),
            is_armed: !airborne,
            is_engaged: airborne,
            issues,
            jump_height_ratio: Some(ratio),
            ..Default::default()
        }
    }
}
