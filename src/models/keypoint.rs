/// Keypoint and pose models
///
/// This module provides the per-frame input contract of the engine: named
/// anatomical keypoints in pixel space, grouped into a pose.

use serde::{Deserialize, Serialize};

/// Default confidence gate below which a keypoint is treated as absent
pub const MIN_CONFIDENCE: f32 = 0.3;

/// A detected anatomical landmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Keypoint name (e.g., "left_shoulder")
    pub name: String,
    /// X coordinate in pixels
    pub x: f32,
    /// Y coordinate in pixels, growing downwards
    pub y: f32,
    /// Detection confidence (0-1)
    pub confidence: f32,
}

impl Keypoint {
    /// Create a new keypoint
    pub fn new(name: impl Into<String>, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            confidence,
        }
    }

    /// Check if the keypoint passes the confidence gate
    pub fn is_confident(&self, min_confidence: f32) -> bool {
        self.confidence >= min_confidence
    }

    /// Calculate Euclidean distance to another keypoint
    pub fn distance_to(&self, other: &Keypoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// COCO keypoint vocabulary (17 points)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CocoKeypoint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl CocoKeypoint {
    /// Get keypoint name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    /// All keypoints in COCO index order
    pub const ALL: [CocoKeypoint; 17] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];
}

/// One analyzed frame of keypoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Detected keypoints (any order)
    pub keypoints: Vec<Keypoint>,
    /// Overall detection confidence (0-1)
    #[serde(default)]
    pub confidence: f32,
    /// Frame capture time in milliseconds
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl Pose {
    /// Create a new pose
    pub fn new(keypoints: Vec<Keypoint>, confidence: f32, timestamp_ms: u64) -> Self {
        Self {
            keypoints,
            confidence,
            timestamp_ms,
        }
    }

    /// Get keypoint by name regardless of confidence
    pub fn keypoint(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }
}
