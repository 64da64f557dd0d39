// Shared test utilities: synthetic pose streams for tracker scenarios

#![allow(dead_code)]

use fitness_assess::models::{Keypoint, Pose};

/// Frame spacing used by the scenarios (10 Hz producer)
pub const FRAME_MS: u64 = 100;

pub struct MockPoseGenerator;

impl MockPoseGenerator {
    fn pose(points: Vec<(&str, f32, f32)>, timestamp_ms: u64) -> Pose {
        Pose::new(
            points
                .into_iter()
                .map(|(name, x, y)| Keypoint::new(name, x, y, 0.9))
                .collect(),
            0.9,
            timestamp_ms,
        )
    }

    /// Side-view squat with the given knee angle, vertical shin and upright torso
    pub fn squat(knee_angle: f32, timestamp_ms: u64) -> Pose {
        let (ankle_x, ankle_y) = (300.0, 700.0);
        let (knee_x, knee_y) = (300.0, 550.0);
        let rad = knee_angle.to_radians();
        let (hip_x, hip_y) = (knee_x + 150.0 * rad.sin(), knee_y + 150.0 * rad.cos());

        Self::pose(
            vec![
                ("nose", hip_x, hip_y - 280.0),
                ("left_shoulder", hip_x, hip_y - 200.0),
                ("left_hip", hip_x, hip_y),
                ("left_knee", knee_x, knee_y),
                ("left_ankle", ankle_x, ankle_y),
            ],
            timestamp_ms,
        )
    }

    /// Side-view push-up; `bent` puts the elbow at 90°, `hip_offset` breaks the body line
    pub fn pushup(bent: bool, hip_offset: f32, timestamp_ms: u64) -> Pose {
        let elbow = if bent { (280.0, 480.0) } else { (200.0, 480.0) };
        Self::pose(
            vec![
                ("left_shoulder", 200.0, 400.0),
                ("left_elbow", elbow.0, elbow.1),
                ("left_wrist", 200.0, 560.0),
                ("left_hip", 400.0, 450.0 + hip_offset),
                ("left_ankle", 600.0, 500.0),
            ],
            timestamp_ms,
        )
    }

    /// Front-view standing figure with the ankles at `ankle_y`
    pub fn jumper(ankle_y: f32, timestamp_ms: u64) -> Pose {
        Self::pose(
            vec![
                ("nose", 300.0, ankle_y - 600.0),
                ("left_hip", 280.0, ankle_y - 300.0),
                ("right_hip", 320.0, ankle_y - 300.0),
                ("left_knee", 270.0, ankle_y - 150.0),
                ("right_knee", 330.0, ankle_y - 150.0),
                ("left_ankle", 260.0, ankle_y),
                ("right_ankle", 340.0, ankle_y),
            ],
            timestamp_ms,
        )
    }

    /// Side-view runner with independent ankle heights
    pub fn runner(left_ankle_y: f32, right_ankle_y: f32, timestamp_ms: u64) -> Pose {
        Self::pose(
            vec![
                ("left_shoulder", 305.0, 200.0),
                ("left_hip", 300.0, 400.0),
                ("right_hip", 302.0, 400.0),
                ("left_ankle", 300.0, left_ankle_y),
                ("right_ankle", 302.0, right_ankle_y),
            ],
            timestamp_ms,
        )
    }

    /// Side-view sit-up, lying flat or curled up; `knees_apart` splays the knees
    pub fn situp(curled: bool, knees_apart: bool, timestamp_ms: u64) -> Pose {
        let shoulder = if curled { (380.0, 320.0) } else { (100.0, 500.0) };
        let mut points = vec![
            ("left_shoulder", shoulder.0, shoulder.1),
            ("left_hip", 300.0, 500.0),
            ("left_knee", 450.0, 450.0),
        ];
        if knees_apart {
            points.push(("right_hip", 320.0, 500.0));
            points.push(("right_knee", 200.0, 450.0));
        }
        Self::pose(points, timestamp_ms)
    }

    /// Pull-up from a bar gripped at y=50; `bent` flexes the elbow to 90°
    /// and `hip_x` away from 300 swings the hips
    pub fn pullup(nose_y: f32, bent: bool, hip_x: f32, timestamp_ms: u64) -> Pose {
        let (elbow, shoulder_y) = if bent { ((360.0, 110.0), 170.0) } else { ((300.0, 110.0), 180.0) };
        Self::pose(
            vec![
                ("nose", 300.0, nose_y),
                ("left_wrist", 300.0, 50.0),
                ("left_elbow", elbow.0, elbow.1),
                ("left_shoulder", 300.0, shoulder_y),
                ("left_hip", hip_x, 400.0),
            ],
            timestamp_ms,
        )
    }

    /// Alternating ankle lifts every third frame at 125 ms spacing, i.e. one
    /// step every 375 ms (160 steps/min)
    pub fn running_sequence(duration_ms: u64) -> Vec<Pose> {
        const SPACING_MS: u64 = 125;
        (0..duration_ms / SPACING_MS)
            .map(|i| {
                let left = if i % 6 == 2 { 680.0 } else { 700.0 };
                let right = if i % 6 == 5 { 680.0 } else { 700.0 };
                Self::runner(left, right, i * SPACING_MS)
            })
            .collect()
    }

    /// Head and shoulders only
    pub fn out_of_frame(timestamp_ms: u64) -> Pose {
        Self::pose(
            vec![
                ("nose", 300.0, 100.0),
                ("left_shoulder", 270.0, 180.0),
                ("right_shoulder", 330.0, 180.0),
            ],
            timestamp_ms,
        )
    }

    /// Squat frames from a list of knee angles, spaced `spacing_ms` apart
    pub fn squat_sequence(angles: &[f32], spacing_ms: u64) -> Vec<Pose> {
        angles
            .iter()
            .enumerate()
            .map(|(i, angle)| Self::squat(*angle, i as u64 * spacing_ms))
            .collect()
    }
}
