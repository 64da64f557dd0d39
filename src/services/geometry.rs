/// Geometry helpers shared by the exercise analyzers
///
/// - Interior angle at a joint from three keypoints
/// - Confidence-gated keypoint lookup (a gated-out point is unknown, never zero)
/// - Left/right side selection preferring the left side
use crate::models::keypoint::{CocoKeypoint as Kp, Keypoint, Pose};

pub const LEFT_LEG: [Kp; 3] = [Kp::LeftHip, Kp::LeftKnee, Kp::LeftAnkle];
pub const RIGHT_LEG: [Kp; 3] = [Kp::RightHip, Kp::RightKnee, Kp::RightAnkle];
pub const LEFT_ARM: [Kp; 3] = [Kp::LeftShoulder, Kp::LeftElbow, Kp::LeftWrist];
pub const RIGHT_ARM: [Kp; 3] = [Kp::RightShoulder, Kp::RightElbow, Kp::RightWrist];
pub const LEFT_HIP_HINGE: [Kp; 3] = [Kp::LeftShoulder, Kp::LeftHip, Kp::LeftKnee];
pub const RIGHT_HIP_HINGE: [Kp; 3] = [Kp::RightShoulder, Kp::RightHip, Kp::RightKnee];
pub const LEFT_BODY_LINE: [Kp; 3] = [Kp::LeftShoulder, Kp::LeftHip, Kp::LeftAnkle];
pub const RIGHT_BODY_LINE: [Kp; 3] = [Kp::RightShoulder, Kp::RightHip, Kp::RightAnkle];

/// Interior angle at `vertex` in degrees, in [0, 180]
///
/// Computed as the difference of the `atan2` headings of vertex→a and
/// vertex→c, reflecting results above 180°.
pub fn angle_between(a: &Keypoint, vertex: &Keypoint, c: &Keypoint) -> f32 {
    let radians = (c.y - vertex.y).atan2(c.x - vertex.x) - (a.y - vertex.y).atan2(a.x - vertex.x);
    let mut degrees = radians.to_degrees().abs();
    if degrees > 180.0 {
        degrees = 360.0 - degrees;
    }
    degrees.clamp(0.0, 180.0)
}

/// Named keypoint, only if it passes the confidence gate
pub fn get_keypoint(pose: &Pose, point: Kp, min_confidence: f32) -> Option<&Keypoint> {
    pose.keypoint(point.name())
        .filter(|kp| kp.is_confident(min_confidence))
}

/// All requested keypoints, or `None` if any is missing or gated out
pub fn gather<'a, const N: usize>(
    pose: &'a Pose,
    points: [Kp; N],
    min_confidence: f32,
) -> Option<[&'a Keypoint; N]> {
    let found = points
        .iter()
        .map(|point| get_keypoint(pose, *point, min_confidence))
        .collect::<Option<Vec<_>>>()?;
    found.try_into().ok()
}

/// The left chain if complete, otherwise the right one
pub fn pick_side<'a, const N: usize>(
    pose: &'a Pose,
    left: [Kp; N],
    right: [Kp; N],
    min_confidence: f32,
) -> Option<[&'a Keypoint; N]> {
    gather(pose, left, min_confidence).or_else(|| gather(pose, right, min_confidence))
}

/// Angle at the middle point of a three-point chain, preferring the left side
pub fn side_angle(pose: &Pose, left: [Kp; 3], right: [Kp; 3], min_confidence: f32) -> Option<f32> {
    pick_side(pose, left, right, min_confidence).map(|[a, b, c]| angle_between(a, b, c))
}

/// Midpoint of the left and right keypoints, or whichever one is present
pub fn midpoint(pose: &Pose, left: Kp, right: Kp, min_confidence: f32) -> Option<(f32, f32)> {
    match (
        get_keypoint(pose, left, min_confidence),
        get_keypoint(pose, right, min_confidence),
    ) {
        (Some(l), Some(r)) => Some(((l.x + r.x) / 2.0, (l.y + r.y) / 2.0)),
        (Some(kp), None) | (None, Some(kp)) => Some((kp.x, kp.y)),
        (None, None) => None,
    }
}

/// Horizontal gap between a left/right pair, when both are present
pub fn horizontal_gap(pose: &Pose, left: Kp, right: Kp, min_confidence: f32) -> Option<f32> {
    let l = get_keypoint(pose, left, min_confidence)?;
    let r = get_keypoint(pose, right, min_confidence)?;
    Some((l.x - r.x).abs())
}

/// True when every group has at least one keypoint passing the gate
pub fn has_required_groups(pose: &Pose, groups: &[&[Kp]], min_confidence: f32) -> bool {
    groups.iter().all(|group| {
        group
            .iter()
            .any(|point| get_keypoint(pose, *point, min_confidence).is_some())
    })
}
