//! Analytic two-bone IK.
//!
//! Closed-form law-of-cosines solve for a shoulder/elbow/hand chain: no
//! iteration, no inter-frame state. Segment lengths are taken from the
//! incoming component-space transforms, so the solve preserves whatever
//! lengths the current pose carries.

use glam::{Quat, Vec3};
use sightline_transform::Transform3D;

const DEGENERATE_EPSILON: f32 = 1e-4;

/// Shortest-arc rotation taking `from` to `to`. Identity when either vector
/// is degenerate.
fn rotation_arc(from: Vec3, to: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from, to)
}

/// Solves the chain in place so the two rigid segments connect the upper
/// bone's current position to `effector_location`, bending toward
/// `joint_target`.
///
/// Unreachable targets fully extend the chain (elbow collinear with shoulder
/// and target). The hand transform gets the solved end position; its rotation
/// is left for the caller to overwrite with the effector rotation.
pub(crate) fn solve_two_bone(
    upper: &mut Transform3D,
    lower: &mut Transform3D,
    hand: &mut Transform3D,
    joint_target: Vec3,
    effector_location: Vec3,
) {
    let root = upper.translation;
    let initial_joint = lower.translation;
    let initial_end = hand.translation;

    let upper_length = (initial_joint - root).length();
    let lower_length = (initial_end - initial_joint).length();

    let desired_delta = effector_location - root;
    let mut desired_length = desired_delta.length();
    let desired_dir = if desired_length < DEGENERATE_EPSILON {
        desired_length = DEGENERATE_EPSILON;
        Vec3::X
    } else {
        desired_delta / desired_length
    };

    // In-plane bend direction perpendicular to the shoulder-effector line
    let joint_delta = joint_target - root;
    let bend_dir = if joint_delta.length_squared() < DEGENERATE_EPSILON * DEGENERATE_EPSILON {
        desired_dir.any_orthonormal_vector()
    } else {
        let plane_normal = desired_dir.cross(joint_delta);
        if plane_normal.length_squared() < DEGENERATE_EPSILON * DEGENERATE_EPSILON {
            // Joint target collinear with the effector line
            desired_dir.any_orthonormal_vector()
        } else {
            (joint_delta - joint_delta.dot(desired_dir) * desired_dir).normalize_or_zero()
        }
    };

    let max_length = upper_length + lower_length;
    let (out_joint, out_end) = if desired_length >= max_length {
        // Full extension
        (
            root + desired_dir * upper_length,
            root + desired_dir * max_length,
        )
    } else {
        let two_ab = 2.0 * upper_length * desired_length;
        let cos_angle = if two_ab > DEGENERATE_EPSILON {
            (upper_length * upper_length + desired_length * desired_length
                - lower_length * lower_length)
                / two_ab
        } else {
            0.0
        };
        // An obtuse shoulder angle puts the elbow behind the shoulder along
        // the effector line
        let reversed = cos_angle < 0.0;
        let angle = cos_angle.clamp(-1.0, 1.0).acos();
        let joint_line_dist = upper_length * angle.sin();
        let projected_sq = upper_length * upper_length - joint_line_dist * joint_line_dist;
        let mut projected = if projected_sq > 0.0 {
            projected_sq.sqrt()
        } else {
            0.0
        };
        if reversed {
            projected = -projected;
        }
        (
            root + desired_dir * projected + bend_dir * joint_line_dist,
            effector_location,
        )
    };

    let upper_delta = rotation_arc(initial_joint - root, out_joint - root);
    upper.rotation = upper_delta * upper.rotation;

    let lower_delta = rotation_arc(initial_end - initial_joint, out_end - out_joint);
    lower.rotation = lower_delta * lower.rotation;
    lower.translation = out_joint;

    hand.translation = out_end;
}
