//! Procedural aim/spine offset solver.
//!
//! Measures how far the animated pose's root-area orientation has diverged
//! from the reference pose (the accumulative offset), then redistributes a
//! weighted fraction of the camera-driven rotation across the spine chain.
//! Undoing pose-driven rotation before applying camera-driven rotation keeps
//! spine bend from animation and spine bend from aiming composing instead of
//! double-applying.

use crate::params::{EulerAngles, RigParameters};
use crate::skeleton::{Pose, Skeleton};
use crate::topology::ResolvedBones;
use crate::ALPHA_EPSILON;
use glam::{Quat, Vec3};
use sightline_transform::Transform3D;
use std::f32::consts::PI;

/// Rotates `v` about `axis` by `angle` radians.
fn rotated_about(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    Quat::from_axis_angle(axis, angle) * v
}

/// Computes the accumulative offset inverse at the stable bone.
///
/// The offset reconciles the current pose against the reference pose:
/// `(ref stable local rotation × current stable component rotation⁻¹ ×
/// ref root rotation)⁻¹`. If the result's angle exceeds a half turn, a full
/// negative turn about the same axis is folded in so downstream consumers
/// never fight across the wrap boundary.
pub(crate) fn accumulative_offset_inverse(
    skeleton: &Skeleton,
    pose: &Pose,
    reference_pose: &Pose,
    bones: &ResolvedBones,
) -> Quat {
    let ref_stable_local = reference_pose.get(bones.stable).rotation;
    let current_stable = pose.component_transform(skeleton, bones.stable).rotation;
    let ref_root = reference_pose.get(bones.root).rotation;

    let mut offset_inverse =
        (ref_stable_local * (current_stable.inverse() * ref_root)).inverse();

    // Reverse twisting past a half turn
    let (axis, angle) = offset_inverse.to_axis_angle();
    if angle.abs() > PI {
        offset_inverse *= Quat::from_axis_angle(axis, -2.0 * PI);
    }

    offset_inverse
}

/// Applies the procedural aim offset to the spine chain and returns the
/// accumulative offset inverse for the weapon composer.
///
/// When `spine_alpha` is nearly zero or the chain is empty, no bone is
/// touched; the offset inverse is still computed and returned.
pub(crate) fn apply_aim_offset(
    skeleton: &Skeleton,
    pose: &mut Pose,
    reference_pose: &Pose,
    bones: &ResolvedBones,
    params: &RigParameters,
) -> Quat {
    let offset_inverse = accumulative_offset_inverse(skeleton, pose, reference_pose, bones);

    if bones.spine.is_empty() || params.spine_alpha.abs() < ALPHA_EPSILON {
        return offset_inverse;
    }

    // Capture per-bone offset inverses before any spine write: later bones
    // must see pre-mutation reference values.
    let root_rotation = pose.get(bones.root).rotation;
    let spine_offset_inverses: Vec<Quat> = bones
        .spine
        .iter()
        .map(|&(bone, _)| {
            let component = pose.component_transform(skeleton, bone).rotation;
            pose.get(bone).rotation * (component.inverse() * root_rotation)
        })
        .collect();

    // Camera target rotation, corrected for the root's current rotation and
    // scaled by the spine alpha.
    let root_inverse = EulerAngles::from_quat(root_rotation).inverse();
    let target = ((params.camera_relative_rotation + root_inverse) * params.spine_alpha)
        .normalized();

    // Compound the camera axes in order: roll, yaw, pitch. Each axis is
    // derived from the result of the previous rotation, not the original
    // basis, which avoids gimbal artifacts under the X-forward/Z-up
    // convention.
    let mut orientation = Quat::IDENTITY;
    orientation *= Quat::from_axis_angle(-(orientation * Vec3::Y), target.roll);
    orientation *= Quat::from_axis_angle(
        rotated_about(orientation * Vec3::Z, Vec3::Y, target.roll * 2.0),
        target.yaw,
    );
    orientation *= Quat::from_axis_angle(
        rotated_about(
            rotated_about(orientation * Vec3::X, -Vec3::Z, target.yaw),
            Vec3::Y,
            target.roll * 2.0,
        ),
        target.pitch,
    );
    orientation *= offset_inverse;

    for (i, &(bone, weight)) in bones.spine.iter().enumerate() {
        let (axis, angle) = orientation.to_axis_angle();

        // Each bone absorbs its weighted share of the total angle, about the
        // axis carried into that bone's pre-mutation frame.
        let angle = angle * weight;
        let axis = spine_offset_inverses[i] * axis;

        let current = pose.get(bone);
        let target_rotation = Quat::from_axis_angle(axis, angle) * current.rotation;
        let blended = current.rotation.lerp(target_rotation, params.alpha);
        pose.set(
            bone,
            Transform3D {
                rotation: blended,
                ..current
            },
        );
    }

    offset_inverse
}
