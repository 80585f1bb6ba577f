//! Shared humanoid fixture for rig tests.

use crate::skeleton::{Bone, Pose, Skeleton};
use glam::Vec3;
use sightline_transform::Transform3D;

/// Builds a minimal humanoid (root, pelvis, spine chain, head, both arm
/// chains) and its idle pose.
///
/// Convention: +X forward, +Y right, +Z up. Arms point straight out along
/// ±Y; upper/lower arm segment lengths are 0.28 and 0.26.
pub fn humanoid() -> (Skeleton, Pose) {
    let mut skel = Skeleton::new();

    let root = skel.add_bone(Bone::new("root"));
    let pelvis = skel.add_bone(Bone::new("pelvis").with_parent(root));
    let spine_01 = skel.add_bone(Bone::new("spine_01").with_parent(pelvis));
    let spine_02 = skel.add_bone(Bone::new("spine_02").with_parent(spine_01));
    let spine_03 = skel.add_bone(Bone::new("spine_03").with_parent(spine_02));
    let neck_01 = skel.add_bone(Bone::new("neck_01").with_parent(spine_03));
    let head = skel.add_bone(Bone::new("head").with_parent(neck_01));

    let clavicle_r = skel.add_bone(Bone::new("clavicle_r").with_parent(spine_03));
    let upperarm_r = skel.add_bone(Bone::new("upperarm_r").with_parent(clavicle_r));
    let lowerarm_r = skel.add_bone(Bone::new("lowerarm_r").with_parent(upperarm_r));
    let hand_r = skel.add_bone(Bone::new("hand_r").with_parent(lowerarm_r));

    let clavicle_l = skel.add_bone(Bone::new("clavicle_l").with_parent(spine_03));
    let upperarm_l = skel.add_bone(Bone::new("upperarm_l").with_parent(clavicle_l));
    let lowerarm_l = skel.add_bone(Bone::new("lowerarm_l").with_parent(upperarm_l));
    let hand_l = skel.add_bone(Bone::new("hand_l").with_parent(lowerarm_l));

    let mut pose = Pose::identity(skel.bone_count());
    let mut set = |id, x, y, z| {
        pose.set(id, Transform3D::from_translation(Vec3::new(x, y, z)));
    };

    set(pelvis, 0.0, 0.0, 0.9);
    set(spine_01, 0.0, 0.0, 0.1);
    set(spine_02, 0.0, 0.0, 0.1);
    set(spine_03, 0.0, 0.0, 0.15);
    set(neck_01, 0.0, 0.0, 0.15);
    set(head, 0.0, 0.0, 0.1);

    set(clavicle_r, 0.0, 0.08, 0.12);
    set(upperarm_r, 0.0, 0.12, 0.0);
    set(lowerarm_r, 0.0, 0.28, 0.0);
    set(hand_r, 0.0, 0.26, 0.0);

    set(clavicle_l, 0.0, -0.08, 0.12);
    set(upperarm_l, 0.0, -0.12, 0.0);
    set(lowerarm_l, 0.0, -0.28, 0.0);
    set(hand_l, 0.0, -0.26, 0.0);

    (skel, pose)
}
