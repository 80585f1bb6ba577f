//! First-person-shooter procedural character rig.
//!
//! Re-poses a humanoid skeleton's arms and spine each frame so a held weapon
//! tracks a camera-driven aim direction: a procedural spine/aim-offset blend
//! leans the upper body toward the camera, a weapon transform composer blends
//! sway-following and sights-aligned placements, and analytic two-bone IK
//! plants both hands on the weapon. The host animation graph owns poses and
//! bone storage; this crate is a pure per-frame function of its inputs.
//!
//! # Conventions
//!
//! - Right-handed, **+X forward, +Y right, +Z up**. Angles in radians.
//! - Bone-space transforms are relative to the immediate parent; component
//!   space is relative to the skeleton root, composed on demand.
//!
//! # Usage
//!
//! ```
//! use sightline_rig::{AimRig, EulerAngles, RigParameters};
//! # use sightline_rig::{Bone, Pose, Skeleton};
//! # fn skeleton_and_poses() -> (Skeleton, Pose, Pose) {
//! #     let mut skel = Skeleton::new();
//! #     let root = skel.add_bone(Bone::new("root"));
//! #     let pelvis = skel.add_bone(Bone::new("pelvis").with_parent(root));
//! #     let spine_01 = skel.add_bone(Bone::new("spine_01").with_parent(pelvis));
//! #     let spine_02 = skel.add_bone(Bone::new("spine_02").with_parent(spine_01));
//! #     let spine_03 = skel.add_bone(Bone::new("spine_03").with_parent(spine_02));
//! #     let neck_01 = skel.add_bone(Bone::new("neck_01").with_parent(spine_03));
//! #     let _head = skel.add_bone(Bone::new("head").with_parent(neck_01));
//! #     let cr = skel.add_bone(Bone::new("clavicle_r").with_parent(spine_03));
//! #     let ur = skel.add_bone(Bone::new("upperarm_r").with_parent(cr));
//! #     let lr = skel.add_bone(Bone::new("lowerarm_r").with_parent(ur));
//! #     let _hr = skel.add_bone(Bone::new("hand_r").with_parent(lr));
//! #     let cl = skel.add_bone(Bone::new("clavicle_l").with_parent(spine_03));
//! #     let ul = skel.add_bone(Bone::new("upperarm_l").with_parent(cl));
//! #     let ll = skel.add_bone(Bone::new("lowerarm_l").with_parent(ul));
//! #     let _hl = skel.add_bone(Bone::new("hand_l").with_parent(ll));
//! #     let pose = Pose::identity(skel.bone_count());
//! #     let reference = pose.clone();
//! #     (skel, pose, reference)
//! # }
//!
//! let (skeleton, mut pose, reference_pose) = skeleton_and_poses();
//!
//! let mut rig = AimRig::default();
//! rig.resolve_bones(&skeleton)?;
//!
//! // Each frame: copy in gathered inputs, then evaluate
//! let mut params = RigParameters::default();
//! params.camera_relative_rotation = EulerAngles::new(-0.2, 0.6, 0.0);
//! params.aiming_value = 1.0;
//! rig.update(params);
//! rig.evaluate(&skeleton, &mut pose, &reference_pose);
//! # Ok::<(), sightline_rig::TopologyError>(())
//! ```

mod aim_offset;
mod error;
mod params;
mod rig;
mod skeleton;
#[cfg(test)]
mod test_skeleton;
mod topology;
mod two_bone;
mod weapon;

pub use error::TopologyError;
pub use params::{ArmPullback, EulerAngles, Handedness, JointClamp, RigParameters};
pub use rig::AimRig;
pub use skeleton::{Bone, BoneId, Pose, Skeleton};
pub use topology::{ResolvedBones, RigJoints, SpineBone};

/// Blend weights below this are treated as zero.
pub(crate) const ALPHA_EPSILON: f32 = 1e-4;
