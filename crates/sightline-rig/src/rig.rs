//! Rig evaluation entry points.
//!
//! [`AimRig`] owns the joint bindings, their resolution against the current
//! skeleton, and the per-frame parameter copy. Evaluation runs the full
//! pipeline in strict order: spine aim offset, weapon transform composition,
//! per-arm IK, then the alpha-weighted commit back into the pose. A rig whose
//! topology failed to resolve passes the pose through untouched.

use crate::aim_offset::apply_aim_offset;
use crate::error::TopologyError;
use crate::params::RigParameters;
use crate::skeleton::{Pose, Skeleton};
use crate::topology::{ResolvedBones, RigJoints};
use crate::two_bone::solve_two_bone;
use crate::weapon::{arm_targets, compose_weapon_transforms, ArmSide, InitialTransforms};
use crate::ALPHA_EPSILON;
use sightline_transform::Transform3D;

/// A first-person aim rig bound to a skeleton.
///
/// Hosts call [`resolve_bones`](Self::resolve_bones) once per skeleton load
/// (and again on every skeleton swap), [`update`](Self::update) each frame to
/// copy in gathered parameters, and [`evaluate`](Self::evaluate) from the
/// pose-evaluation pass. `evaluate` takes `&self` and keeps all working data
/// on the stack, so it is safe to call from a worker thread.
#[derive(Debug, Clone)]
pub struct AimRig {
    joints: RigJoints,
    resolved: Option<ResolvedBones>,
    topology_error: Option<TopologyError>,
    params: RigParameters,
}

impl Default for AimRig {
    fn default() -> Self {
        Self::new(RigJoints::default())
    }
}

impl AimRig {
    /// Creates a rig with the given joint bindings. Not evaluable until
    /// [`resolve_bones`](Self::resolve_bones) succeeds.
    pub fn new(joints: RigJoints) -> Self {
        Self {
            joints,
            resolved: None,
            topology_error: None,
            params: RigParameters::default(),
        }
    }

    /// Returns the joint bindings.
    pub fn joints(&self) -> &RigJoints {
        &self.joints
    }

    /// Replaces the joint bindings, invalidating any previous resolution.
    pub fn set_joints(&mut self, joints: RigJoints) {
        self.joints = joints;
        self.resolved = None;
        self.topology_error = None;
    }

    /// Resolves the joint bindings against a skeleton.
    ///
    /// On failure the rig becomes non-evaluable and the error stays queryable
    /// through [`topology_error`](Self::topology_error).
    pub fn resolve_bones(&mut self, skeleton: &Skeleton) -> Result<(), TopologyError> {
        match self.joints.resolve(skeleton) {
            Ok(resolved) => {
                self.resolved = Some(resolved);
                self.topology_error = None;
                Ok(())
            }
            Err(err) => {
                self.resolved = None;
                self.topology_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Copies in the frame's parameters. Cheap and side-effect free.
    pub fn update(&mut self, params: RigParameters) {
        self.params = params;
    }

    /// Returns the current parameters.
    pub fn params(&self) -> &RigParameters {
        &self.params
    }

    /// Returns true if topology resolved and evaluation will modify the pose.
    pub fn is_evaluable(&self) -> bool {
        self.resolved.is_some()
    }

    /// Returns the stored resolution error, if any.
    pub fn topology_error(&self) -> Option<&TopologyError> {
        self.topology_error.as_ref()
    }

    /// Evaluates the rig, blending arm and spine bones into `pose` in place.
    ///
    /// `reference_pose` is a separately evaluated idle pose sharing the
    /// skeleton's topology. Unresolved topology or a near-zero master alpha
    /// leaves the pose bit-identical; a near-zero arms alpha with a non-empty
    /// spine chain runs the aim offset alone.
    pub fn evaluate(&self, skeleton: &Skeleton, pose: &mut Pose, reference_pose: &Pose) {
        let Some(bones) = &self.resolved else {
            return;
        };
        let params = &self.params;
        if params.alpha.abs() < ALPHA_EPSILON {
            return;
        }

        if params.arms_alpha.abs() < ALPHA_EPSILON && !bones.spine.is_empty() {
            apply_aim_offset(skeleton, pose, reference_pose, bones, params);
            return;
        }

        // Aiming head additive, applied before any initial capture so the
        // camera anchors on the offset head.
        let head = pose.get(bones.head);
        let head_offset = Transform3D::from_rotation(params.aiming_head_rotation_offset);
        pose.blend_bone(
            bones.head,
            head.relative_to(&head_offset),
            params.aiming_value,
        );

        let initial = InitialTransforms::capture(skeleton, pose, bones, params);

        let offset_inverse = apply_aim_offset(skeleton, pose, reference_pose, bones, params);

        // Arm chains in component space, after the spine moved under them
        let mut right_upper = pose.component_transform(skeleton, bones.right_upper_arm);
        let mut right_lower = pose.get(bones.right_lower_arm).compose(&right_upper);
        let mut right_hand = pose.get(bones.right_hand).compose(&right_lower);

        let mut left_upper = pose.component_transform(skeleton, bones.left_upper_arm);
        let mut left_lower = pose.get(bones.left_lower_arm).compose(&left_upper);
        let mut left_hand = pose.get(bones.left_hand).compose(&left_lower);

        let transforms =
            compose_weapon_transforms(skeleton, pose, bones, params, &initial, offset_inverse);

        let right = arm_targets(ArmSide::Right, &initial, &transforms, params);
        solve_two_bone(
            &mut right_upper,
            &mut right_lower,
            &mut right_hand,
            right.joint_location,
            right.effector.translation,
        );
        right_hand.rotation = right.effector.rotation;

        let left = arm_targets(ArmSide::Left, &initial, &transforms, params);
        solve_two_bone(
            &mut left_upper,
            &mut left_lower,
            &mut left_hand,
            left.joint_location,
            left.effector.translation,
        );
        left_hand.rotation = left.effector.rotation;

        // Commit relative to the solved chain, parent before child
        let total_arms_alpha = params.alpha * params.arms_alpha;

        let right_parent = pose.component_transform(skeleton, bones.right_upper_arm_parent);
        pose.blend_bone(
            bones.right_upper_arm,
            right_upper.relative_to(&right_parent),
            total_arms_alpha,
        );
        pose.blend_bone(
            bones.right_lower_arm,
            right_lower.relative_to(&right_upper),
            total_arms_alpha,
        );
        pose.blend_bone(
            bones.right_hand,
            right_hand.relative_to(&right_lower),
            total_arms_alpha,
        );

        let left_parent = pose.component_transform(skeleton, bones.left_upper_arm_parent);
        pose.blend_bone(
            bones.left_upper_arm,
            left_upper.relative_to(&left_parent),
            total_arms_alpha,
        );
        pose.blend_bone(
            bones.left_lower_arm,
            left_lower.relative_to(&left_upper),
            total_arms_alpha,
        );
        pose.blend_bone(
            bones.left_hand,
            left_hand.relative_to(&left_lower),
            total_arms_alpha,
        );
    }
}
