//! Weapon transform composition.
//!
//! Derives the component-space transform the held weapon should have each
//! frame, blending a non-aiming (sway-following) placement against a
//! sights-aligned aiming placement, then produces the per-arm effector and
//! elbow targets the IK solve aims for. All relative computations anchor on
//! transforms captured before any spine or arm modification.

use crate::params::{EulerAngles, Handedness, RigParameters};
use crate::skeleton::{Pose, Skeleton};
use crate::topology::ResolvedBones;
use crate::ALPHA_EPSILON;
use glam::{Quat, Vec3};
use sightline_transform::{Lerp, Transform3D};

/// Which arm a target computation is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArmSide {
    Right,
    Left,
}

/// Component-space transforms captured from the pose before the aim offset
/// mutates the spine. Everything downstream is expressed relative to these.
#[derive(Debug, Clone)]
pub(crate) struct InitialTransforms {
    pub right_hand: Transform3D,
    pub left_hand: Transform3D,
    pub right_joint: Transform3D,
    pub left_joint: Transform3D,
    pub camera: Transform3D,
    pub weapon: Transform3D,
}

impl InitialTransforms {
    /// Captures initial hand, elbow, camera, and weapon transforms.
    ///
    /// The initial camera carries only the mesh yaw offset; its location is
    /// the camera-relative location composed onto the head bone. The initial
    /// weapon is the weapon's origin-relative transform composed onto the
    /// dominant hand.
    pub fn capture(
        skeleton: &Skeleton,
        pose: &Pose,
        bones: &ResolvedBones,
        params: &RigParameters,
    ) -> Self {
        let right_joint = pose.component_transform(skeleton, bones.right_lower_arm);
        let left_joint = pose.component_transform(skeleton, bones.left_lower_arm);
        let right_hand = pose.get(bones.right_hand).compose(&right_joint);
        let left_hand = pose.get(bones.left_hand).compose(&left_joint);

        let head = pose.component_transform(skeleton, bones.head);
        let camera_location = Transform3D::from_translation(params.camera_relative_location)
            .compose(&head)
            .translation;
        let camera = Transform3D::from_rotation_translation(
            EulerAngles::from_yaw(params.mesh_yaw_offset).to_quat(),
            camera_location,
        );

        let dominant_hand = match params.handedness {
            Handedness::Right => right_hand,
            Handedness::Left => left_hand,
        };
        let weapon = params.origin_relative_transform.compose(&dominant_hand);

        Self {
            right_hand,
            left_hand,
            right_joint,
            left_joint,
            camera,
            weapon,
        }
    }
}

/// The composed component-space weapon transforms for one evaluation.
#[derive(Debug, Clone)]
pub(crate) struct WeaponTransforms {
    /// Current camera transform (live rotation plus mesh yaw, head position).
    pub camera: Transform3D,
    /// Initial weapon expressed relative to the pose-decoupled camera frame.
    pub camera_to_weapon: Transform3D,
    /// Final weapon transform (non-aiming/aiming blend, offset, pullback).
    pub weapon: Transform3D,
    /// The sway-following transform, kept for joint-influence blending.
    pub non_aiming: Transform3D,
    /// Weapon transform used only for elbow target derivation.
    pub joint_influence: Transform3D,
}

/// Composes the live weapon transform from the post-aim-offset pose.
///
/// `offset_inverse` is the accumulative offset inverse from the spine solver;
/// it decouples weapon placement from pose-authored root motion.
pub(crate) fn compose_weapon_transforms(
    skeleton: &Skeleton,
    pose: &Pose,
    bones: &ResolvedBones,
    params: &RigParameters,
    initial: &InitialTransforms,
    offset_inverse: Quat,
) -> WeaponTransforms {
    let head = pose.component_transform(skeleton, bones.head);
    let camera_location = Transform3D::from_translation(params.camera_relative_location)
        .compose(&head)
        .translation;
    let camera_rotation =
        (params.camera_relative_rotation + EulerAngles::from_yaw(params.mesh_yaw_offset)).to_quat();
    let camera = Transform3D::from_rotation_translation(camera_rotation, camera_location);

    // The initial weapon relative to a synthesized frame: root rotation
    // corrected by the inverse accumulative offset, at the initial camera.
    let root_rotation = pose.get(bones.root).rotation;
    let camera_to_weapon = initial.weapon.relative_to(&Transform3D::from_rotation_translation(
        root_rotation * offset_inverse.inverse() * initial.camera.rotation,
        initial.camera.translation,
    ));

    let mut weapon = camera_to_weapon.compose(&camera);

    let aiming = params
        .origin_relative_transform
        .relative_to(&params.sights_relative_transform)
        .compose(&camera);

    // Rotation and location follow the camera-driven weapon independently;
    // alpha zero pins either back to the animated initial weapon.
    let mut non_aiming = params.custom_weapon_offset_transform.compose(&weapon);
    non_aiming.rotation = initial
        .weapon
        .rotation
        .lerp_to(&non_aiming.rotation, params.weapon_rotation_alpha);
    non_aiming.translation = non_aiming.translation * params.weapon_location_alpha
        + initial.weapon.translation * (1.0 - params.weapon_location_alpha);

    weapon = non_aiming.blend(&aiming, params.aiming_value);
    weapon = params.offset_transform.compose(&weapon);

    if params.arm_pullback.is_active(params.aiming_value) {
        // Project the off hand under the candidate weapon transform and
        // compare its reach against the off arm's physical maximum.
        let (off_init_hand, off_upper_arm, off_lower_arm, off_hand) = match params.handedness {
            Handedness::Right => (
                &initial.left_hand,
                bones.left_upper_arm,
                bones.left_lower_arm,
                bones.left_hand,
            ),
            Handedness::Left => (
                &initial.right_hand,
                bones.right_upper_arm,
                bones.right_lower_arm,
                bones.right_hand,
            ),
        };
        let upper_arm_location = pose.component_location(skeleton, off_upper_arm);
        let projected_hand = off_init_hand
            .relative_to(&initial.weapon)
            .compose(&weapon)
            .translation;
        let reach = (upper_arm_location - projected_hand).length();
        let max_reach = pose.segment_length(off_lower_arm) + pose.segment_length(off_hand);

        let pullback = max_reach * params.max_extension - reach;
        if pullback < 0.0 {
            // Pull back directly toward the camera by the excess
            let shift =
                (weapon.translation - camera.translation).normalize_or_zero() * pullback;
            weapon.translation += shift;
            if params.aiming_value.abs() >= ALPHA_EPSILON {
                non_aiming.translation += shift;
            }
        }
    }

    let mut joint_influence = weapon;
    if params.aiming_joint_influence.abs() >= ALPHA_EPSILON {
        joint_influence = joint_influence.blend(&non_aiming, 1.0 - params.aiming_joint_influence);
    }

    WeaponTransforms {
        camera,
        camera_to_weapon,
        weapon,
        non_aiming,
        joint_influence,
    }
}

/// One arm's IK inputs: the hand effector transform and the elbow location.
#[derive(Debug, Clone)]
pub(crate) struct ArmTargets {
    pub effector: Transform3D,
    pub joint_location: Vec3,
}

/// Derives one arm's effector transform and clamped elbow location.
pub(crate) fn arm_targets(
    side: ArmSide,
    initial: &InitialTransforms,
    transforms: &WeaponTransforms,
    params: &RigParameters,
) -> ArmTargets {
    let (init_hand, init_joint, additive, additive_joint_influence, location_offset, clamp) =
        match side {
            ArmSide::Right => (
                &initial.right_hand,
                &initial.right_joint,
                &params.right_hand_additive_transform,
                params.right_hand_additive_joint_influence,
                params.right_joint_location_offset,
                &params.right_joint_clamp,
            ),
            ArmSide::Left => (
                &initial.left_hand,
                &initial.left_joint,
                &params.left_hand_additive_transform,
                params.left_hand_additive_joint_influence,
                params.left_joint_location_offset,
                &params.left_joint_clamp,
            ),
        };

    // The hand rides the weapon, corrected by the designer additive. The
    // additive applies inside the weapon frame on the right and outside it on
    // the left, matching how off-hand grips are authored.
    let hand_relative = init_hand.relative_to(&initial.weapon);
    let effector = match side {
        ArmSide::Right => hand_relative.compose(&additive.compose(&transforms.weapon)),
        ArmSide::Left => additive.compose(&hand_relative.compose(&transforms.weapon)),
    };

    let joint_additive = Transform3D::IDENTITY.blend(additive, additive_joint_influence);
    let joint_relative = init_joint.relative_to(&initial.weapon);
    let joint_target = joint_additive
        .compose(&joint_relative)
        .compose(&Transform3D::from_translation(location_offset))
        .compose(&params.custom_weapon_offset_transform.inverse())
        .compose(&transforms.joint_influence);

    let joint_location = if clamp.is_clamping() && params.arms_joint_alpha.abs() >= ALPHA_EPSILON {
        // The same chain against the pure camera-follow weapon, excluding
        // every additive and custom offset.
        let no_additive = joint_additive
            .compose(&joint_relative)
            .compose(&Transform3D::from_translation(location_offset))
            .compose(&transforms.camera_to_weapon)
            .compose(&transforms.camera);

        let mut offset = joint_target.relative_to(&no_additive);
        let orientation = init_joint.rotation;
        let mut local = orientation.inverse() * offset.translation;
        if let Some((min, max)) = clamp.horizontal {
            local.y = local.y.clamp(min, max);
        }
        if let Some((min, max)) = clamp.vertical {
            local.z = local.z.clamp(min, max);
        }
        offset.translation = orientation * local;

        offset.compose(&no_additive).translation * params.arms_joint_alpha
            + joint_target.translation * (1.0 - params.arms_joint_alpha)
    } else {
        joint_target.translation
    };

    ArmTargets {
        effector,
        joint_location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ArmPullback, JointClamp};
    use crate::test_skeleton::humanoid;
    use crate::topology::RigJoints;
    use glam::Quat;

    struct Fixture {
        skeleton: Skeleton,
        pose: Pose,
        bones: ResolvedBones,
    }

    fn fixture() -> Fixture {
        let (skeleton, pose) = humanoid();
        let bones = RigJoints::default().resolve(&skeleton).unwrap();
        Fixture {
            skeleton,
            pose,
            bones,
        }
    }

    fn compose(f: &Fixture, params: &RigParameters) -> (InitialTransforms, WeaponTransforms) {
        let initial = InitialTransforms::capture(&f.skeleton, &f.pose, &f.bones, params);
        let transforms = compose_weapon_transforms(
            &f.skeleton,
            &f.pose,
            &f.bones,
            params,
            &initial,
            Quat::IDENTITY,
        );
        (initial, transforms)
    }

    #[test]
    fn test_idle_weapon_matches_initial() {
        let f = fixture();
        let params = RigParameters::default();
        let (initial, transforms) = compose(&f, &params);

        assert!((transforms.weapon.translation - initial.weapon.translation).length() < 1e-4);
        assert!(transforms.weapon.rotation.dot(initial.weapon.rotation).abs() > 0.9999);
    }

    #[test]
    fn test_aiming_blend_endpoints_and_monotonicity() {
        let f = fixture();
        let mut params = RigParameters::default();
        params.sights_relative_transform =
            Transform3D::from_translation(Vec3::new(0.0, 0.0, -0.1));

        params.aiming_value = 0.0;
        let (_, at_zero) = compose(&f, &params);
        params.aiming_value = 0.5;
        let (_, at_half) = compose(&f, &params);
        params.aiming_value = 1.0;
        let (_, at_one) = compose(&f, &params);

        // Endpoints are the pure transforms
        assert!((at_zero.weapon.translation - at_zero.non_aiming.translation).length() < 1e-4);
        let midpoint = (at_zero.weapon.translation + at_one.weapon.translation) * 0.5;
        assert!((at_half.weapon.translation - midpoint).length() < 1e-4);
    }

    #[test]
    fn test_full_aim_sits_on_sights() {
        let f = fixture();
        let mut params = RigParameters::default();
        params.aiming_value = 1.0;
        params.sights_relative_transform =
            Transform3D::from_translation(Vec3::new(0.04, 0.0, -0.12));
        params.offset_transform = Transform3D::from_translation(Vec3::new(0.01, 0.0, 0.0));
        // Sway tuning must not affect the fully aimed transform
        params.custom_weapon_offset_transform =
            Transform3D::from_translation(Vec3::new(0.0, 0.3, 0.2));
        params.weapon_rotation_alpha = 0.3;
        params.weapon_location_alpha = 0.7;

        let (_, transforms) = compose(&f, &params);
        let expected = params.offset_transform.compose(
            &params
                .origin_relative_transform
                .relative_to(&params.sights_relative_transform)
                .compose(&transforms.camera),
        );

        assert!((transforms.weapon.translation - expected.translation).length() < 1e-4);
        assert!(transforms.weapon.rotation.dot(expected.rotation).abs() > 0.9999);
    }

    #[test]
    fn test_weapon_location_alpha_pins_to_initial() {
        let f = fixture();
        let mut params = RigParameters::default();
        params.camera_relative_rotation = EulerAngles::from_yaw(0.5);
        params.weapon_location_alpha = 0.0;

        let (initial, transforms) = compose(&f, &params);
        assert!((transforms.weapon.translation - initial.weapon.translation).length() < 1e-4);
    }

    #[test]
    fn test_pullback_shifts_toward_camera_by_excess() {
        let f = fixture();
        let mut params = RigParameters::default();
        let (_, unpulled) = compose(&f, &params);

        // Off arm reach at idle is exactly its full length (0.54); halving
        // the allowed extension leaves 0.27 of excess.
        params.arm_pullback = ArmPullback::Enabled;
        params.max_extension = 0.5;
        let (_, pulled) = compose(&f, &params);

        let shift = pulled.weapon.translation - unpulled.weapon.translation;
        assert!((shift.length() - 0.27).abs() < 1e-3);

        // Shift points from the weapon toward the camera
        let toward_camera =
            (pulled.camera.translation - unpulled.weapon.translation).normalize();
        assert!(shift.normalize().dot(toward_camera) > 0.999);
    }

    #[test]
    fn test_pullback_mirrors_onto_non_aiming_when_aiming() {
        let f = fixture();
        let mut params = RigParameters::default();
        params.arm_pullback = ArmPullback::Enabled;
        params.max_extension = 0.5;
        params.aiming_value = 0.5;

        let (_, pulled) = compose(&f, &params);

        let mut hip = params.clone();
        hip.arm_pullback = ArmPullback::Disabled;
        let (_, unpulled) = compose(&f, &hip);

        let weapon_shift = pulled.weapon.translation - unpulled.weapon.translation;
        let non_aiming_shift = pulled.non_aiming.translation - unpulled.non_aiming.translation;
        assert!((weapon_shift - non_aiming_shift).length() < 1e-4);
        assert!(weapon_shift.length() > 1e-3);
    }

    #[test]
    fn test_pullback_threshold_gates_on_aiming_value() {
        let f = fixture();
        let mut params = RigParameters::default();
        params.arm_pullback = ArmPullback::WhenAimingBelow(0.5);
        params.max_extension = 0.5;
        params.aiming_value = 0.8;

        let (_, gated) = compose(&f, &params);
        params.arm_pullback = ArmPullback::Disabled;
        let (_, disabled) = compose(&f, &params);

        // Above the threshold, pullback never runs
        assert!((gated.weapon.translation - disabled.weapon.translation).length() < 1e-5);
    }

    #[test]
    fn test_effector_rides_weapon() {
        let f = fixture();
        let mut params = RigParameters::default();
        let (initial, transforms) = compose(&f, &params);

        // Idle: the effector is the hand's initial transform
        let right = arm_targets(ArmSide::Right, &initial, &transforms, &params);
        assert!((right.effector.translation - initial.right_hand.translation).length() < 1e-4);

        // Move the camera: the effector keeps its offset in the weapon frame
        params.camera_relative_rotation = EulerAngles::new(0.3, -0.4, 0.0);
        let (initial, transforms) = compose(&f, &params);
        let right = arm_targets(ArmSide::Right, &initial, &transforms, &params);
        let expected = initial
            .right_hand
            .relative_to(&initial.weapon)
            .compose(&transforms.weapon);
        assert!((right.effector.translation - expected.translation).length() < 1e-4);
    }

    #[test]
    fn test_hand_additive_offsets_effector() {
        let f = fixture();
        let mut params = RigParameters::default();
        params.left_hand_additive_transform =
            Transform3D::from_translation(Vec3::new(0.0, 0.0, 0.05));

        let (initial, transforms) = compose(&f, &params);
        let left = arm_targets(ArmSide::Left, &initial, &transforms, &params);
        let expected = initial.left_hand.translation + Vec3::new(0.0, 0.0, 0.05);
        assert!((left.effector.translation - expected).length() < 1e-4);
    }

    #[test]
    fn test_joint_clamp_bounds() {
        let f = fixture();
        let mut params = RigParameters::default();
        params.aiming_value = 1.0;
        params.sights_relative_transform =
            Transform3D::from_translation(Vec3::new(0.0, 0.0, -0.1));
        params.right_joint_clamp = JointClamp {
            horizontal: Some((-0.1, 0.1)),
            vertical: Some((-0.05, 0.05)),
        };

        let (initial, transforms) = compose(&f, &params);

        // Fully aimed, the unclamped elbow target swings far toward the
        // camera centerline; the no-additive frame stays on the idle weapon.
        let no_additive_location = initial.right_joint.translation;

        params.arms_joint_alpha = 1.0;
        let clamped = arm_targets(ArmSide::Right, &initial, &transforms, &params);
        let offset = clamped.joint_location - no_additive_location;
        assert!(offset.y >= -0.1 - 1e-4 && offset.y <= 0.1 + 1e-4);
        assert!(offset.z >= -0.05 - 1e-4 && offset.z <= 0.05 + 1e-4);

        // Alpha zero bypasses clamping entirely
        params.arms_joint_alpha = 0.0;
        let unclamped = arm_targets(ArmSide::Right, &initial, &transforms, &params);
        let target = initial
            .right_joint
            .relative_to(&initial.weapon)
            .compose(&transforms.joint_influence);
        assert!((unclamped.joint_location - target.translation).length() < 1e-4);
    }
}
