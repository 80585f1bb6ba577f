//! Per-frame rig parameters and tuning types.
//!
//! Everything here is supplied by the host each frame (or loaded from
//! data-driven weapon assets) and copied into the rig during the update
//! phase. Out-of-range values are accepted — alphas above one extrapolate,
//! negative weights invert — so designers can iterate live without the rig
//! rejecting inputs. Only the joint clamp ranges actually clamp.

use glam::{EulerRot, Quat, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sightline_transform::Transform3D;
use std::f32::consts::PI;
use std::ops::{Add, Mul};

/// Which hand anchors the weapon's origin-relative transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Handedness {
    /// Weapon origin rides the right hand.
    #[default]
    Right,
    /// Weapon origin rides the left hand.
    Left,
}

/// When the arm-pullback correction runs.
///
/// Pullback shortens the apparent reach of the non-dominant arm by
/// translating the weapon toward the camera when the aim-driven weapon
/// position would over-extend it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArmPullback {
    /// Never pull the weapon back.
    #[default]
    Disabled,
    /// Always check reach and pull back on over-extension.
    Enabled,
    /// Only check while the aiming value is below this threshold.
    WhenAimingBelow(f32),
}

impl ArmPullback {
    /// Returns true if pullback should run at the given aiming value.
    pub fn is_active(&self, aiming_value: f32) -> bool {
        match *self {
            ArmPullback::Disabled => false,
            ArmPullback::Enabled => true,
            ArmPullback::WhenAimingBelow(threshold) => threshold > aiming_value,
        }
    }
}

/// Elbow location clamp ranges, expressed in the joint's local frame.
///
/// `horizontal` clamps the local Y offset, `vertical` the local Z offset.
/// A `None` axis is unclamped; both `None` disables clamping entirely.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointClamp {
    /// (min, max) range for the joint's local Y offset.
    pub horizontal: Option<(f32, f32)>,
    /// (min, max) range for the joint's local Z offset.
    pub vertical: Option<(f32, f32)>,
}

impl JointClamp {
    /// Returns true if either axis has a configured range.
    pub fn is_clamping(&self) -> bool {
        self.horizontal.is_some() || self.vertical.is_some()
    }
}

/// Euler rotation in radians: pitch about +Y, yaw about +Z, roll about +X.
///
/// Composition order is yaw, then pitch, then roll
/// (`Quat = Rz(yaw) * Ry(pitch) * Rx(roll)`). Used for the camera-relative
/// rotation, where the spine solver needs per-axis access.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EulerAngles {
    /// Rotation about the right axis (+Y), radians.
    pub pitch: f32,
    /// Rotation about the up axis (+Z), radians.
    pub yaw: f32,
    /// Rotation about the forward axis (+X), radians.
    pub roll: f32,
}

impl EulerAngles {
    /// Zero rotation.
    pub const ZERO: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    /// Creates Euler angles from pitch, yaw, and roll in radians.
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Creates a yaw-only rotation.
    pub fn from_yaw(yaw: f32) -> Self {
        Self {
            yaw,
            ..Self::ZERO
        }
    }

    /// Converts to a quaternion (yaw, then pitch, then roll).
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::ZYX, self.yaw, self.pitch, self.roll)
    }

    /// Extracts Euler angles from a quaternion.
    pub fn from_quat(quat: Quat) -> Self {
        let (yaw, pitch, roll) = quat.to_euler(EulerRot::ZYX);
        Self { pitch, yaw, roll }
    }

    /// Returns the rotation's inverse as Euler angles.
    pub fn inverse(self) -> Self {
        Self::from_quat(self.to_quat().inverse())
    }

    /// Wraps each component into (-π, π].
    pub fn normalized(self) -> Self {
        Self {
            pitch: wrap_angle(self.pitch),
            yaw: wrap_angle(self.yaw),
            roll: wrap_angle(self.roll),
        }
    }
}

impl Add for EulerAngles {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            pitch: self.pitch + rhs.pitch,
            yaw: self.yaw + rhs.yaw,
            roll: self.roll + rhs.roll,
        }
    }
}

impl Mul<f32> for EulerAngles {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self {
            pitch: self.pitch * rhs,
            yaw: self.yaw * rhs,
            roll: self.roll * rhs,
        }
    }
}

/// Wraps an angle into (-π, π].
pub(crate) fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

/// The full per-frame parameter set the host feeds the rig.
///
/// Transforms are weapon-asset data: `origin_relative_transform` places the
/// weapon's origin relative to the dominant hand, `sights_relative_transform`
/// places the sights relative to the weapon origin, and the offset/additive
/// transforms are designer corrections layered on top.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigParameters {
    /// Master blend weight over the whole rig. Zero disables evaluation.
    pub alpha: f32,
    /// Blend weight for the arm IK commit (scaled by `alpha`).
    pub arms_alpha: f32,
    /// Blend weight for the spine aim offset.
    pub spine_alpha: f32,
    /// Blend between unclamped (0) and clamped (1) elbow locations.
    pub arms_joint_alpha: f32,
    /// 0 = hip fire, 1 = fully aimed down sights.
    pub aiming_value: f32,
    /// How much elbow targets follow the aimed weapon rather than the
    /// non-aiming (sway) transform. 1 = full aim follow.
    pub aiming_joint_influence: f32,
    /// Which hand anchors the weapon.
    pub handedness: Handedness,
    /// Camera rotation relative to the character, radians.
    pub camera_relative_rotation: EulerAngles,
    /// Camera location relative to the head bone.
    pub camera_relative_location: Vec3,
    /// Weapon origin relative to the dominant hand.
    pub origin_relative_transform: Transform3D,
    /// Sights relative to the weapon origin.
    pub sights_relative_transform: Transform3D,
    /// Final static offset composed onto the blended weapon transform.
    pub offset_transform: Transform3D,
    /// Per-weapon offset applied to the non-aiming (sway) transform.
    pub custom_weapon_offset_transform: Transform3D,
    /// How much the non-aiming rotation follows the camera (vs the animated
    /// initial weapon rotation).
    pub weapon_rotation_alpha: f32,
    /// How much the non-aiming location follows the camera.
    pub weapon_location_alpha: f32,
    /// Additive correction on the right hand's IK target.
    pub right_hand_additive_transform: Transform3D,
    /// Additive correction on the left hand's IK target.
    pub left_hand_additive_transform: Transform3D,
    /// How much of the right hand additive leaks into its elbow target.
    pub right_hand_additive_joint_influence: f32,
    /// How much of the left hand additive leaks into its elbow target.
    pub left_hand_additive_joint_influence: f32,
    /// Right elbow target offset in the weapon frame.
    pub right_joint_location_offset: Vec3,
    /// Left elbow target offset in the weapon frame.
    pub left_joint_location_offset: Vec3,
    /// Right elbow clamp ranges.
    pub right_joint_clamp: JointClamp,
    /// Left elbow clamp ranges.
    pub left_joint_clamp: JointClamp,
    /// Arm pullback activation.
    pub arm_pullback: ArmPullback,
    /// Fraction of the off arm's full reach the weapon may use before
    /// pullback triggers.
    pub max_extension: f32,
    /// Yaw offset between the character mesh and the camera convention,
    /// radians.
    pub mesh_yaw_offset: f32,
    /// Head rotation additive blended in by the aiming value.
    pub aiming_head_rotation_offset: Quat,
}

impl Default for RigParameters {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            arms_alpha: 1.0,
            spine_alpha: 1.0,
            arms_joint_alpha: 1.0,
            aiming_value: 0.0,
            aiming_joint_influence: 1.0,
            handedness: Handedness::Right,
            camera_relative_rotation: EulerAngles::ZERO,
            camera_relative_location: Vec3::ZERO,
            origin_relative_transform: Transform3D::IDENTITY,
            sights_relative_transform: Transform3D::IDENTITY,
            offset_transform: Transform3D::IDENTITY,
            custom_weapon_offset_transform: Transform3D::IDENTITY,
            weapon_rotation_alpha: 1.0,
            weapon_location_alpha: 1.0,
            right_hand_additive_transform: Transform3D::IDENTITY,
            left_hand_additive_transform: Transform3D::IDENTITY,
            right_hand_additive_joint_influence: 0.0,
            left_hand_additive_joint_influence: 0.0,
            right_joint_location_offset: Vec3::ZERO,
            left_joint_location_offset: Vec3::ZERO,
            right_joint_clamp: JointClamp::default(),
            left_joint_clamp: JointClamp::default(),
            arm_pullback: ArmPullback::Disabled,
            max_extension: 1.0,
            mesh_yaw_offset: 0.0,
            aiming_head_rotation_offset: Quat::IDENTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_euler_quat_roundtrip() {
        let angles = EulerAngles::new(0.4, -1.1, 0.25);
        let back = EulerAngles::from_quat(angles.to_quat());

        assert!((angles.pitch - back.pitch).abs() < 1e-5);
        assert!((angles.yaw - back.yaw).abs() < 1e-5);
        assert!((angles.roll - back.roll).abs() < 1e-5);
    }

    #[test]
    fn test_euler_inverse_cancels() {
        let angles = EulerAngles::new(0.3, 0.8, -0.2);
        let q = angles.to_quat() * angles.inverse().to_quat();
        assert!(q.w.abs() > 0.99999);
    }

    #[test]
    fn test_normalized_wraps() {
        let angles = EulerAngles::new(PI + 0.5, -PI - 0.5, 3.0 * PI).normalized();
        assert!((angles.pitch - (-PI + 0.5)).abs() < 1e-5);
        assert!((angles.yaw - (PI - 0.5)).abs() < 1e-5);
        assert!((angles.roll - PI).abs() < 1e-4);
    }

    #[test]
    fn test_yaw_rotates_forward_to_right() {
        // +90° yaw about +Z takes +X forward into +Y
        let q = EulerAngles::from_yaw(FRAC_PI_2).to_quat();
        let v = q * Vec3::X;
        assert!((v - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_pullback_activation() {
        assert!(!ArmPullback::Disabled.is_active(0.0));
        assert!(ArmPullback::Enabled.is_active(1.0));
        assert!(ArmPullback::WhenAimingBelow(0.5).is_active(0.2));
        assert!(!ArmPullback::WhenAimingBelow(0.5).is_active(0.8));
    }

    #[test]
    fn test_joint_clamp_detection() {
        assert!(!JointClamp::default().is_clamping());
        let clamp = JointClamp {
            horizontal: Some((-0.1, 0.1)),
            vertical: None,
        };
        assert!(clamp.is_clamping());
    }
}
