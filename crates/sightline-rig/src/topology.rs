//! Bone topology resolution.
//!
//! Logical joint names are resolved to skeleton indices once per skeleton
//! load (and again on every skeleton swap), never per frame. Resolution also
//! derives the arm chains: each hand's parent is its lower arm, the
//! grandparent its upper arm, and the upper arm must itself have a parent so
//! the solved arm can be committed relative to it.

use crate::error::TopologyError;
use crate::skeleton::{BoneId, Skeleton};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A spine chain entry: a bone name and the fraction of the total spine
/// rotation it absorbs.
///
/// Weights are arbitrary positive reals in kinematic order (lower spine
/// first); they are not required to sum to one.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpineBone {
    /// Bone name to resolve.
    pub name: String,
    /// Blend weight scaling this bone's share of the spine rotation.
    pub weight: f32,
}

impl SpineBone {
    /// Creates a spine chain entry.
    pub fn new(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Logical joint bindings for the rig, resolved against a skeleton at load.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigJoints {
    /// Right hand bone name.
    pub right_hand: String,
    /// Left hand bone name.
    pub left_hand: String,
    /// Head bone name (camera anchor).
    pub head: String,
    /// Stable bone name: the root-area anchor used to measure how far the
    /// animated pose has rotated away from the reference pose.
    pub stable: String,
    /// Spine chain in kinematic order, lower spine to head.
    pub spine: Vec<SpineBone>,
}

impl Default for RigJoints {
    fn default() -> Self {
        let weight = 1.0 / 5.0;
        Self {
            right_hand: "hand_r".into(),
            left_hand: "hand_l".into(),
            head: "head".into(),
            stable: "pelvis".into(),
            spine: vec![
                SpineBone::new("spine_01", weight),
                SpineBone::new("spine_02", weight),
                SpineBone::new("spine_03", weight),
                SpineBone::new("neck_01", weight),
                SpineBone::new("head", weight),
            ],
        }
    }
}

impl RigJoints {
    /// Resolves all joint names against a skeleton.
    ///
    /// Fails if any named bone is absent, if a hand is missing its lower-arm
    /// or upper-arm ancestors, if an upper arm has no parent, or if any spine
    /// entry fails to resolve. On failure the rig stays non-evaluable and
    /// evaluation passes the pose through unchanged.
    pub fn resolve(&self, skeleton: &Skeleton) -> Result<ResolvedBones, TopologyError> {
        let right_hand = find(skeleton, &self.right_hand)?;
        let left_hand = find(skeleton, &self.left_hand)?;
        let head = find(skeleton, &self.head)?;
        let stable = find(skeleton, &self.stable)?;

        let (right_lower_arm, right_upper_arm, right_upper_arm_parent) =
            arm_chain(skeleton, right_hand, &self.right_hand)?;
        let (left_lower_arm, left_upper_arm, left_upper_arm_parent) =
            arm_chain(skeleton, left_hand, &self.left_hand)?;

        let mut spine = Vec::with_capacity(self.spine.len());
        for entry in &self.spine {
            let id = skeleton
                .find_bone(&entry.name)
                .ok_or_else(|| TopologyError::MissingSpineBone(entry.name.clone()))?;
            spine.push((id, entry.weight));
        }

        Ok(ResolvedBones {
            right_hand,
            right_lower_arm,
            right_upper_arm,
            right_upper_arm_parent,
            left_hand,
            left_lower_arm,
            left_upper_arm,
            left_upper_arm_parent,
            head,
            stable,
            root: skeleton.root_of(stable),
            spine,
        })
    }
}

fn find(skeleton: &Skeleton, name: &str) -> Result<BoneId, TopologyError> {
    skeleton
        .find_bone(name)
        .ok_or_else(|| TopologyError::MissingBone(name.to_string()))
}

fn arm_chain(
    skeleton: &Skeleton,
    hand: BoneId,
    hand_name: &str,
) -> Result<(BoneId, BoneId, BoneId), TopologyError> {
    let lower = skeleton
        .parent_of(hand)
        .ok_or_else(|| TopologyError::MissingParent {
            bone: hand_name.to_string(),
            expected: "lower arm",
        })?;
    let upper = skeleton
        .parent_of(lower)
        .ok_or_else(|| TopologyError::MissingParent {
            bone: bone_name(skeleton, lower),
            expected: "upper arm",
        })?;
    let upper_parent = skeleton
        .parent_of(upper)
        .ok_or_else(|| TopologyError::MissingParent {
            bone: bone_name(skeleton, upper),
            expected: "upper arm parent",
        })?;
    Ok((lower, upper, upper_parent))
}

fn bone_name(skeleton: &Skeleton, id: BoneId) -> String {
    skeleton
        .bone(id)
        .map(|b| b.name.clone())
        .unwrap_or_default()
}

/// Joint indices resolved against the current skeleton.
///
/// Read-only after resolution; rebuilt whenever the skeleton changes.
#[derive(Debug, Clone)]
pub struct ResolvedBones {
    /// Right hand.
    pub right_hand: BoneId,
    /// Right hand's parent.
    pub right_lower_arm: BoneId,
    /// Right hand's grandparent.
    pub right_upper_arm: BoneId,
    /// Right upper arm's parent (commit frame for the solved upper arm).
    pub right_upper_arm_parent: BoneId,
    /// Left hand.
    pub left_hand: BoneId,
    /// Left hand's parent.
    pub left_lower_arm: BoneId,
    /// Left hand's grandparent.
    pub left_upper_arm: BoneId,
    /// Left upper arm's parent.
    pub left_upper_arm_parent: BoneId,
    /// Head bone.
    pub head: BoneId,
    /// Stable/root-area anchor bone.
    pub stable: BoneId,
    /// Root of the stable bone's ancestor chain.
    pub root: BoneId,
    /// Resolved spine chain with blend weights, kinematic order.
    pub spine: Vec<(BoneId, f32)>,
}
