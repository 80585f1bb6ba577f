//! Skeleton hierarchy and pose types.
//!
//! The skeleton owns bone names and parent links only; per-frame bone-space
//! transforms live in a [`Pose`] supplied by the host each evaluation.

use glam::Vec3;
use sightline_transform::Transform3D;

/// A bone identifier (index into the skeleton bone array).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoneId(pub u32);

impl BoneId {
    /// Creates a new bone ID.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A bone in a skeleton.
#[derive(Debug, Clone)]
pub struct Bone {
    /// Human-readable name, matched against rig joint bindings.
    pub name: String,
    /// Parent bone (None for root).
    pub parent: Option<BoneId>,
}

impl Bone {
    /// Creates a new root bone.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Sets the parent bone.
    pub fn with_parent(mut self, parent: BoneId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// A skeleton (hierarchy of bones).
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    /// Creates an empty skeleton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bone and returns its ID.
    pub fn add_bone(&mut self, bone: Bone) -> BoneId {
        let id = BoneId(self.bones.len() as u32);
        self.bones.push(bone);
        id
    }

    /// Returns the number of bones.
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Returns a bone by ID.
    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id.index())
    }

    /// Returns a bone's parent, if it has one.
    pub fn parent_of(&self, id: BoneId) -> Option<BoneId> {
        self.bones.get(id.index()).and_then(|b| b.parent)
    }

    /// Finds a bone by name.
    pub fn find_bone(&self, name: &str) -> Option<BoneId> {
        self.bones
            .iter()
            .position(|b| b.name == name)
            .map(|i| BoneId(i as u32))
    }

    /// Walks from `id` up the parent chain to the root bone.
    pub fn root_of(&self, id: BoneId) -> BoneId {
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            current = parent;
        }
        current
    }
}

/// A full-skeleton array of bone-space transforms.
///
/// The rig mutates a pose in place during evaluation; a second pose (the
/// reference/idle pose) is read-only. Both must share the skeleton's
/// topology — this is a host precondition and is not re-validated per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    transforms: Vec<Transform3D>,
}

impl Pose {
    /// Creates a pose with all-identity bone transforms.
    pub fn identity(bone_count: usize) -> Self {
        Self {
            transforms: vec![Transform3D::IDENTITY; bone_count],
        }
    }

    /// Creates a pose from bone-space transforms.
    pub fn from_transforms(transforms: Vec<Transform3D>) -> Self {
        Self { transforms }
    }

    /// Gets the bone-space transform for a bone.
    pub fn get(&self, id: BoneId) -> Transform3D {
        self.transforms
            .get(id.index())
            .copied()
            .unwrap_or(Transform3D::IDENTITY)
    }

    /// Sets the bone-space transform for a bone.
    pub fn set(&mut self, id: BoneId, transform: Transform3D) {
        if let Some(t) = self.transforms.get_mut(id.index()) {
            *t = transform;
        }
    }

    /// Returns the number of bone transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Returns true if the pose is empty.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Returns all bone-space transforms.
    pub fn transforms(&self) -> &[Transform3D] {
        &self.transforms
    }

    /// Returns the length of a bone's bone-space translation.
    ///
    /// This is the rigid segment length between the bone and its parent,
    /// used for IK reach computations.
    pub fn segment_length(&self, id: BoneId) -> f32 {
        self.get(id).translation.length()
    }

    /// Computes a bone's component-space transform by composing bone-space
    /// transforms up the parent chain.
    ///
    /// Recomputed on every call: bone-space transforms change mid-evaluation,
    /// so cached component-space values would silently go stale.
    pub fn component_transform(&self, skeleton: &Skeleton, id: BoneId) -> Transform3D {
        let mut transform = self.get(id);
        let mut current = skeleton.parent_of(id);
        while let Some(bone_id) = current {
            transform = transform.compose(&self.get(bone_id));
            current = skeleton.parent_of(bone_id);
        }
        transform
    }

    /// Blends a bone's transform toward `target` by `alpha`, in place.
    pub fn blend_bone(&mut self, id: BoneId, target: Transform3D, alpha: f32) {
        let current = self.get(id);
        self.set(id, current.blend(&target, alpha));
    }

    /// Returns the component-space location of a bone.
    pub fn component_location(&self, skeleton: &Skeleton, id: BoneId) -> Vec3 {
        self.component_transform(skeleton, id).translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    fn three_bone_chain() -> (Skeleton, BoneId, BoneId, BoneId) {
        let mut skel = Skeleton::new();
        let root = skel.add_bone(Bone::new("root"));
        let mid = skel.add_bone(Bone::new("mid").with_parent(root));
        let tip = skel.add_bone(Bone::new("tip").with_parent(mid));
        (skel, root, mid, tip)
    }

    #[test]
    fn test_find_bone() {
        let (skel, _, mid, _) = three_bone_chain();
        assert_eq!(skel.find_bone("mid"), Some(mid));
        assert_eq!(skel.find_bone("nonexistent"), None);
    }

    #[test]
    fn test_root_of() {
        let (skel, root, _, tip) = three_bone_chain();
        assert_eq!(skel.root_of(tip), root);
        assert_eq!(skel.root_of(root), root);
    }

    #[test]
    fn test_component_transform_accumulates() {
        let (skel, _, mid, tip) = three_bone_chain();
        let mut pose = Pose::identity(skel.bone_count());
        pose.set(mid, Transform3D::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        pose.set(tip, Transform3D::from_translation(Vec3::new(0.0, 1.0, 0.0)));

        let cs = pose.component_transform(&skel, tip);
        assert!((cs.translation - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_component_transform_rotates_children() {
        let (skel, root, mid, tip) = three_bone_chain();
        let mut pose = Pose::identity(skel.bone_count());
        pose.set(root, Transform3D::from_rotation(Quat::from_rotation_z(FRAC_PI_2)));
        pose.set(mid, Transform3D::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        pose.set(tip, Transform3D::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        // Root's 90° Z rotation turns the chain's X offsets into Y
        let cs = pose.component_transform(&skel, tip);
        assert!((cs.translation.x).abs() < 1e-5);
        assert!((cs.translation.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_blend_bone() {
        let (skel, root, _, _) = three_bone_chain();
        let mut pose = Pose::identity(skel.bone_count());
        let target = Transform3D::from_translation(Vec3::new(4.0, 0.0, 0.0));

        pose.blend_bone(root, target, 0.5);
        assert_eq!(pose.get(root).translation, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_segment_length() {
        let (skel, _, mid, _) = three_bone_chain();
        let mut pose = Pose::identity(skel.bone_count());
        pose.set(mid, Transform3D::from_translation(Vec3::new(3.0, 4.0, 0.0)));
        assert!((pose.segment_length(mid) - 5.0).abs() < 1e-6);
    }
}
