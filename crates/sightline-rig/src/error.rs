//! Error types for rig topology resolution.

use thiserror::Error;

/// Errors detected while resolving logical joints against a skeleton.
///
/// Topology errors mark the rig non-evaluable: evaluation degrades to a
/// pass-through rather than failing the frame. Hosts query the stored error
/// via [`AimRig::topology_error`](crate::AimRig::topology_error) to surface
/// misconfigured rigs in tooling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A named bone is absent from the skeleton.
    #[error("bone not found in skeleton: {0}")]
    MissingBone(String),

    /// A bone that must have an ancestor (hand → lower arm → upper arm →
    /// upper-arm parent) has none.
    #[error("{bone} has no parent bone (expected {expected})")]
    MissingParent {
        /// Name of the bone whose parent lookup failed.
        bone: String,
        /// What the missing ancestor would have been.
        expected: &'static str,
    },

    /// A spine chain entry failed to resolve.
    #[error("spine chain bone not found in skeleton: {0}")]
    MissingSpineBone(String),
}
