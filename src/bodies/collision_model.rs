#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Collision primitive of a rigid body. The dimensions come from the bounds
/// of the body's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum CollisionModel {
    /// Static triangle mesh with infinite mass
    Landscape,

    /// Sphere sized by the target's bounding radius
    Sphere,

    /// Oriented box sized by the target's half extents
    Box,
}

impl CollisionModel {
    /// Whether bodies of this model never move
    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(self, CollisionModel::Landscape)
    }
}
