use crate::core::Target;

/// Trait for broad-phase pruning of body pairs
pub trait BroadPhase {
    /// Returns false when the two targets certainly do not touch
    fn may_collide(&self, a: &Target, b: &Target) -> bool;
}

/// Bounding-sphere test with a fixed safety margin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphereBroadPhase {
    margin: f32,
}

impl BoundingSphereBroadPhase {
    pub fn new(margin: f32) -> Self {
        Self {
            margin: margin.max(0.0),
        }
    }

    #[inline]
    pub fn margin(&self) -> f32 {
        self.margin
    }
}

impl Default for BoundingSphereBroadPhase {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl BroadPhase for BoundingSphereBroadPhase {
    fn may_collide(&self, a: &Target, b: &Target) -> bool {
        a.bounding_sphere().overlaps(&b.bounding_sphere(), self.margin)
    }
}
