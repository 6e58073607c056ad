#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Surface response properties of a body
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Material {
    /// Coefficient of restitution (bounciness), 0-1
    pub restitution: f32,

    /// Coefficient of friction
    pub friction: f32,
}

impl Material {
    /// Creates a new material with the specified properties
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.max(0.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Combined properties of two touching bodies: both coefficients are
    /// averaged
    pub fn combine(&self, other: &Material) -> Material {
        Material {
            friction: 0.5 * (self.friction + other.friction),
            restitution: 0.5 * (self.restitution + other.restitution),
        }
    }

    /// Creates a material for ice (low friction, medium restitution)
    pub fn ice() -> Self {
        Self::new(0.05, 0.4)
    }

    /// Creates a material for rubber (high friction, high restitution)
    pub fn rubber() -> Self {
        Self::new(0.8, 0.7)
    }

    /// Creates a material for wood (medium friction, low restitution)
    pub fn wood() -> Self {
        Self::new(0.6, 0.2)
    }

    /// Creates a material for metal (medium friction, medium restitution)
    pub fn metal() -> Self {
        Self::new(0.4, 0.5)
    }

    /// Creates a material for concrete (high friction, low restitution)
    pub fn concrete() -> Self {
        Self::new(0.9, 0.1)
    }

    /// A perfectly inelastic surface
    pub fn inelastic(friction: f32) -> Self {
        Self::new(friction, 0.0)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.3,
        }
    }
}
