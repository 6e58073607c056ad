pub mod world;
pub mod config;
pub mod storage;
pub mod target;

pub use self::world::PhysicsWorld;
pub use self::config::{SimulationConfig, SolverConfig, ResolutionStrategy};
pub use self::storage::{BodyStorage, TargetStorage, SlotStorage, SlotHandle, Storage};
pub use self::target::Target;

use crate::math::Vector3;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A stable identifier for a rigid body in body storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// A stable identifier for a target transform node in target storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Geometry of a single contact between two shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// The position of the contact point in world space
    pub position: Vector3,

    /// Unit normal pointing from the second shape towards the first
    pub normal: Vector3,

    /// The penetration depth of the contact
    pub penetration: f32,
}

/// The gravity to apply to the physics world
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum GravityType {
    /// No gravity
    None,

    /// Constant acceleration applied to every dynamic body
    Constant(Vector3),
}

impl Default for GravityType {
    fn default() -> Self {
        Self::Constant(Vector3::new(0.0, -9.81, 0.0))
    }
}
