pub mod math;
pub mod core;
pub mod bodies;
pub mod shapes;
pub mod collision;

/// Re-export common types for easier usage
pub use crate::core::{PhysicsWorld, SimulationConfig, SolverConfig, ResolutionStrategy, Target};
pub use crate::bodies::{RigidBody, CollisionModel, Material};
pub use crate::collision::{Contact, Solver};
pub use crate::math::Vector3;

/// Error types for the physics engine
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
