use crate::core::GravityType;
use crate::error::PhysicsError;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Contact resolution strategy used by the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ResolutionStrategy {
    /// Resolve every queued contact once, in queue order
    Coarse,

    /// Repeatedly resolve the worst contact and propagate the change to its
    /// neighbours
    #[default]
    Iterative,
}

/// Configuration parameters for contact detection and resolution
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SolverConfig {
    /// Which resolution strategy to run after detection
    pub strategy: ResolutionStrategy,

    /// Number of contact records pre-allocated in the queue
    pub contact_capacity: usize,

    /// Iterative passes run at most `contacts * iteration_factor` times
    pub iteration_factor: usize,

    /// Penetration below this is left alone by the iterative strategy
    pub position_epsilon: f32,

    /// Pending velocity change below this is left alone by the iterative strategy
    pub velocity_epsilon: f32,

    /// Slack added to the bounding-sphere test of the broad phase
    pub broad_phase_margin: f32,

    /// Closing speeds below this resolve with zero restitution
    pub restitution_speed_threshold: f32,

    /// Limit on the rotational share of a positional correction, as a
    /// fraction of the lever arm
    pub angular_move_limit: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: ResolutionStrategy::Iterative,
            contact_capacity: 256,
            iteration_factor: 4,
            position_epsilon: 0.01,
            velocity_epsilon: 0.01,
            broad_phase_margin: 0.1,
            restitution_speed_threshold: 0.25,
            angular_move_limit: 0.2,
        }
    }
}

impl SolverConfig {
    /// Checks the configuration for values the solver cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.contact_capacity == 0 {
            return Err(PhysicsError::InvalidParameter(
                "contact_capacity must be at least 1".to_string(),
            ));
        }
        if self.position_epsilon < 0.0 || self.velocity_epsilon < 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "solver epsilons must be non-negative (position {}, velocity {})",
                self.position_epsilon, self.velocity_epsilon
            )));
        }
        if self.broad_phase_margin < 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "broad_phase_margin must be non-negative, got {}",
                self.broad_phase_margin
            )));
        }
        Ok(())
    }
}

/// Configuration parameters for the simulation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// The fixed time step used by `PhysicsWorld::advance`
    pub time_step: f32,

    /// The maximum number of fixed steps per `advance` call
    pub max_substeps: u32,

    /// The gravity applied to every dynamic body each step
    pub gravity: GravityType,

    /// Bodies whose motion average drops below this fall asleep
    pub sleep_epsilon: f32,

    /// Whether bodies are allowed to fall asleep
    pub allow_sleeping: bool,

    /// Velocity retained per second by bodies created through the world
    pub default_damping: f32,

    /// Contact solver settings
    pub solver: SolverConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            max_substeps: 10,
            gravity: GravityType::default(),
            sleep_epsilon: 0.3,
            allow_sleeping: true,
            default_damping: 0.99,
            solver: SolverConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.time_step > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if self.sleep_epsilon < 0.0 {
            return Err(PhysicsError::InvalidParameter(format!(
                "sleep_epsilon must be non-negative, got {}",
                self.sleep_epsilon
            )));
        }
        if !(0.0..=1.0).contains(&self.default_damping) {
            return Err(PhysicsError::InvalidParameter(format!(
                "default_damping must lie in [0, 1], got {}",
                self.default_damping
            )));
        }
        self.solver.validate()
    }
}
