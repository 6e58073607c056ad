use crate::bodies::RigidBody;
use crate::collision::Solver;
use crate::core::{
    BodyHandle, BodyStorage, GravityType, SimulationConfig, Storage, Target, TargetHandle, TargetStorage,
};
use crate::error::PhysicsError;
use crate::math::Vector3;
use crate::Result;

/// Owns the targets, the bodies driving them and the contact solver, and
/// advances them in fixed steps
#[derive(Debug)]
pub struct PhysicsWorld {
    /// Transform nodes moved by the bodies
    targets: TargetStorage<Target>,

    /// All rigid bodies in the world
    bodies: BodyStorage<RigidBody>,

    /// Bodies simulated each step, in simulation order
    active: Vec<BodyHandle>,

    solver: Solver,

    /// Configuration for the simulation
    config: SimulationConfig,

    /// The total elapsed simulation time
    time: f32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Creates a new physics world with default settings
    pub fn new() -> Self {
        Self {
            targets: TargetStorage::new(),
            bodies: BodyStorage::new(),
            active: Vec::new(),
            solver: Solver::default(),
            config: SimulationConfig::default(),
            time: 0.0,
        }
    }

    /// Creates a new physics world with the given configuration
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            targets: TargetStorage::new(),
            bodies: BodyStorage::new(),
            active: Vec::new(),
            solver: Solver::new(config.solver.clone())?,
            config,
            time: 0.0,
        })
    }

    /// Returns the current simulation time
    pub fn get_time(&self) -> f32 {
        self.time
    }

    /// Sets the gravity for the simulation
    pub fn set_gravity(&mut self, gravity: GravityType) {
        self.config.gravity = gravity;
    }

    /// Gets the current gravity
    pub fn get_gravity(&self) -> GravityType {
        self.config.gravity
    }

    /// Returns a reference to the simulation configuration
    pub fn get_config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    #[inline]
    pub fn solver_mut(&mut self) -> &mut Solver {
        &mut self.solver
    }

    /// Adds a transform node and returns its handle
    pub fn add_target(&mut self, target: Target) -> TargetHandle {
        self.targets.add(target)
    }

    /// Removes a transform node no body refers to any more
    pub fn remove_target(&mut self, handle: TargetHandle) -> Result<Target> {
        if self.bodies.iter().any(|(_, body)| body.target() == handle) {
            return Err(PhysicsError::InvalidParameter(format!(
                "Target {:?} is still driven by a body",
                handle
            )));
        }
        self.targets
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("No target for handle {:?}", handle)))
    }

    pub fn get_target(&self, handle: TargetHandle) -> Result<&Target> {
        self.targets.try_get(handle)
    }

    pub fn get_target_mut(&mut self, handle: TargetHandle) -> Result<&mut Target> {
        self.targets.try_get_mut(handle)
    }

    /// Target driven by a body
    pub fn get_body_target(&self, handle: BodyHandle) -> Result<&Target> {
        let body = self.bodies.try_get(handle)?;
        self.targets.try_get(body.target())
    }

    /// Adds a rigid body, registers it as active and returns its handle.
    ///
    /// The body takes the world's sleep settings. Its target must exist.
    pub fn add_body(&mut self, mut body: RigidBody) -> Result<BodyHandle> {
        self.targets.try_get(body.target())?;

        body.set_sleep_epsilon(self.config.sleep_epsilon);
        if !self.config.allow_sleeping {
            body.set_can_sleep(false);
        }

        let handle = self.bodies.add(body);
        self.active.push(handle);
        Ok(handle)
    }

    /// Adds a dynamic sphere sized by the target's bounding radius
    pub fn add_sphere(&mut self, target: TargetHandle, mass: f32) -> Result<BodyHandle> {
        let mut body = RigidBody::new_sphere(target, self.targets.try_get(target)?, mass)?;
        body.set_damping(self.config.default_damping);
        self.add_body(body)
    }

    /// Adds a dynamic box sized by the target's half extents
    pub fn add_box(&mut self, target: TargetHandle, mass: f32) -> Result<BodyHandle> {
        let mut body = RigidBody::new_box(target, self.targets.try_get(target)?, mass)?;
        body.set_damping(self.config.default_damping);
        self.add_body(body)
    }

    /// Adds a static landscape body for a target carrying a mesh
    pub fn add_landscape(&mut self, target: TargetHandle) -> Result<BodyHandle> {
        let body = RigidBody::new_landscape(target, self.targets.try_get(target)?)?;
        self.add_body(body)
    }

    /// Removes a rigid body from the world. Its handle is stale afterwards.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<RigidBody> {
        let body = self
            .bodies
            .remove(handle)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("No body for handle {:?}", handle)))?;
        self.active.retain(|&active| active != handle);
        Ok(body)
    }

    /// Gets a reference to a rigid body by its handle
    pub fn get_body(&self, handle: BodyHandle) -> Result<&RigidBody> {
        self.bodies.try_get(handle)
    }

    /// Gets a mutable reference to a rigid body by its handle
    pub fn get_body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody> {
        self.bodies.try_get_mut(handle)
    }

    /// Adds a body to the end of the active list
    pub fn activate(&mut self, handle: BodyHandle) -> Result<()> {
        self.bodies.try_get(handle)?;
        if !self.active.contains(&handle) {
            self.active.push(handle);
        }
        Ok(())
    }

    /// Takes a body out of the active list without removing it
    pub fn deactivate(&mut self, handle: BodyHandle) -> Result<()> {
        self.bodies.try_get(handle)?;
        self.active.retain(|&active| active != handle);
        Ok(())
    }

    pub fn is_active(&self, handle: BodyHandle) -> bool {
        self.active.contains(&handle)
    }

    /// Bodies simulated each step, in order
    pub fn active_bodies(&self) -> &[BodyHandle] {
        &self.active
    }

    /// Pushes a body at a world point; see `RigidBody::apply_impulse_at`
    pub fn apply_impulse_at(&mut self, handle: BodyHandle, force: Vector3, point: Vector3) -> Result<()> {
        let body = self.bodies.try_get_mut(handle)?;
        let target = self.targets.try_get(body.target())?;
        body.apply_impulse_at(force, point, target);
        Ok(())
    }

    /// Runs one simulation step of `quantum` seconds: integrates every active
    /// body, then detects and resolves contacts. Returns the contact count.
    pub fn step(&mut self, quantum: f32) -> Result<usize> {
        if !(quantum > 0.0) || !quantum.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Time quantum must be positive and finite, got {}",
                quantum
            )));
        }

        tracing::trace!(quantum, bodies = self.active.len(), "physics step");

        for &handle in &self.active {
            let Some(body) = self.bodies.get_mut(handle) else { continue };
            body.begin_frame();

            if let GravityType::Constant(gravity) = self.config.gravity {
                body.apply_force(gravity);
            }

            if let Some(target) = self.targets.get_mut(body.target()) {
                body.integrate(target, quantum);
            }
        }

        let contacts = self.solver.step(&self.active, &mut self.bodies, &mut self.targets, quantum);
        self.time += quantum;
        tracing::trace!(contacts, time = self.time, "physics step done");

        Ok(contacts)
    }

    /// Advances by `elapsed` seconds in steps of at most the configured time
    /// step, up to `max_substeps` of them. Returns the number of steps taken.
    pub fn advance(&mut self, elapsed: f32) -> Result<u32> {
        if elapsed < 0.0 || !elapsed.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Elapsed time must be non-negative and finite, got {}",
                elapsed
            )));
        }

        let fixed_step = self.config.time_step;
        let mut remaining = elapsed;
        let mut steps = 0;

        while remaining > 0.0 && steps < self.config.max_substeps {
            let dt = fixed_step.min(remaining);
            self.step(dt)?;

            remaining -= dt;
            steps += 1;
        }

        Ok(steps)
    }

    /// Iterates over all bodies in slot order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> + '_ {
        self.bodies.iter()
    }

    /// Iterates over all targets in slot order
    pub fn targets(&self) -> impl Iterator<Item = (TargetHandle, &Target)> + '_ {
        self.targets.iter()
    }

    /// Returns the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Clears the world of all bodies and targets
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.targets.clear();
        self.active.clear();
        self.time = 0.0;
    }
}
