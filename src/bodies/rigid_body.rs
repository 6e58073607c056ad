use crate::bodies::{BodyFlags, CollisionModel, Material};
use crate::core::{Target, TargetHandle};
use crate::error::PhysicsError;
use crate::math::{Matrix3, Vector3};
use crate::shapes::{BoxShape, Sphere};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Default velocity retained per second
const DEFAULT_DAMPING: f32 = 0.99;

/// Default motion threshold below which a body falls asleep
const DEFAULT_SLEEP_EPSILON: f32 = 0.3;

/// Persisted mass properties of a body
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RigidBodySnapshot {
    pub inverse_mass: f32,

    /// Inverse inertia tensor in body-local space
    pub inverse_inertia_tensor: Matrix3,

    pub model: CollisionModel,

    pub damping: f32,
}

/// Dynamic state of a simulated object.
///
/// A body does not own its transform; it drives the `Target` referred to by
/// its handle, which the caller passes in whenever the body needs it.
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// The transform node moved by this body
    target: TargetHandle,

    /// Which collision primitive the body uses
    model: CollisionModel,

    /// Zero for landscape bodies
    inverse_mass: f32,

    /// Inverse inertia tensor in body-local space
    inverse_inertia_local: Matrix3,

    /// Inverse inertia tensor in world space, valid once `INERTIA_CACHED` is set
    inverse_inertia_world: Matrix3,

    linear_velocity: Vector3,
    angular_velocity: Vector3,

    /// Accumulated force, cleared when integrated
    linear_influence: Vector3,

    /// Accumulated torque, cleared when integrated
    torque_influence: Vector3,

    previous_linear_influence: Vector3,
    previous_torque_influence: Vector3,

    /// Fraction of velocity retained per second
    damping: f32,

    material: Material,
    use_friction: bool,

    /// Running average of kinetic energy
    motion: f32,
    sleep_epsilon: f32,

    flags: BodyFlags,
}

impl RigidBody {
    /// Creates a body of the given model and mass, sized by `target`.
    ///
    /// Landscape bodies ignore `mass` and get infinite mass. Dynamic bodies
    /// need a positive, finite mass.
    pub fn new(model: CollisionModel, handle: TargetHandle, target: &Target, mass: f32) -> Result<Self> {
        let (inverse_mass, inverse_inertia_local) = match model {
            CollisionModel::Landscape => (0.0, Matrix3::zero()),
            CollisionModel::Sphere => {
                let inverse_mass = Self::checked_inverse_mass(mass)?;
                let shape = Sphere::new(target.radius());
                (inverse_mass, shape.inverse_inertia_tensor(inverse_mass))
            }
            CollisionModel::Box => {
                let inverse_mass = Self::checked_inverse_mass(mass)?;
                let shape = BoxShape::new(target.half_extents());
                (inverse_mass, shape.inverse_inertia_tensor(inverse_mass))
            }
        };

        let mut flags = BodyFlags::CAN_SLEEP;
        if model.is_static() {
            flags.remove(BodyFlags::CAN_SLEEP);
        }

        let mut body = Self {
            target: handle,
            model,
            inverse_mass,
            inverse_inertia_local,
            inverse_inertia_world: Matrix3::zero(),
            linear_velocity: Vector3::zero(),
            angular_velocity: Vector3::zero(),
            linear_influence: Vector3::zero(),
            torque_influence: Vector3::zero(),
            previous_linear_influence: Vector3::zero(),
            previous_torque_influence: Vector3::zero(),
            damping: DEFAULT_DAMPING,
            material: Material::default(),
            use_friction: false,
            motion: 10.0 * DEFAULT_SLEEP_EPSILON,
            sleep_epsilon: DEFAULT_SLEEP_EPSILON,
            flags,
        };
        body.refresh_inertia(&target.orientation());

        Ok(body)
    }

    /// Creates a dynamic sphere body
    pub fn new_sphere(handle: TargetHandle, target: &Target, mass: f32) -> Result<Self> {
        Self::new(CollisionModel::Sphere, handle, target, mass)
    }

    /// Creates a dynamic box body
    pub fn new_box(handle: TargetHandle, target: &Target, mass: f32) -> Result<Self> {
        Self::new(CollisionModel::Box, handle, target, mass)
    }

    /// Creates a static landscape body. The target must carry a mesh.
    pub fn new_landscape(handle: TargetHandle, target: &Target) -> Result<Self> {
        if target.mesh().is_none() {
            return Err(PhysicsError::InvalidParameter(
                "Landscape body needs a target with a triangle mesh".to_string(),
            ));
        }
        Self::new(CollisionModel::Landscape, handle, target, 0.0)
    }

    /// Rebuilds a body from its persisted mass properties
    pub fn from_snapshot(snapshot: &RigidBodySnapshot, handle: TargetHandle, target: &Target) -> Self {
        let mut flags = BodyFlags::CAN_SLEEP;
        if snapshot.model.is_static() {
            flags.remove(BodyFlags::CAN_SLEEP);
        }

        let mut body = Self {
            target: handle,
            model: snapshot.model,
            inverse_mass: snapshot.inverse_mass,
            inverse_inertia_local: snapshot.inverse_inertia_tensor,
            inverse_inertia_world: Matrix3::zero(),
            linear_velocity: Vector3::zero(),
            angular_velocity: Vector3::zero(),
            linear_influence: Vector3::zero(),
            torque_influence: Vector3::zero(),
            previous_linear_influence: Vector3::zero(),
            previous_torque_influence: Vector3::zero(),
            damping: snapshot.damping,
            material: Material::default(),
            use_friction: false,
            motion: 10.0 * DEFAULT_SLEEP_EPSILON,
            sleep_epsilon: DEFAULT_SLEEP_EPSILON,
            flags,
        };
        body.refresh_inertia(&target.orientation());
        body
    }

    /// Captures the persisted mass properties of the body
    pub fn snapshot(&self) -> RigidBodySnapshot {
        RigidBodySnapshot {
            inverse_mass: self.inverse_mass,
            inverse_inertia_tensor: self.inverse_inertia_local,
            model: self.model,
            damping: self.damping,
        }
    }

    fn checked_inverse_mass(mass: f32) -> Result<f32> {
        if !(mass > 0.0) || !mass.is_finite() {
            return Err(PhysicsError::InvalidParameter(format!(
                "Dynamic body mass must be positive and finite, got {}",
                mass
            )));
        }
        Ok(1.0 / mass)
    }

    #[inline]
    pub fn target(&self) -> TargetHandle {
        self.target
    }

    #[inline]
    pub fn model(&self) -> CollisionModel {
        self.model
    }

    #[inline]
    pub fn flags(&self) -> BodyFlags {
        self.flags
    }

    /// Returns whether the body has finite mass and can move
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        !self.model.is_static()
    }

    /// Returns the body's mass, infinite for landscape bodies
    pub fn get_mass(&self) -> f32 {
        if self.inverse_mass > 0.0 {
            1.0 / self.inverse_mass
        } else {
            f32::INFINITY
        }
    }

    #[inline]
    pub fn get_inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Returns the inverse inertia tensor in world space
    #[inline]
    pub fn get_inverse_inertia_tensor(&self) -> &Matrix3 {
        &self.inverse_inertia_world
    }

    /// Returns the inverse inertia tensor in body-local space
    #[inline]
    pub fn get_local_inverse_inertia_tensor(&self) -> &Matrix3 {
        &self.inverse_inertia_local
    }

    #[inline]
    pub fn get_linear_velocity(&self) -> Vector3 {
        self.linear_velocity
    }

    /// Sets the linear velocity and wakes the body
    pub fn set_linear_velocity(&mut self, velocity: Vector3) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity = velocity;
        self.wake_up();
    }

    #[inline]
    pub fn get_angular_velocity(&self) -> Vector3 {
        self.angular_velocity
    }

    /// Sets the angular velocity and wakes the body
    pub fn set_angular_velocity(&mut self, velocity: Vector3) {
        if !self.is_dynamic() {
            return;
        }
        self.angular_velocity = velocity;
        self.wake_up();
    }

    #[inline]
    pub fn get_damping(&self) -> f32 {
        self.damping
    }

    /// Sets the fraction of velocity kept per second, clamped to [0, 1]
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn get_material(&self) -> &Material {
        &self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    #[inline]
    pub fn get_restitution(&self) -> f32 {
        self.material.restitution
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        self.material.restitution = restitution.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn uses_friction(&self) -> bool {
        self.use_friction
    }

    pub fn set_use_friction(&mut self, use_friction: bool) {
        self.use_friction = use_friction;
    }

    /// Returns the running average of kinetic energy
    #[inline]
    pub fn get_motion(&self) -> f32 {
        self.motion
    }

    #[inline]
    pub fn get_sleep_epsilon(&self) -> f32 {
        self.sleep_epsilon
    }

    pub fn set_sleep_epsilon(&mut self, epsilon: f32) {
        self.sleep_epsilon = epsilon.max(0.0);
    }

    /// Force accumulated for the next integration
    #[inline]
    pub fn get_linear_influence(&self) -> Vector3 {
        self.linear_influence
    }

    /// Torque accumulated for the next integration
    #[inline]
    pub fn get_torque_influence(&self) -> Vector3 {
        self.torque_influence
    }

    /// Acceleration produced by the influences integrated last frame
    #[inline]
    pub fn previous_acceleration(&self) -> Vector3 {
        self.previous_linear_influence * self.inverse_mass
    }

    #[inline]
    pub fn previous_torque(&self) -> Vector3 {
        self.previous_torque_influence
    }

    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.flags.contains(BodyFlags::SLEEPING)
    }

    /// A dynamic body that is not asleep
    #[inline]
    pub fn is_awake(&self) -> bool {
        self.is_dynamic() && !self.is_sleeping()
    }

    #[inline]
    pub fn can_sleep(&self) -> bool {
        self.flags.contains(BodyFlags::CAN_SLEEP)
    }

    /// Sets whether the body may fall asleep; disabling it wakes the body
    pub fn set_can_sleep(&mut self, can_sleep: bool) {
        if can_sleep && self.is_dynamic() {
            self.flags.insert(BodyFlags::CAN_SLEEP);
        } else {
            self.flags.remove(BodyFlags::CAN_SLEEP);
            self.wake_up();
        }
    }

    /// Wakes the body and keeps it awake for at least one more step
    pub fn wake_up(&mut self) {
        if self.is_sleeping() {
            self.flags.remove(BodyFlags::SLEEPING);
            self.motion = 10.0 * self.sleep_epsilon;
        }
    }

    /// Puts the body to sleep, zeroing its velocities and influences
    pub fn put_to_sleep(&mut self) {
        if !self.is_dynamic() || self.is_sleeping() {
            return;
        }
        self.zero_state();
        self.flags.insert(BodyFlags::SLEEPING);
        if self.motion >= self.sleep_epsilon {
            self.motion = 0.0;
        }
    }

    /// Starts a new frame: the next `integrate` call does its work again
    pub fn begin_frame(&mut self) {
        self.flags.remove(BodyFlags::INERTIA_CACHED | BodyFlags::INFLUENCES_CACHED);
    }

    /// Adds a mass-scaled force. Ignored while asleep.
    pub fn apply_force(&mut self, force: Vector3) {
        if !self.is_awake() {
            return;
        }
        self.linear_influence += force * self.get_mass();
    }

    pub fn apply_force_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.apply_force(Vector3::new(x, y, z));
    }

    /// Adds an acceleration such as wind without mass scaling. Ignored while
    /// asleep.
    pub fn apply_uniform_acceleration(&mut self, acceleration: Vector3) {
        if !self.is_awake() {
            return;
        }
        self.linear_influence += acceleration;
    }

    /// Adds a force at a world point, producing torque about the target's
    /// position. Wakes the body.
    pub fn apply_impulse_at(&mut self, force: Vector3, point: Vector3, target: &Target) {
        if !self.is_dynamic() {
            return;
        }
        self.wake_up();

        let arm = point - target.translation();
        self.linear_influence += force;
        self.torque_influence += arm.cross(&force);
    }

    /// Zeroes velocities and influences and forces the body awake for one
    /// more step
    pub fn clear_influences(&mut self) {
        self.zero_state();
        self.flags.remove(BodyFlags::SLEEPING);
        self.motion = 10.0 * self.sleep_epsilon;
    }

    fn zero_state(&mut self) {
        self.linear_velocity = Vector3::zero();
        self.angular_velocity = Vector3::zero();
        self.linear_influence = Vector3::zero();
        self.torque_influence = Vector3::zero();
        self.previous_linear_influence = Vector3::zero();
        self.previous_torque_influence = Vector3::zero();
    }

    /// Recomputes the world inverse inertia tensor as `R * I^-1 * R^T`
    pub(crate) fn refresh_inertia(&mut self, orientation: &Matrix3) {
        self.inverse_inertia_world = orientation.transform_tensor(&self.inverse_inertia_local);
        self.flags.insert(BodyFlags::INERTIA_CACHED);
    }

    /// Applies a velocity change computed by the contact solver
    pub(crate) fn add_velocity(&mut self, linear: Vector3, angular: Vector3) {
        self.linear_velocity += linear;
        self.angular_velocity += angular;
    }

    /// Advances the body by `quantum` seconds and writes the result into
    /// `target`. Calling it again in the same frame does nothing.
    pub fn integrate(&mut self, target: &mut Target, quantum: f32) {
        if !self.is_awake() {
            return;
        }

        if !self.flags.contains(BodyFlags::INERTIA_CACHED) {
            self.refresh_inertia(&target.orientation());
        }
        if self.flags.contains(BodyFlags::INFLUENCES_CACHED) {
            return;
        }

        let linear_acceleration = self.linear_influence * self.inverse_mass;
        let angular_acceleration = self.inverse_inertia_world * self.torque_influence;
        self.linear_velocity += linear_acceleration * quantum;
        self.angular_velocity += angular_acceleration * quantum;

        self.previous_linear_influence = self.linear_influence;
        self.previous_torque_influence = self.torque_influence;
        self.linear_influence = Vector3::zero();
        self.torque_influence = Vector3::zero();
        self.flags.insert(BodyFlags::INFLUENCES_CACHED);

        let retained = self.damping.powf(quantum);
        self.linear_velocity *= retained;
        self.angular_velocity *= retained;

        target.translate(self.linear_velocity * quantum);
        target.rotate_by(self.angular_velocity * quantum);
        self.refresh_inertia(&target.orientation());

        self.update_motion(quantum);
    }

    fn update_motion(&mut self, quantum: f32) {
        let current = self.linear_velocity.length_squared() + self.angular_velocity.length_squared();
        let bias = 0.5_f32.powf(quantum);

        self.motion = bias * self.motion + (1.0 - bias) * current;
        self.motion = self.motion.min(10.0 * self.sleep_epsilon);

        if self.can_sleep() && self.motion < self.sleep_epsilon {
            self.zero_state();
            self.flags.insert(BodyFlags::SLEEPING);
            tracing::debug!(handle = ?self.target, motion = self.motion, "body fell asleep");
        }
    }
}
