use crate::bodies::{Material, RigidBody};
use crate::core::{BodyHandle, BodyStorage, ContactPoint, Storage, Target, TargetStorage};
use crate::math::{Matrix3, Vector3};

/// Positional correction applied to the two bodies of a contact
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionChange {
    pub linear: [Vector3; 2],
    pub angular: [Vector3; 2],
}

/// Velocity correction applied to the two bodies of a contact
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityChange {
    pub linear: [Vector3; 2],
    pub angular: [Vector3; 2],
}

/// Read-only view of the state a contact needs from one of its bodies
#[derive(Debug, Clone, Copy)]
struct Participant {
    inverse_mass: f32,
    inverse_inertia: Matrix3,
    linear_velocity: Vector3,
    angular_velocity: Vector3,
    acceleration: Vector3,
    awake: bool,
}

impl Participant {
    fn of(bodies: &BodyStorage<RigidBody>, handle: Option<BodyHandle>) -> Option<Self> {
        let body = bodies.get(handle?)?;

        Some(Self {
            inverse_mass: body.get_inverse_mass(),
            inverse_inertia: *body.get_inverse_inertia_tensor(),
            linear_velocity: body.get_linear_velocity(),
            angular_velocity: body.get_angular_velocity(),
            acceleration: body.previous_acceleration(),
            awake: body.is_awake(),
        })
    }
}

/// A single collision point between a body and either a second body or the
/// static world, plus the data needed to resolve it.
///
/// The normal points from the second body (or the world) towards the first.
#[derive(Debug, Clone, Default)]
pub struct Contact {
    /// The first body is always set on a live contact
    bodies: [Option<BodyHandle>; 2],

    point: Vector3,
    normal: Vector3,
    penetration: f32,

    friction: f32,
    restitution: f32,
    use_friction: bool,

    /// Orthonormal basis whose first column is the normal
    basis: Matrix3,

    /// Contact point relative to each body's center
    relative_position: [Vector3; 2],

    /// Closing velocity in contact space
    contact_velocity: Vector3,

    desired_delta_velocity: f32,

    /// Impulse of the last velocity resolution, in contact space
    last_impulse: Vector3,
}

impl Contact {
    /// Fills the record for a newly detected collision. The pair's material
    /// is averaged between both bodies, or taken from the first body alone
    /// against the static world.
    pub fn initialize(
        &mut self,
        first: BodyHandle,
        second: Option<BodyHandle>,
        geometry: ContactPoint,
        bodies: &BodyStorage<RigidBody>,
    ) {
        self.bodies = [Some(first), second];
        self.point = geometry.position;
        self.normal = geometry.normal;
        self.penetration = geometry.penetration;
        self.last_impulse = Vector3::zero();

        let first_body = bodies.get(first);
        let second_body = second.and_then(|handle| bodies.get(handle));
        let material = match (first_body, second_body) {
            (Some(a), Some(b)) => a.get_material().combine(b.get_material()),
            (Some(a), None) => *a.get_material(),
            _ => Material::default(),
        };

        self.friction = material.friction;
        self.restitution = material.restitution;
        self.use_friction = first_body.map_or(false, RigidBody::uses_friction)
            || second_body.map_or(false, RigidBody::uses_friction);
    }

    /// Computes the basis, relative positions, closing velocity and desired
    /// velocity change from the current body state
    pub fn prepare(
        &mut self,
        bodies: &BodyStorage<RigidBody>,
        targets: &TargetStorage<Target>,
        quantum: f32,
        restitution_threshold: f32,
    ) {
        self.basis = contact_basis(self.normal);

        for i in 0..2 {
            self.relative_position[i] = self.bodies[i]
                .and_then(|handle| bodies.get(handle))
                .and_then(|body| targets.get(body.target()))
                .map_or(Vector3::zero(), |target| self.point - target.translation());
        }

        self.contact_velocity = Vector3::zero();
        if let Some(first) = Participant::of(bodies, self.bodies[0]) {
            self.contact_velocity = self.local_velocity(&first, 0, quantum);
        }
        if let Some(second) = Participant::of(bodies, self.bodies[1]) {
            self.contact_velocity -= self.local_velocity(&second, 1, quantum);
        }

        self.update_desired_delta_velocity(bodies, quantum, restitution_threshold);
    }

    /// Velocity of the contact point on one body, in contact space, with the
    /// normal share of last frame's acceleration removed
    fn local_velocity(&self, body: &Participant, index: usize, quantum: f32) -> Vector3 {
        let velocity = body.angular_velocity.cross(&self.relative_position[index]) + body.linear_velocity;
        let mut contact_velocity = self.basis.transform_transpose(velocity);

        let mut acceleration_velocity = self.basis.transform_transpose(body.acceleration * quantum);
        acceleration_velocity.x = 0.0;
        contact_velocity += acceleration_velocity;

        contact_velocity
    }

    /// Recomputes the target change in closing velocity. Restitution is
    /// dropped for closing speeds under `restitution_threshold`.
    pub(crate) fn update_desired_delta_velocity(
        &mut self,
        bodies: &BodyStorage<RigidBody>,
        quantum: f32,
        restitution_threshold: f32,
    ) {
        let mut velocity_from_acceleration = 0.0;
        if let Some(first) = Participant::of(bodies, self.bodies[0]).filter(|p| p.awake) {
            velocity_from_acceleration += (first.acceleration * quantum).dot(&self.normal);
        }
        if let Some(second) = Participant::of(bodies, self.bodies[1]).filter(|p| p.awake) {
            velocity_from_acceleration -= (second.acceleration * quantum).dot(&self.normal);
        }

        let restitution = if self.contact_velocity.x.abs() < restitution_threshold {
            0.0
        } else {
            self.restitution
        };

        self.desired_delta_velocity = -self.contact_velocity.x
            - restitution * (self.contact_velocity.x - velocity_from_acceleration);
    }

    /// Wakes a sleeping body touched by an awake one
    pub fn match_awake_state(&self, bodies: &mut BodyStorage<RigidBody>) {
        let (Some(first), Some(second)) = (self.bodies[0], self.bodies[1]) else {
            return;
        };

        let first_awake = bodies.get(first).map_or(false, RigidBody::is_awake);
        let second_awake = bodies.get(second).map_or(false, RigidBody::is_awake);
        if first_awake == second_awake {
            return;
        }

        let sleeper = if first_awake { second } else { first };
        if let Some(body) = bodies.get_mut(sleeper) {
            if body.is_sleeping() {
                body.wake_up();
                tracing::debug!(body = ?sleeper, "body woken by contact");
            }
        }
    }

    /// Moves the bodies apart along the normal by `penetration`, sharing the
    /// move between translation and rotation in proportion to each body's
    /// inertia along the normal. Rotation is limited to `angular_limit` times
    /// the lever arm.
    pub fn resolve_interpenetration(
        &mut self,
        penetration: f32,
        bodies: &mut BodyStorage<RigidBody>,
        targets: &mut TargetStorage<Target>,
        angular_limit: f32,
    ) -> PositionChange {
        let mut change = PositionChange::default();
        let participants = [
            Participant::of(bodies, self.bodies[0]),
            Participant::of(bodies, self.bodies[1]),
        ];

        let mut angular_inertia = [0.0_f32; 2];
        let mut linear_inertia = [0.0_f32; 2];
        let mut total_inertia = 0.0;

        for (i, participant) in participants.iter().enumerate() {
            let Some(body) = participant else { continue };

            let angular_inertia_world = body
                .inverse_inertia
                .multiply_vector(self.relative_position[i].cross(&self.normal))
                .cross(&self.relative_position[i]);
            angular_inertia[i] = angular_inertia_world.dot(&self.normal);
            linear_inertia[i] = body.inverse_mass;
            total_inertia += linear_inertia[i] + angular_inertia[i];
        }

        if total_inertia <= 0.0 {
            return change;
        }

        for (i, participant) in participants.iter().enumerate() {
            let Some(body) = participant else { continue };
            let sign = if i == 0 { 1.0 } else { -1.0 };

            let mut angular_move = sign * penetration * (angular_inertia[i] / total_inertia);
            let mut linear_move = sign * penetration * (linear_inertia[i] / total_inertia);

            let arm = self.relative_position[i];
            let projection = arm - self.normal * arm.dot(&self.normal);
            let max_magnitude = angular_limit * projection.length();

            if angular_move.abs() > max_magnitude {
                let total_move = angular_move + linear_move;
                angular_move = max_magnitude.copysign(angular_move);
                linear_move = total_move - angular_move;
            }

            if angular_move != 0.0 && angular_inertia[i] != 0.0 {
                let direction = arm.cross(&self.normal);
                change.angular[i] = body.inverse_inertia.multiply_vector(direction)
                    * (angular_move / angular_inertia[i]);
            }
            change.linear[i] = self.normal * linear_move;

            let Some(handle) = self.bodies[i] else { continue };
            let Some(rigid_body) = bodies.get_mut(handle) else { continue };
            if let Some(target) = targets.get_mut(rigid_body.target()) {
                target.translate(change.linear[i]);
                target.rotate_by(change.angular[i]);
                rigid_body.refresh_inertia(&target.orientation());
            }
        }

        change
    }

    /// Applies the impulse that achieves the desired velocity change and
    /// returns the resulting per-body velocity changes
    pub fn resolve_impulse(&mut self, bodies: &mut BodyStorage<RigidBody>) -> VelocityChange {
        let mut change = VelocityChange::default();
        let participants = [
            Participant::of(bodies, self.bodies[0]),
            Participant::of(bodies, self.bodies[1]),
        ];
        let Some(first) = participants[0] else {
            return change;
        };

        let impulse_contact = if self.use_friction {
            self.friction_impulse(&first, participants[1].as_ref())
                .unwrap_or_else(|| self.frictionless_impulse(&first, participants[1].as_ref()))
        } else {
            self.frictionless_impulse(&first, participants[1].as_ref())
        };
        self.last_impulse = impulse_contact;

        let impulse = self.basis.multiply_vector(impulse_contact);

        let torque = self.relative_position[0].cross(&impulse);
        change.angular[0] = first.inverse_inertia.multiply_vector(torque);
        change.linear[0] = impulse * first.inverse_mass;

        if let Some(second) = participants[1] {
            let torque = impulse.cross(&self.relative_position[1]);
            change.angular[1] = second.inverse_inertia.multiply_vector(torque);
            change.linear[1] = impulse * -second.inverse_mass;
        }

        for i in 0..2 {
            if let Some(body) = self.bodies[i].and_then(|handle| bodies.get_mut(handle)) {
                body.add_velocity(change.linear[i], change.angular[i]);
            }
        }

        change
    }

    fn frictionless_impulse(&self, first: &Participant, second: Option<&Participant>) -> Vector3 {
        let mut delta_velocity = self.velocity_per_unit_impulse(first, 0);
        if let Some(second) = second {
            delta_velocity += self.velocity_per_unit_impulse(second, 1);
        }

        Vector3::new(self.desired_delta_velocity / delta_velocity, 0.0, 0.0)
    }

    /// Change in normal velocity produced by a unit impulse along the normal
    fn velocity_per_unit_impulse(&self, body: &Participant, index: usize) -> f32 {
        let arm = self.relative_position[index];
        let delta_world = body
            .inverse_inertia
            .multiply_vector(arm.cross(&self.normal))
            .cross(&arm);

        delta_world.dot(&self.normal) + body.inverse_mass
    }

    /// Impulse with Coulomb friction. Returns `None` when the impulse matrix
    /// cannot be inverted.
    fn friction_impulse(&self, first: &Participant, second: Option<&Participant>) -> Option<Vector3> {
        let mut inverse_mass = first.inverse_mass;
        let mut delta_world = angular_response(&first.inverse_inertia, self.relative_position[0]);

        if let Some(second) = second {
            delta_world = delta_world + angular_response(&second.inverse_inertia, self.relative_position[1]);
            inverse_mass += second.inverse_mass;
        }

        let mut delta_velocity = self
            .basis
            .transpose()
            .multiply_matrix(&delta_world)
            .multiply_matrix(&self.basis);
        for i in 0..3 {
            delta_velocity.data[i][i] += inverse_mass;
        }

        let impulse_matrix = delta_velocity.inverse()?;
        let velocity_kill = Vector3::new(
            self.desired_delta_velocity,
            -self.contact_velocity.y,
            -self.contact_velocity.z,
        );
        let mut impulse = impulse_matrix.multiply_vector(velocity_kill);

        let planar = (impulse.y * impulse.y + impulse.z * impulse.z).sqrt();
        if planar > impulse.x * self.friction {
            // Sliding: clamp onto the friction cone and re-solve the normal part
            let direction_y = impulse.y / planar;
            let direction_z = impulse.z / planar;
            let row = delta_velocity.data[0];
            let normal_response =
                row[0] + row[1] * self.friction * direction_y + row[2] * self.friction * direction_z;

            impulse.x = self.desired_delta_velocity / normal_response;
            impulse.y = direction_y * self.friction * impulse.x;
            impulse.z = direction_z * self.friction * impulse.x;
        }

        Some(impulse)
    }

    /// Shifts the stored penetration after a position change of a body this
    /// contact shares with another
    pub(crate) fn propagate_position_change(&mut self, moved: BodyHandle, change: &PositionChange, moved_index: usize) {
        for b in 0..2 {
            if self.bodies[b] != Some(moved) {
                continue;
            }
            let delta = change.linear[moved_index]
                + change.angular[moved_index].cross(&self.relative_position[b]);
            let sign = if b == 0 { -1.0 } else { 1.0 };
            self.penetration += sign * delta.dot(&self.normal);
        }
    }

    /// Shifts the stored closing velocity after a velocity change of a body
    /// this contact shares with another. Returns whether anything changed.
    pub(crate) fn propagate_velocity_change(&mut self, moved: BodyHandle, change: &VelocityChange, moved_index: usize) -> bool {
        let mut touched = false;
        for b in 0..2 {
            if self.bodies[b] != Some(moved) {
                continue;
            }
            let delta = change.linear[moved_index]
                + change.angular[moved_index].cross(&self.relative_position[b]);
            let sign = if b == 0 { 1.0 } else { -1.0 };
            self.contact_velocity += self.basis.transform_transpose(delta) * sign;
            touched = true;
        }
        touched
    }

    #[inline]
    pub fn bodies(&self) -> [Option<BodyHandle>; 2] {
        self.bodies
    }

    #[inline]
    pub fn first(&self) -> Option<BodyHandle> {
        self.bodies[0]
    }

    #[inline]
    pub fn second(&self) -> Option<BodyHandle> {
        self.bodies[1]
    }

    #[inline]
    pub fn point(&self) -> Vector3 {
        self.point
    }

    #[inline]
    pub fn normal(&self) -> Vector3 {
        self.normal
    }

    #[inline]
    pub fn penetration(&self) -> f32 {
        self.penetration
    }

    #[inline]
    pub fn friction(&self) -> f32 {
        self.friction
    }

    #[inline]
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    #[inline]
    pub fn uses_friction(&self) -> bool {
        self.use_friction
    }

    #[inline]
    pub fn basis(&self) -> &Matrix3 {
        &self.basis
    }

    #[inline]
    pub fn contact_velocity(&self) -> Vector3 {
        self.contact_velocity
    }

    #[inline]
    pub fn desired_delta_velocity(&self) -> f32 {
        self.desired_delta_velocity
    }

    /// Impulse applied by the last velocity resolution: x along the normal,
    /// y and z tangential
    #[inline]
    pub fn last_impulse(&self) -> Vector3 {
        self.last_impulse
    }
}

/// Velocity change per unit impulse from rotation, `-[r]x * I^-1 * [r]x`
fn angular_response(inverse_inertia: &Matrix3, arm: Vector3) -> Matrix3 {
    let impulse_to_torque = Matrix3::skew_symmetric(arm);
    -(impulse_to_torque
        .multiply_matrix(inverse_inertia)
        .multiply_matrix(&impulse_to_torque))
}

/// Orthonormal basis with `normal` as its first column, built from the world
/// axis least aligned with the normal
pub fn contact_basis(normal: Vector3) -> Matrix3 {
    let tangent;
    let binormal;

    if normal.x.abs() > normal.y.abs() {
        let scale = 1.0 / (normal.z * normal.z + normal.x * normal.x).sqrt();
        tangent = Vector3::new(normal.z * scale, 0.0, -normal.x * scale);
        binormal = Vector3::new(
            normal.y * tangent.x,
            normal.z * tangent.x - normal.x * tangent.z,
            -normal.y * tangent.x,
        );
    } else {
        let scale = 1.0 / (normal.z * normal.z + normal.y * normal.y).sqrt();
        tangent = Vector3::new(0.0, -normal.z * scale, normal.y * scale);
        binormal = Vector3::new(
            normal.y * tangent.z - normal.z * tangent.y,
            -normal.x * tangent.z,
            normal.x * tangent.y,
        );
    }

    Matrix3::from_columns(normal, tangent, binormal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn basis_is_orthonormal() {
        for normal in [
            Vector3::unit_x(),
            Vector3::unit_y(),
            Vector3::new(1.0, 2.0, -3.0).normalize(),
            Vector3::new(-0.2, 0.1, 0.97).normalize(),
        ] {
            let basis = contact_basis(normal);
            let (a, b, c) = (basis.column(0), basis.column(1), basis.column(2));

            assert_relative_eq!(a, normal, epsilon = 1e-6);
            assert_relative_eq!(a.dot(&b), 0.0, epsilon = 1e-5);
            assert_relative_eq!(a.dot(&c), 0.0, epsilon = 1e-5);
            assert_relative_eq!(b.dot(&c), 0.0, epsilon = 1e-5);
            assert_relative_eq!(b.length(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(c.length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn angular_response_of_centered_contact_is_zero() {
        let response = angular_response(&Matrix3::identity(), Vector3::zero());
        assert_relative_eq!(response.determinant(), 0.0);
    }
}
