use crate::math::{Matrix3, Transform, Vector3};

/// A spherical collision volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    radius: f32,
}

impl Sphere {
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.max(0.0),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Inertia tensor for the given mass: I = (2/5) * m * r^2 on every axis
    pub fn inertia_tensor(&self, mass: f32) -> Matrix3 {
        let inertia = 0.4 * mass * self.radius * self.radius;
        Matrix3::from_diagonal(Vector3::new(inertia, inertia, inertia))
    }

    /// Inverse inertia tensor for the given inverse mass. A zero radius is
    /// not guarded and yields infinite entries.
    pub fn inverse_inertia_tensor(&self, inverse_mass: f32) -> Matrix3 {
        let inverse = 2.5 * inverse_mass / (self.radius * self.radius);
        Matrix3::from_diagonal(Vector3::new(inverse, inverse, inverse))
    }

    /// Center of the sphere placed by `transform`
    #[inline]
    pub fn center(&self, transform: &Transform) -> Vector3 {
        transform.position
    }
}
