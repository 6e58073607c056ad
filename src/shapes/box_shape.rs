use crate::math::{Matrix3, Transform, Vector3};

/// An oriented box collision volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    /// The half-extents of the box (half-width, half-height, half-depth)
    half_extents: Vector3,
}

impl BoxShape {
    pub fn new(half_extents: Vector3) -> Self {
        Self {
            half_extents: Vector3::new(
                half_extents.x.max(0.0),
                half_extents.y.max(0.0),
                half_extents.z.max(0.0),
            ),
        }
    }

    pub fn half_extents(&self) -> Vector3 {
        self.half_extents
    }

    /// Returns the 8 vertices of the box in local space
    pub fn vertices(&self) -> [Vector3; 8] {
        let Vector3 { x, y, z } = self.half_extents;

        [
            Vector3::new(-x, -y, -z),
            Vector3::new(x, -y, -z),
            Vector3::new(x, y, -z),
            Vector3::new(-x, y, -z),
            Vector3::new(-x, -y, z),
            Vector3::new(x, -y, z),
            Vector3::new(x, y, z),
            Vector3::new(-x, y, z),
        ]
    }

    /// Inertia tensor for the given mass, with `Ixx = m/3 * (hy^2 + hz^2)`
    /// on half extents
    pub fn inertia_tensor(&self, mass: f32) -> Matrix3 {
        let squared = self.half_extents.component_product(&self.half_extents);
        let factor = mass / 3.0;

        Matrix3::from_diagonal(Vector3::new(
            factor * (squared.y + squared.z),
            factor * (squared.x + squared.z),
            factor * (squared.x + squared.y),
        ))
    }

    /// Inverse inertia tensor for the given inverse mass. A flat box is not
    /// guarded and yields infinite entries.
    pub fn inverse_inertia_tensor(&self, inverse_mass: f32) -> Matrix3 {
        let squared = self.half_extents.component_product(&self.half_extents);
        let factor = 3.0 * inverse_mass;

        Matrix3::from_diagonal(Vector3::new(
            factor / (squared.y + squared.z),
            factor / (squared.x + squared.z),
            factor / (squared.x + squared.y),
        ))
    }

    /// Half length of the box projected onto a world axis
    pub fn project_onto(&self, transform: &Transform, axis: &Vector3) -> f32 {
        let orientation = transform.orientation();

        (0..3)
            .map(|i| self.half_extents[i] * orientation.column(i).dot(axis).abs())
            .sum()
    }
}
