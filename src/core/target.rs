use std::sync::Arc;

use crate::math::{Aabb, BoundingSphere, Matrix3, Quaternion, Transform, Vector3};
use crate::shapes::TriangleMesh;

/// A scene transform node driven by a rigid body.
///
/// The scene layer owns targets; bodies refer to them by `TargetHandle` and
/// write back translation and rotation after each step. The bounds describe
/// the collision volume: the half extents are used by box bodies, the radius
/// by sphere bodies and by the broad phase.
#[derive(Debug, Clone)]
pub struct Target {
    transform: Transform,
    half_extents: Vector3,
    radius: f32,
    mesh: Option<Arc<TriangleMesh>>,
}

impl Target {
    /// Creates a target with explicit bounds
    pub fn new(transform: Transform, half_extents: Vector3, radius: f32) -> Self {
        Self {
            transform,
            half_extents,
            radius,
            mesh: None,
        }
    }

    /// Creates a target bounded by a sphere
    pub fn sphere(position: Vector3, radius: f32) -> Self {
        Self::new(
            Transform::from_position(position),
            Vector3::new(radius, radius, radius),
            radius,
        )
    }

    /// Creates a target bounded by an oriented box
    pub fn cuboid(transform: Transform, half_extents: Vector3) -> Self {
        Self::new(transform, half_extents, half_extents.length())
    }

    /// Creates a target carrying a static triangle mesh
    pub fn landscape(transform: Transform, mesh: Arc<TriangleMesh>) -> Self {
        let bounds = mesh.local_bounds();
        let half_extents = bounds.half_extents();
        let radius = mesh.bounding_radius();

        Self {
            transform,
            half_extents,
            radius,
            mesh: Some(mesh),
        }
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// World position of the node
    #[inline]
    pub fn translation(&self) -> Vector3 {
        self.transform.position
    }

    #[inline]
    pub fn set_translation(&mut self, translation: Vector3) {
        self.transform.position = translation;
    }

    #[inline]
    pub fn rotation(&self) -> Quaternion {
        self.transform.rotation
    }

    #[inline]
    pub fn set_rotation(&mut self, rotation: Quaternion) {
        self.transform.rotation = rotation.normalize();
    }

    /// World orientation as a rotation matrix
    #[inline]
    pub fn orientation(&self) -> Matrix3 {
        self.transform.orientation()
    }

    #[inline]
    pub fn half_extents(&self) -> Vector3 {
        self.half_extents
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mesh(&self) -> Option<&Arc<TriangleMesh>> {
        self.mesh.as_ref()
    }

    /// Bounding box in world space
    pub fn world_bounds(&self) -> Aabb {
        match &self.mesh {
            Some(mesh) => mesh.local_bounds().transformed(&self.transform),
            None => Aabb::from_center_half_extents(Vector3::zero(), self.half_extents)
                .transformed(&self.transform),
        }
    }

    /// Bounding sphere in world space
    #[inline]
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.transform.position, self.radius)
    }

    /// Moves the node by a world-space offset
    #[inline]
    pub(crate) fn translate(&mut self, delta: Vector3) {
        self.transform.position += delta;
    }

    /// Turns the node by a small angular displacement and renormalizes
    #[inline]
    pub(crate) fn rotate_by(&mut self, angular_displacement: Vector3) {
        self.transform.rotation = self.transform.rotation
            .add_scaled_vector(angular_displacement, 1.0)
            .normalize();
    }
}
