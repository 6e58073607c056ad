use crate::math::{Vector3, Quaternion, Matrix3};
use crate::math::rotation::Rotation;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A rigid placement in 3D space (translation and orientation, no scale)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Transform {
    /// Translation in world space
    pub position: Vector3,

    /// Orientation as a unit quaternion
    pub rotation: Quaternion,
}

impl Transform {
    #[inline]
    pub fn new(position: Vector3, rotation: Quaternion) -> Self {
        Self { position, rotation }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new(Vector3::zero(), Quaternion::identity())
    }

    #[inline]
    pub fn from_position(position: Vector3) -> Self {
        Self::new(position, Quaternion::identity())
    }

    /// Returns the orientation as a rotation matrix
    #[inline]
    pub fn orientation(&self) -> Matrix3 {
        self.rotation.to_rotation_matrix()
    }

    /// Returns one of the three local axes expressed in world space
    #[inline]
    pub fn axis(&self, index: usize) -> Vector3 {
        self.orientation().column(index)
    }

    /// Maps a local point into world space
    #[inline]
    pub fn transform_point(&self, point: Vector3) -> Vector3 {
        self.rotation.rotate_vector(point) + self.position
    }

    /// Maps a world point into local space
    #[inline]
    pub fn inverse_transform_point(&self, point: Vector3) -> Vector3 {
        self.rotation.conjugate().rotate_vector(point - self.position)
    }

    /// Rotates a local direction into world space
    #[inline]
    pub fn transform_direction(&self, direction: Vector3) -> Vector3 {
        self.rotation.rotate_vector(direction)
    }

    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.conjugate();

        Self {
            position: -inv_rotation.rotate_vector(self.position),
            rotation: inv_rotation,
        }
    }
}
