mod vector;
mod matrix;
mod rotation;
mod transform;
mod bounds;

pub use vector::Vector3;
pub use matrix::Matrix3;
pub use rotation::{Quaternion, Rotation};
pub use transform::Transform;
pub use bounds::{Aabb, BoundingSphere};

/// Constant for a very small number, used for comparisons
pub const EPSILON: f32 = 1.0e-6;

/// Returns true if the value is approximately zero
#[inline]
pub fn approx_zero(a: f32) -> bool {
    a.abs() < EPSILON
}
