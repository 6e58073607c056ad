mod sphere;
mod box_shape;
mod landscape;

pub use self::sphere::Sphere;
pub use self::box_shape::BoxShape;
pub use self::landscape::{Triangle, TriangleMesh};
