use impulse_phys::math::{Aabb, BoundingSphere, Matrix3, Quaternion, Rotation, Transform, Vector3};
use std::f32::consts::PI;
use approx::assert_relative_eq;

#[test]
fn test_vector3_operations() {
    let v1 = Vector3::new(1.0, 2.0, 3.0);
    let v2 = Vector3::new(4.0, 5.0, 6.0);

    // Addition
    let sum = v1 + v2;
    assert_eq!(sum, Vector3::new(5.0, 7.0, 9.0));

    // Subtraction
    let diff = v2 - v1;
    assert_eq!(diff, Vector3::new(3.0, 3.0, 3.0));

    // Scalar multiplication
    assert_eq!(v1 * 2.0, Vector3::new(2.0, 4.0, 6.0));
    assert_eq!(2.0 * v1, v1 * 2.0);

    // Dot product
    let dot = v1.dot(&v2);
    assert_eq!(dot, 1.0 * 4.0 + 2.0 * 5.0 + 3.0 * 6.0);

    // Cross product
    let cross = v1.cross(&v2);
    assert_eq!(cross.x, v1.y * v2.z - v1.z * v2.y);
    assert_eq!(cross.y, v1.z * v2.x - v1.x * v2.z);
    assert_eq!(cross.z, v1.x * v2.y - v1.y * v2.x);

    // Length
    let length = v1.length();
    assert_relative_eq!(length, 14.0f32.sqrt());

    // Normalize
    let normalized = v1.normalize();
    assert_relative_eq!(normalized.length(), 1.0);
    assert_relative_eq!(normalized, v1 / length);

    // A zero vector stays zero
    assert!(Vector3::zero().normalize().is_zero());

    // Component product and indexing
    assert_eq!(v1.component_product(&v2), Vector3::new(4.0, 10.0, 18.0));
    assert_eq!(v1[0], 1.0);
    assert_eq!(v1[2], 3.0);
}

#[test]
fn test_quaternion_operations() {
    let axis = Vector3::new(0.0, 1.0, 0.0);
    let q = Quaternion::from_axis_angle(axis, PI / 2.0);

    assert_relative_eq!(q.normalize().length(), 1.0);

    // (1, 0, 0) turned 90 degrees around Y ends up at (0, 0, -1)
    let rotated = q.rotate_vector(Vector3::new(1.0, 0.0, 0.0));
    assert_relative_eq!(rotated, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-5);

    // Conjugate
    let q_conj = q.conjugate();
    assert_eq!(q_conj.w, q.w);
    assert_eq!(q_conj.x, -q.x);
    assert_eq!(q_conj.y, -q.y);
    assert_eq!(q_conj.z, -q.z);

    // Composition of rotations
    let q1 = Quaternion::from_axis_angle(Vector3::new(1.0, 0.0, 0.0), PI / 4.0);
    let q2 = Quaternion::from_axis_angle(Vector3::new(0.0, 1.0, 0.0), PI / 4.0);
    let q3 = q2 * q1;

    let v = Vector3::new(0.0, 0.0, 1.0);
    assert_relative_eq!(
        q3.rotate_vector(v),
        q2.rotate_vector(q1.rotate_vector(v)),
        epsilon = 1e-5
    );
}

#[test]
fn test_small_angle_update_matches_axis_angle() {
    let angular = Vector3::new(0.0, 0.01, 0.0);
    let stepped = Quaternion::identity().add_scaled_vector(angular, 1.0).normalize();
    let exact = Quaternion::from_axis_angle(Vector3::unit_y(), 0.01);

    assert_relative_eq!(stepped.dot(&exact).abs(), 1.0, epsilon = 1e-5);
}

#[test]
fn test_rotation_matrix_columns_are_local_axes() {
    let q = Quaternion::from_axis_angle(Vector3::unit_z(), PI / 2.0);
    let m = q.to_rotation_matrix();

    // Local X points along world Y after a quarter turn about Z
    assert_relative_eq!(m.column(0), Vector3::unit_y(), epsilon = 1e-5);
    assert_relative_eq!(m.column(1), -Vector3::unit_x(), epsilon = 1e-5);
    assert_relative_eq!(m.column(2), Vector3::unit_z(), epsilon = 1e-5);
    assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-5);
}

#[test]
fn test_matrix3_operations() {
    let identity = Matrix3::identity();

    let m = Matrix3::new([
        [1.0, 2.0, 3.0],
        [4.0, 5.0, 6.0],
        [7.0, 8.0, 9.0],
    ]);

    let result = m.multiply_matrix(&identity);
    assert_eq!(result.data, m.data);

    // Vector multiplication
    let v = Vector3::new(1.0, 2.0, 3.0);
    let mv = m.multiply_vector(v);
    assert_eq!(mv.x, 1.0 * v.x + 2.0 * v.y + 3.0 * v.z);
    assert_eq!(mv.y, 4.0 * v.x + 5.0 * v.y + 6.0 * v.z);
    assert_eq!(mv.z, 7.0 * v.x + 8.0 * v.y + 9.0 * v.z);

    // Transpose
    let m_transpose = m.transpose();
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(m_transpose.data[i][j], m.data[j][i]);
        }
    }
    assert_eq!(m.transform_transpose(v), m_transpose.multiply_vector(v));

    // A singular matrix has no inverse
    assert!(m.inverse().is_none());

    let invertible = Matrix3::from_diagonal(Vector3::new(2.0, 4.0, 8.0));
    let inverse = invertible.inverse().expect("diagonal matrix is invertible");
    assert_relative_eq!(inverse.diagonal(), Vector3::new(0.5, 0.25, 0.125));
}

#[test]
fn test_skew_symmetric_is_cross_product() {
    let a = Vector3::new(1.0, -2.0, 0.5);
    let b = Vector3::new(3.0, 0.25, -1.0);

    assert_relative_eq!(Matrix3::skew_symmetric(a).multiply_vector(b), a.cross(&b), epsilon = 1e-6);
}

#[test]
fn test_transform_tensor_rotates_inertia() {
    let tensor = Matrix3::from_diagonal(Vector3::new(1.0, 2.0, 3.0));
    let rotation = Quaternion::from_axis_angle(Vector3::unit_z(), PI / 2.0).to_rotation_matrix();

    let world = rotation.transform_tensor(&tensor);

    // A quarter turn about Z swaps the X and Y moments
    assert_relative_eq!(world.diagonal(), Vector3::new(2.0, 1.0, 3.0), epsilon = 1e-5);
}

#[test]
fn test_transform_operations() {
    let position = Vector3::new(1.0, 2.0, 3.0);
    let rotation = Quaternion::from_axis_angle(Vector3::new(0.0, 1.0, 0.0), PI / 2.0);
    let transform = Transform::new(position, rotation);

    // Rotate 90 degrees around Y, then translate
    let point = Vector3::new(1.0, 0.0, 0.0);
    let transformed_point = transform.transform_point(point);
    assert_relative_eq!(transformed_point, Vector3::new(1.0, 2.0, 2.0), epsilon = 1e-5);

    // Inverse transform
    assert_relative_eq!(transform.inverse_transform_point(transformed_point), point, epsilon = 1e-5);
    assert_relative_eq!(transform.inverse().transform_point(transformed_point), point, epsilon = 1e-5);

    // Directions ignore the translation
    assert_relative_eq!(
        transform.transform_direction(Vector3::unit_x()),
        Vector3::new(0.0, 0.0, -1.0),
        epsilon = 1e-5
    );
}

#[test]
fn test_aabb_operations() {
    let aabb = Aabb::new(Vector3::new(-1.0, -2.0, -3.0), Vector3::new(1.0, 2.0, 3.0));

    assert_eq!(aabb.center(), Vector3::zero());
    assert_eq!(aabb.half_extents(), Vector3::new(1.0, 2.0, 3.0));

    // Contains point
    assert!(aabb.contains_point(Vector3::zero()));
    assert!(aabb.contains_point(Vector3::new(0.5, 1.0, 1.5)));
    assert!(!aabb.contains_point(Vector3::new(2.0, 0.0, 0.0)));

    // Intersection
    let aabb2 = Aabb::new(Vector3::new(0.5, 0.5, 0.5), Vector3::new(2.0, 3.0, 4.0));
    assert!(aabb.intersects(&aabb2));

    let aabb3 = Aabb::new(Vector3::new(2.0, 3.0, 4.0), Vector3::new(3.0, 4.0, 5.0));
    assert!(!aabb.intersects(&aabb3));

    // From points
    let fitted = Aabb::from_points(&[Vector3::new(1.0, 0.0, -1.0), Vector3::new(-2.0, 4.0, 0.0)]).unwrap();
    assert_eq!(fitted.min, Vector3::new(-2.0, 0.0, -1.0));
    assert_eq!(fitted.max, Vector3::new(1.0, 4.0, 0.0));
    assert!(Aabb::from_points(&[]).is_none());

    // A quarter turn about Y swaps the X and Z extents
    let turned = aabb.transformed(&Transform::new(
        Vector3::zero(),
        Quaternion::from_axis_angle(Vector3::unit_y(), PI / 2.0),
    ));
    assert_relative_eq!(turned.half_extents(), Vector3::new(3.0, 2.0, 1.0), epsilon = 1e-5);
}

#[test]
fn test_bounding_sphere_overlap() {
    let a = BoundingSphere::new(Vector3::zero(), 1.0);
    let b = BoundingSphere::new(Vector3::new(2.05, 0.0, 0.0), 1.0);

    assert!(!a.overlaps(&b, 0.0));
    assert!(a.overlaps(&b, 0.1));
}

#[test]
fn test_nalgebra_interop() {
    let v = Vector3::new(1.0, -2.0, 3.5);
    assert_eq!(Vector3::from_nalgebra(&v.to_nalgebra()), v);
    assert_eq!(v.to_nalgebra().cross(&Vector3::unit_x().to_nalgebra()).z, v.cross(&Vector3::unit_x()).z);

    let m = Matrix3::new([
        [2.0, 0.5, 0.0],
        [0.0, 1.0, -1.0],
        [1.0, 0.0, 3.0],
    ]);
    let na_inverse = m.to_nalgebra().try_inverse().unwrap();
    assert_relative_eq!(
        Matrix3::from_nalgebra(&na_inverse).multiply_vector(v),
        m.inverse().unwrap().multiply_vector(v),
        epsilon = 1e-5
    );

    let q = Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0), 0.6);
    let unit = nalgebra::UnitQuaternion::from_quaternion(q.to_nalgebra());
    let rotated = unit * v.to_nalgebra();
    assert_relative_eq!(Vector3::from_nalgebra(&rotated), q.rotate_vector(v), epsilon = 1e-5);
    assert_eq!(Quaternion::from_nalgebra(&q.to_nalgebra()), q);
}

#[test]
fn test_array_conversions() {
    let v: Vector3 = [1.0, 2.0, 3.0].into();
    assert_eq!(v, Vector3::new(1.0, 2.0, 3.0));

    let array: [f32; 3] = v.into();
    assert_eq!(array, [1.0, 2.0, 3.0]);
}
