use crate::core::ContactPoint;
use crate::math::{Transform, Vector3, EPSILON};
use crate::shapes::{BoxShape, Sphere};

/// Sphere against sphere. The normal points from `b` towards `a` and the
/// point lies on the surface of `a`.
pub fn sphere_and_sphere(
    a: &Sphere,
    a_transform: &Transform,
    b: &Sphere,
    b_transform: &Transform,
) -> Option<ContactPoint> {
    let center_a = a.center(a_transform);
    let center_b = b.center(b_transform);
    let radii = a.radius() + b.radius();

    let offset = center_a - center_b;
    let distance_sq = offset.length_squared();
    if distance_sq > radii * radii {
        return None;
    }

    let distance = distance_sq.sqrt();
    let normal = if distance > EPSILON {
        offset * (1.0 / distance)
    } else {
        Vector3::unit_y()
    };

    Some(ContactPoint {
        position: center_a - normal * a.radius(),
        normal,
        penetration: radii - distance,
    })
}

/// Box against sphere. The normal points from the sphere towards the box and
/// the point is the closest point of the box to the sphere center.
pub fn box_and_sphere(
    shape: &BoxShape,
    box_transform: &Transform,
    sphere: &Sphere,
    sphere_transform: &Transform,
) -> Option<ContactPoint> {
    let center = sphere.center(sphere_transform);
    let radius = sphere.radius();
    let half = shape.half_extents();

    let local = box_transform.inverse_transform_point(center);
    if local.x.abs() - radius > half.x
        || local.y.abs() - radius > half.y
        || local.z.abs() - radius > half.z
    {
        return None;
    }

    let clamped = Vector3::new(
        local.x.clamp(-half.x, half.x),
        local.y.clamp(-half.y, half.y),
        local.z.clamp(-half.z, half.z),
    );

    let distance_sq = (clamped - local).length_squared();
    if distance_sq > radius * radius {
        return None;
    }

    let distance = distance_sq.sqrt();
    if distance < EPSILON {
        // Center inside the box: push out through the nearest face
        let mut depth = f32::MAX;
        let mut outward = Vector3::unit_y();
        for i in 0..3 {
            let positive = half[i] - local[i];
            let negative = half[i] + local[i];
            if positive < depth {
                depth = positive;
                outward = box_transform.axis(i);
            }
            if negative < depth {
                depth = negative;
                outward = -box_transform.axis(i);
            }
        }

        return Some(ContactPoint {
            position: center - outward * radius,
            normal: -outward,
            penetration: depth + radius,
        });
    }

    let closest = box_transform.transform_point(clamped);

    Some(ContactPoint {
        position: closest,
        normal: (closest - center).normalize(),
        penetration: radius - distance,
    })
}
