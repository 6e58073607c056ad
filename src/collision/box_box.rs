//! Oriented box against oriented box, using the separating axis test over
//! the three face axes of each box and the nine edge-edge cross products.

use crate::core::ContactPoint;
use crate::math::{Transform, Vector3};
use crate::shapes::BoxShape;

/// Cross products shorter than this (squared) come from near-parallel edges
/// and are not tested
const PARALLEL_AXIS_EPSILON: f32 = 0.001;

/// Below this the closest-point system for two edges is singular
const PARALLEL_EDGE_EPSILON: f32 = 1.0e-4;

struct BoxRef<'a> {
    shape: &'a BoxShape,
    transform: &'a Transform,
}

impl BoxRef<'_> {
    #[inline]
    fn axis(&self, index: usize) -> Vector3 {
        self.transform.axis(index)
    }

    #[inline]
    fn project(&self, axis: &Vector3) -> f32 {
        self.shape.project_onto(self.transform, axis)
    }
}

/// Overlap of the two boxes along `axis`; negative means separated
fn penetration_on_axis(one: &BoxRef, two: &BoxRef, axis: &Vector3, to_center: &Vector3) -> f32 {
    one.project(axis) + two.project(axis) - to_center.dot(axis).abs()
}

/// Smallest overlap found so far and the axis case it belongs to
struct BestAxis {
    penetration: f32,
    case: usize,
}

impl BestAxis {
    /// Tests one candidate axis; returns false when it separates the boxes
    fn try_axis(&mut self, one: &BoxRef, two: &BoxRef, axis: Vector3, to_center: &Vector3, case: usize) -> bool {
        if axis.length_squared() < PARALLEL_AXIS_EPSILON {
            return true;
        }
        let axis = axis.normalize();
        let penetration = penetration_on_axis(one, two, &axis, to_center);
        if penetration < 0.0 {
            return false;
        }
        if penetration < self.penetration {
            self.penetration = penetration;
            self.case = case;
        }
        true
    }
}

/// Box against box. The normal points from `b` towards `a`.
///
/// When overlaps tie, the earlier axis wins, so face axes are preferred over
/// edge axes.
pub fn box_and_box(
    a: &BoxShape,
    a_transform: &Transform,
    b: &BoxShape,
    b_transform: &Transform,
) -> Option<ContactPoint> {
    let one = BoxRef { shape: a, transform: a_transform };
    let two = BoxRef { shape: b, transform: b_transform };
    let to_center = b_transform.position - a_transform.position;

    let mut best = BestAxis { penetration: f32::MAX, case: usize::MAX };

    for i in 0..3 {
        if !best.try_axis(&one, &two, one.axis(i), &to_center, i) {
            return None;
        }
    }
    for i in 0..3 {
        if !best.try_axis(&one, &two, two.axis(i), &to_center, 3 + i) {
            return None;
        }
    }
    let best_single_axis = best.case;
    for i in 0..3 {
        for j in 0..3 {
            let axis = one.axis(i).cross(&two.axis(j));
            if !best.try_axis(&one, &two, axis, &to_center, 6 + i * 3 + j) {
                return None;
            }
        }
    }

    let best_penetration = best.penetration;
    match best.case {
        // Every axis was skipped
        usize::MAX => None,
        case @ 0..=2 => Some(point_face(&one, &two, to_center, case, best_penetration, 1.0)),
        case @ 3..=5 => Some(point_face(&two, &one, -to_center, case - 3, best_penetration, -1.0)),
        case => Some(edge_edge(&one, &two, to_center, case - 6, best_penetration, best_single_axis)),
    }
}

/// A vertex of `vertex_box` resting in a face of `face_box`. `orientation`
/// flips the normal so that it always points from `b` towards `a`.
fn point_face(
    face_box: &BoxRef,
    vertex_box: &BoxRef,
    to_center: Vector3,
    axis_index: usize,
    penetration: f32,
    orientation: f32,
) -> ContactPoint {
    // Face normal of `face_box` pointing towards `vertex_box`
    let mut face_normal = face_box.axis(axis_index);
    if face_normal.dot(&to_center) < 0.0 {
        face_normal = -face_normal;
    }

    // The vertex of `vertex_box` furthest into `face_box`
    let mut vertex = vertex_box.shape.half_extents();
    for i in 0..3 {
        if vertex_box.axis(i).dot(&face_normal) > 0.0 {
            vertex[i] = -vertex[i];
        }
    }
    let vertex = vertex_box.transform.transform_point(vertex);

    ContactPoint {
        position: vertex + face_normal * penetration,
        normal: -face_normal * orientation,
        penetration,
    }
}

fn edge_edge(
    one: &BoxRef,
    two: &BoxRef,
    to_center: Vector3,
    case: usize,
    penetration: f32,
    best_single_axis: usize,
) -> ContactPoint {
    let one_axis_index = case / 3;
    let two_axis_index = case % 3;
    let one_axis = one.axis(one_axis_index);
    let two_axis = two.axis(two_axis_index);

    let mut axis = one_axis.cross(&two_axis).normalize();
    if axis.dot(&to_center) > 0.0 {
        axis = -axis;
    }

    // Midpoints of the two edges that touch
    let mut on_one = one.shape.half_extents();
    let mut on_two = two.shape.half_extents();
    for i in 0..3 {
        if i == one_axis_index {
            on_one[i] = 0.0;
        } else if one.axis(i).dot(&axis) > 0.0 {
            on_one[i] = -on_one[i];
        }

        if i == two_axis_index {
            on_two[i] = 0.0;
        } else if two.axis(i).dot(&axis) < 0.0 {
            on_two[i] = -on_two[i];
        }
    }
    let on_one = one.transform.transform_point(on_one);
    let on_two = two.transform.transform_point(on_two);

    let position = contact_point(
        on_one,
        one_axis,
        one.shape.half_extents()[one_axis_index],
        on_two,
        two_axis,
        two.shape.half_extents()[two_axis_index],
        best_single_axis > 2,
    );

    ContactPoint {
        position,
        normal: axis,
        penetration,
    }
}

/// Midpoint of the closest points of two edges, each given by its midpoint,
/// direction and half length. Parallel edges fall back to the midpoint of
/// one edge; closest points beyond an edge are clamped to its endpoint.
pub(crate) fn contact_point(
    point_one: Vector3,
    direction_one: Vector3,
    half_one: f32,
    point_two: Vector3,
    direction_two: Vector3,
    half_two: f32,
    use_one: bool,
) -> Vector3 {
    let length_one = direction_one.length_squared();
    let length_two = direction_two.length_squared();
    let dot_directions = direction_two.dot(&direction_one);

    let between = point_one - point_two;
    let dot_one = direction_one.dot(&between);
    let dot_two = direction_two.dot(&between);

    let denominator = length_one * length_two - dot_directions * dot_directions;
    if denominator.abs() < PARALLEL_EDGE_EPSILON {
        return if use_one { point_one } else { point_two };
    }

    let along_one = ((dot_directions * dot_two - length_two * dot_one) / denominator).clamp(-half_one, half_one);
    let along_two = ((length_one * dot_two - dot_directions * dot_one) / denominator).clamp(-half_two, half_two);

    let closest_one = point_one + direction_one * along_one;
    let closest_two = point_two + direction_two * along_two;
    (closest_one + closest_two) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn crossing_edges_meet_in_the_middle() {
        let point = contact_point(
            Vector3::new(0.0, 0.0, 0.1),
            Vector3::unit_x(),
            1.0,
            Vector3::new(0.0, 0.0, -0.1),
            Vector3::unit_y(),
            1.0,
            true,
        );
        assert_relative_eq!(point, Vector3::zero(), epsilon = 1e-6);
    }

    #[test]
    fn parallel_edges_use_the_selected_midpoint() {
        let one = Vector3::new(0.0, 1.0, 0.0);
        let two = Vector3::new(0.0, -1.0, 0.0);

        assert_eq!(contact_point(one, Vector3::unit_x(), 1.0, two, Vector3::unit_x(), 1.0, true), one);
        assert_eq!(contact_point(one, Vector3::unit_x(), 1.0, two, Vector3::unit_x(), 1.0, false), two);
    }

    #[test]
    fn closest_point_beyond_an_edge_is_clamped() {
        // The infinite lines meet at x = 5, beyond the first edge's end at x = 1
        let point = contact_point(
            Vector3::zero(),
            Vector3::unit_x(),
            1.0,
            Vector3::new(5.0, 0.0, 0.0),
            Vector3::unit_y(),
            1.0,
            true,
        );
        assert_relative_eq!(point, Vector3::new(3.0, 0.0, 0.0), epsilon = 1e-6);
    }
}
