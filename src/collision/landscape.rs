//! Dynamic shapes against a static triangle mesh. Both routines work in the
//! mesh frame and report the result in world space, with the normal pointing
//! away from the mesh.

use crate::core::ContactPoint;
use crate::math::{Transform, Vector3};
use crate::shapes::{BoxShape, Sphere, Triangle, TriangleMesh};

/// Most corner contacts merged into one box contact
pub const MAX_CORNER_CONTACTS: usize = 4;

/// Sphere against a landscape mesh: the deepest triangle whose plane the
/// center is in front of, within one radius, and whose face contains the
/// projected center
pub fn sphere_and_landscape(
    sphere: &Sphere,
    sphere_transform: &Transform,
    mesh: &TriangleMesh,
    mesh_transform: &Transform,
) -> Option<ContactPoint> {
    let radius = sphere.radius();
    let local_center = mesh_transform.inverse_transform_point(sphere.center(sphere_transform));

    let mut best: Option<(&Triangle, f32)> = None;
    for triangle in mesh.triangles() {
        let distance = triangle.signed_distance(local_center);
        if distance < 0.0 || distance > radius {
            continue;
        }
        if !triangle.contains_projection(local_center) {
            continue;
        }
        if best.map_or(true, |(_, closest)| distance < closest) {
            best = Some((triangle, distance));
        }
    }

    let (triangle, distance) = best?;
    let local_point = triangle.project(local_center);

    Some(ContactPoint {
        position: mesh_transform.transform_point(local_point),
        normal: mesh_transform.transform_direction(triangle.normal),
        penetration: radius - distance,
    })
}

#[derive(Debug, Clone, Copy)]
struct Corner {
    point: Vector3,
    normal: Vector3,
    depth: f32,
}

/// Up to `MAX_CORNER_CONTACTS` corners, replacing the shallowest when full
#[derive(Debug, Default)]
struct CornerSet {
    corners: [Option<Corner>; MAX_CORNER_CONTACTS],
}

impl CornerSet {
    fn add(&mut self, corner: Corner) {
        if let Some(slot) = self.corners.iter_mut().find(|slot| slot.is_none()) {
            *slot = Some(corner);
            return;
        }

        let shallowest = self
            .corners
            .iter_mut()
            .flatten()
            .min_by(|a, b| a.depth.total_cmp(&b.depth));
        if let Some(shallowest) = shallowest {
            if corner.depth > shallowest.depth {
                *shallowest = corner;
            }
        }
    }

    fn average(&self) -> Option<ContactPoint> {
        let mut count = 0;
        let mut point = Vector3::zero();
        let mut normal = Vector3::zero();
        let mut depth = 0.0;

        for corner in self.corners.iter().flatten() {
            count += 1;
            point += corner.point;
            normal += corner.normal;
            depth += corner.depth;
        }

        if count == 0 {
            return None;
        }
        let scale = 1.0 / count as f32;

        Some(ContactPoint {
            position: point * scale,
            normal: normal.normalize(),
            penetration: depth * scale,
        })
    }
}

/// Box against a landscape mesh. Every box corner below a triangle it
/// projects into is a corner contact; the deepest four are averaged into a
/// single contact.
pub fn box_and_landscape(
    shape: &BoxShape,
    box_transform: &Transform,
    mesh: &TriangleMesh,
    mesh_transform: &Transform,
) -> Option<ContactPoint> {
    // Box placement relative to the mesh
    let relative = Transform::new(
        mesh_transform.inverse_transform_point(box_transform.position),
        mesh_transform.rotation.conjugate() * box_transform.rotation,
    );

    // Triangles whose plane the box center is above and within reach of
    let reachable: Vec<&Triangle> = mesh
        .triangles()
        .iter()
        .filter(|triangle| {
            let center_distance = triangle.signed_distance(relative.position);
            center_distance >= 0.0 && center_distance <= shape.project_onto(&relative, &triangle.normal)
        })
        .collect();
    if reachable.is_empty() {
        return None;
    }

    let mut corners = CornerSet::default();
    for vertex in shape.vertices() {
        let local_vertex = relative.transform_point(vertex);

        let mut deepest: Option<(&Triangle, f32)> = None;
        for &triangle in &reachable {
            let depth = -triangle.signed_distance(local_vertex);
            if depth < 0.0 || !triangle.contains_projection(local_vertex) {
                continue;
            }
            if deepest.map_or(true, |(_, best)| depth > best) {
                deepest = Some((triangle, depth));
            }
        }

        if let Some((triangle, depth)) = deepest {
            corners.add(Corner {
                point: mesh_transform.transform_point(triangle.project(local_vertex)),
                normal: mesh_transform.transform_direction(triangle.normal),
                depth,
            });
        }
    }

    corners.average()
}
