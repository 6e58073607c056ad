use crate::error::PhysicsError;
use crate::math::{Aabb, Vector3, EPSILON};
use crate::Result;

/// A triangle of a static mesh with its precomputed plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vector3; 3],

    /// Unit face normal, following the counter-clockwise winding
    pub normal: Vector3,

    /// Plane offset: `normal.dot(p) == offset` for every point on the plane
    pub offset: f32,
}

impl Triangle {
    pub fn new(a: Vector3, b: Vector3, c: Vector3) -> Self {
        let normal = (b - a).cross(&(c - a)).normalize();
        let offset = normal.dot(&a);

        Self {
            vertices: [a, b, c],
            normal,
            offset,
        }
    }

    /// Signed distance of a point from the triangle plane, positive on the
    /// side the normal points to
    #[inline]
    pub fn signed_distance(&self, point: Vector3) -> f32 {
        self.normal.dot(&point) - self.offset
    }

    /// Projects a point onto the triangle plane
    #[inline]
    pub fn project(&self, point: Vector3) -> Vector3 {
        point - self.normal * self.signed_distance(point)
    }

    /// Whether the projection of `point` onto the plane falls inside the
    /// triangle, using barycentric coordinates
    pub fn contains_projection(&self, point: Vector3) -> bool {
        let [a, b, c] = self.vertices;
        let v0 = c - a;
        let v1 = b - a;
        let v2 = self.project(point) - a;

        let dot00 = v0.dot(&v0);
        let dot01 = v0.dot(&v1);
        let dot02 = v0.dot(&v2);
        let dot11 = v1.dot(&v1);
        let dot12 = v1.dot(&v2);

        let denom = dot00 * dot11 - dot01 * dot01;
        if denom.abs() < EPSILON * EPSILON {
            return false;
        }

        let inv = 1.0 / denom;
        let u = (dot11 * dot02 - dot01 * dot12) * inv;
        let v = (dot00 * dot12 - dot01 * dot02) * inv;

        u >= -EPSILON && v >= -EPSILON && u + v <= 1.0 + EPSILON
    }
}

/// Read-only triangle list backing a landscape body, in mesh-local space
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    bounds: Aabb,
    bounding_radius: f32,
}

impl TriangleMesh {
    /// Builds a mesh from a vertex list and triangle indices.
    ///
    /// Fails when an index is out of range or the mesh has no triangles.
    pub fn new(vertices: Vec<Vector3>, indices: Vec<[u32; 3]>) -> Result<Self> {
        if indices.is_empty() {
            return Err(PhysicsError::InvalidParameter(
                "Triangle mesh needs at least one triangle".to_string(),
            ));
        }

        let mut triangles = Vec::with_capacity(indices.len());
        for [i, j, k] in indices {
            let fetch = |index: u32| {
                vertices.get(index as usize).copied().ok_or_else(|| {
                    PhysicsError::InvalidParameter(format!(
                        "Vertex index {} out of range for {} vertices",
                        index,
                        vertices.len()
                    ))
                })
            };
            triangles.push(Triangle::new(fetch(i)?, fetch(j)?, fetch(k)?));
        }

        Self::from_triangles(triangles)
    }

    /// Builds a mesh from already assembled triangles
    pub fn from_triangles(triangles: Vec<Triangle>) -> Result<Self> {
        let points: Vec<Vector3> = triangles
            .iter()
            .flat_map(|triangle| triangle.vertices)
            .collect();
        let bounds = Aabb::from_points(&points).ok_or_else(|| {
            PhysicsError::InvalidParameter("Triangle mesh needs at least one triangle".to_string())
        })?;
        let bounding_radius = points
            .iter()
            .map(|point| point.length())
            .fold(0.0_f32, f32::max);

        Ok(Self {
            triangles,
            bounds,
            bounding_radius,
        })
    }

    /// A flat square in the XZ plane facing +Y, spanning `half_size` in
    /// each direction
    pub fn plane(half_size: f32) -> Self {
        let s = half_size.abs();
        let corners = [
            Vector3::new(-s, 0.0, -s),
            Vector3::new(s, 0.0, -s),
            Vector3::new(s, 0.0, s),
            Vector3::new(-s, 0.0, s),
        ];
        let triangles = vec![
            Triangle::new(corners[0], corners[2], corners[1]),
            Triangle::new(corners[0], corners[3], corners[2]),
        ];
        let bounds = Aabb::new(corners[0], corners[2]);

        Self {
            triangles,
            bounds,
            bounding_radius: corners[0].length(),
        }
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Bounding box in mesh-local space
    #[inline]
    pub fn local_bounds(&self) -> Aabb {
        self.bounds
    }

    /// Distance from the mesh origin to the furthest vertex
    #[inline]
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }
}
