use glam::{Mat4, Vec3};

use crate::mesh::EditableMesh;

const EPSILON: f32 = 1e-6;

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Result of casting a ray at a mesh
#[derive(Debug, Clone, Copy)]
pub struct MeshHit {
    /// Distance from ray origin to hit point
    pub distance: f32,
    /// Hit point in world space
    pub point: Vec3,
    /// Index of the hit triangle (into mesh.indices / 3), for face picking
    pub triangle: usize,
}

/// Möller-Trumbore ray-triangle intersection.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    // Outside triangle (u)
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    // Outside triangle (v)
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Find the nearest triangle in a mesh intersected by a world-space ray.
///
/// The ray is transformed into mesh-local space via the inverse model matrix
/// (direction renormalized), so the test works under translated/rotated/scaled
/// meshes. The returned distance and point are in world space. Triangles with
/// out-of-range indices are skipped.
pub fn intersect_mesh(ray: &Ray, mesh: &EditableMesh, model: Mat4) -> Option<MeshHit> {
    let inv_model = model.inverse();
    let local_origin = inv_model.transform_point3(ray.origin);
    let local_direction = inv_model
        .transform_vector3(ray.direction)
        .normalize_or_zero();
    if local_direction == Vec3::ZERO {
        return None;
    }
    let local_ray = Ray {
        origin: local_origin,
        direction: local_direction,
    };

    let vertices = mesh.vertices();
    let indices = mesh.indices();
    let tri_count = indices.len() / 3;

    let mut best: Option<(f32, usize)> = None;

    for tri_idx in 0..tri_count {
        let i0 = indices[tri_idx * 3] as usize;
        let i1 = indices[tri_idx * 3 + 1] as usize;
        let i2 = indices[tri_idx * 3 + 2] as usize;
        if i0 >= vertices.len() || i1 >= vertices.len() || i2 >= vertices.len() {
            continue;
        }

        if let Some(t) = ray_triangle_intersect(&local_ray, vertices[i0], vertices[i1], vertices[i2])
        {
            if best.is_none_or(|(bt, _)| t < bt) {
                best = Some((t, tri_idx));
            }
        }
    }

    best.map(|(t, triangle)| {
        let local_point = local_ray.origin + local_ray.direction * t;
        let point = model.transform_point3(local_point);
        MeshHit {
            distance: (point - ray.origin).length(),
            point,
            triangle,
        }
    })
}

/// Back-face predicate shared by vertex, edge, and face picking.
/// `view_dir` points from the camera toward the element.
pub fn is_facing_camera(normal_world: Vec3, view_dir: Vec3) -> bool {
    normal_world.dot(view_dir) < 0.0
}

/// Distance from a 2D point to a 2D line segment
pub fn point_to_segment_2d(point: glam::Vec2, p0: glam::Vec2, p1: glam::Vec2) -> f32 {
    let seg = p1 - p0;
    let len_sq = seg.length_squared();

    if len_sq < 1e-8 {
        return (point - p0).length();
    }

    let t = ((point - p0).dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (p0 + seg * t)).length()
}
