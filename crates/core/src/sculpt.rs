//! Brush-driven continuous deformation tools.
//!
//! The tool set is fixed and small, so the tools are a closed enum behind one
//! `apply` contract rather than an open trait hierarchy. Every tool affects
//! vertices within the brush radius of the hit point, weighted by the falloff
//! profile, and is stateless per call. A zero mouse delta never touches the
//! vertex array, so drag-cancel is exact and idempotent.

use glam::{Vec2, Vec3};
use shared::BrushMode;

use crate::camera::Camera;
use crate::curve::Curve;
use crate::mesh::EditableMesh;

/// Per-vertex displacement scale for push/pull and smooth
const DISPLACE_SCALE: f32 = 0.1;
/// World displacement scale for grab
const GRAB_SCALE: f32 = 0.2;
/// Smooth averages neighbors within this fraction of the brush radius
const SMOOTH_NEIGHBORHOOD: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct BrushSettings {
    /// Brush radius in world units (> 0)
    pub radius: f32,
    /// Brush strength, roughly [0, 1]
    pub strength: f32,
    pub mode: BrushMode,
    pub falloff: Curve,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            radius: 1.0,
            strength: 0.5,
            mode: BrushMode::Push,
            falloff: Curve::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SculptTool {
    PushPull,
    Smooth,
    Grab,
}

impl SculptTool {
    /// Apply one brush step at `hit_point`. Vertices within the brush radius
    /// are displaced; normals are recomputed afterwards.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        mesh: &mut EditableMesh,
        hit_point: Vec3,
        ray_direction: Vec3,
        mouse_delta: Vec2,
        settings: &BrushSettings,
        camera: &Camera,
        viewport: Vec2,
    ) {
        if mouse_delta == Vec2::ZERO || settings.radius <= 0.0 {
            return;
        }

        match self {
            SculptTool::PushPull => push_pull(mesh, hit_point, ray_direction, settings),
            SculptTool::Smooth => smooth(mesh, hit_point, settings),
            SculptTool::Grab => grab(mesh, hit_point, mouse_delta, settings, camera, viewport),
        }

        mesh.recalculate_normals();
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Displace vertices along their normals, toward or away from the surface
fn push_pull(mesh: &mut EditableMesh, hit_point: Vec3, ray_direction: Vec3, settings: &BrushSettings) {
    let radius_sq = settings.radius * settings.radius;
    let sign = if settings.mode == BrushMode::Pull {
        1.0
    } else {
        -1.0
    };

    let normals = mesh.normals().to_vec();
    for (i, v) in mesh.vertices_mut().iter_mut().enumerate() {
        let dist_sq = (*v - hit_point).length_squared();
        if dist_sq > radius_sq {
            continue;
        }
        let falloff = smoothstep(1.0 - dist_sq / radius_sq);
        // Degenerate vertices have no normal; push them opposite the view ray
        let direction = match normals.get(i) {
            Some(&n) if n != Vec3::ZERO => n,
            _ => -ray_direction.normalize_or_zero(),
        };
        *v += direction * (sign * settings.strength * falloff * DISPLACE_SCALE);
    }
}

/// Relax vertices toward the average of their nearby pre-pass positions.
/// All averages are taken against a snapshot and committed at once, so the
/// result does not depend on vertex iteration order within one call.
fn smooth(mesh: &mut EditableMesh, hit_point: Vec3, settings: &BrushSettings) {
    let snapshot = mesh.vertices().to_vec();
    let neighborhood_sq =
        (settings.radius * SMOOTH_NEIGHBORHOOD) * (settings.radius * SMOOTH_NEIGHBORHOOD);

    let mut result = snapshot.clone();
    for (i, &v) in snapshot.iter().enumerate() {
        let dist = (v - hit_point).length();
        if dist > settings.radius {
            continue;
        }
        let falloff = settings.falloff.evaluate(dist / settings.radius);

        let mut sum = Vec3::ZERO;
        let mut count = 0u32;
        for (j, &other) in snapshot.iter().enumerate() {
            if j != i && (other - v).length_squared() <= neighborhood_sq {
                sum += other;
                count += 1;
            }
        }
        if count > 0 {
            let average = sum / count as f32;
            result[i] = v.lerp(average, settings.strength * DISPLACE_SCALE * falloff);
        }
    }

    mesh.vertices_mut().copy_from_slice(&result);
}

/// Pull vertices along the screen-space drag, unprojected at the hit depth
fn grab(
    mesh: &mut EditableMesh,
    hit_point: Vec3,
    mouse_delta: Vec2,
    settings: &BrushSettings,
    camera: &Camera,
    viewport: Vec2,
) {
    let Some((screen, depth)) = camera.world_to_screen_depth(hit_point, viewport) else {
        return;
    };
    let before = camera.screen_to_world_point(screen, depth, viewport);
    let after = camera.screen_to_world_point(screen + mouse_delta, depth, viewport);
    let displacement = (after - before) * (settings.strength * GRAB_SCALE);

    for v in mesh.vertices_mut().iter_mut() {
        let dist = (*v - hit_point).length();
        if dist > settings.radius {
            continue;
        }
        let falloff = settings.falloff.evaluate(dist / settings.radius);
        *v += displacement * falloff;
    }
}
