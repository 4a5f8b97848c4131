//! Sub-object selection: screen-space picking of vertices/edges/faces, drag
//! accumulation, and shortest-path highlighting over the mesh adjacency graph.
//!
//! The selection mode is supplied per call; only the selection contents persist
//! until cleared (by a non-shift click or an explicit `clear`). The order list
//! is kept separately from the sets: path chaining and weld semantics depend on
//! insertion order, which hash sets cannot provide.

use std::collections::{HashMap, HashSet, VecDeque};

use glam::{Mat4, Vec2, Vec3};

use crate::camera::Camera;
use crate::mesh::{EdgeKey, EditableMesh};
use crate::picking::{intersect_mesh, is_facing_camera, point_to_segment_2d};

/// Pixel radius for vertex picking
const VERTEX_PICK_RADIUS: f32 = 15.0;
/// Pixel radius for edge picking
const EDGE_PICK_RADIUS: f32 = 10.0;
/// World units per pixel of vertex drag
const DRAG_SCALE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Vertex,
    Edge,
    Face,
}

/// Stateful selection sets over one mesh's sub-objects
#[derive(Debug, Default)]
pub struct SubObjectSelection {
    selected_vertices: HashSet<u32>,
    selected_edges: HashSet<EdgeKey>,
    selected_faces: HashSet<usize>,
    /// Vertex indices in the order they were selected
    selection_order: Vec<u32>,
    /// Edges connecting consecutively selected vertices via shortest paths
    highlighted_path: Vec<(u32, u32)>,
    /// Skip elements whose world normal faces away from the camera
    pub ignore_backfaces: bool,
    drag_delta: Vec2,
    dragging: bool,
}

impl SubObjectSelection {
    pub fn new() -> Self {
        Self {
            ignore_backfaces: true,
            ..Default::default()
        }
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn vertices(&self) -> &HashSet<u32> {
        &self.selected_vertices
    }

    pub fn edges(&self) -> &HashSet<EdgeKey> {
        &self.selected_edges
    }

    pub fn faces(&self) -> &HashSet<usize> {
        &self.selected_faces
    }

    /// Selected vertices in insertion order
    pub fn order(&self) -> &[u32] {
        &self.selection_order
    }

    pub fn highlighted_path(&self) -> &[(u32, u32)] {
        &self.highlighted_path
    }

    pub fn is_empty(&self) -> bool {
        self.selected_vertices.is_empty()
            && self.selected_edges.is_empty()
            && self.selected_faces.is_empty()
    }

    /// Clear all selection sets, the order list, and the highlighted path
    pub fn clear(&mut self) {
        self.selected_vertices.clear();
        self.selected_edges.clear();
        self.selected_faces.clear();
        self.selection_order.clear();
        self.highlighted_path.clear();
    }

    // ── Picking ──────────────────────────────────────────────

    /// Resolve a click into a selection change for the given mode.
    /// Without shift the previous selection is cleared first.
    #[allow(clippy::too_many_arguments)]
    pub fn on_mouse_down(
        &mut self,
        mesh: &EditableMesh,
        camera: &Camera,
        model: Mat4,
        mouse: Vec2,
        viewport: Vec2,
        shift_held: bool,
        mode: SelectionMode,
    ) {
        if !shift_held {
            self.clear();
        }

        match mode {
            SelectionMode::Vertex => {
                let Some(idx) = self.find_closest_vertex(mesh, camera, model, mouse, viewport)
                else {
                    return;
                };
                if self.selected_vertices.contains(&idx) {
                    self.selected_vertices.remove(&idx);
                    self.selection_order.retain(|&v| v != idx);
                    self.rebuild_highlighted_path(mesh);
                } else {
                    if shift_held {
                        if let Some(&prev) = self.selection_order.last() {
                            self.find_shortest_path(mesh, prev, idx);
                        }
                    }
                    self.selected_vertices.insert(idx);
                    self.selection_order.push(idx);
                    tracing::debug!("selected vertex {idx}");
                }
            }
            SelectionMode::Edge => {
                if let Some(edge) = self.find_closest_edge(mesh, camera, model, mouse, viewport) {
                    if !self.selected_edges.remove(&edge) {
                        self.selected_edges.insert(edge);
                        tracing::debug!("selected edge {edge:?}");
                    }
                }
            }
            SelectionMode::Face => {
                let ray = camera.screen_ray(mouse, viewport);
                let Some(hit) = intersect_mesh(&ray, mesh, model) else {
                    return;
                };
                if self.ignore_backfaces {
                    let normal_world = mesh
                        .face_normal(hit.triangle)
                        .map(|n| model.transform_vector3(n).normalize_or_zero())
                        .unwrap_or(Vec3::ZERO);
                    if !is_facing_camera(normal_world, hit.point - camera.position) {
                        return;
                    }
                }
                if !self.selected_faces.remove(&hit.triangle) {
                    self.selected_faces.insert(hit.triangle);
                    tracing::debug!("selected face {}", hit.triangle);
                }
            }
        }
    }

    /// Nearest projected vertex within the pick radius, or None on a miss
    pub fn find_closest_vertex(
        &self,
        mesh: &EditableMesh,
        camera: &Camera,
        model: Mat4,
        mouse: Vec2,
        viewport: Vec2,
    ) -> Option<u32> {
        let max_dist_sq = VERTEX_PICK_RADIUS * VERTEX_PICK_RADIUS;
        let mut best: Option<(u32, f32)> = None;

        for (i, &v) in mesh.vertices().iter().enumerate() {
            let world = model.transform_point3(v);
            if self.ignore_backfaces {
                if let Some(&n) = mesh.normals().get(i) {
                    let normal_world = model.transform_vector3(n);
                    if normal_world != Vec3::ZERO
                        && !is_facing_camera(normal_world, world - camera.position)
                    {
                        continue;
                    }
                }
            }
            let Some(screen) = camera.world_to_screen(world, viewport) else {
                continue;
            };
            let dist_sq = (screen - mouse).length_squared();
            if dist_sq <= max_dist_sq && best.is_none_or(|(_, d)| dist_sq < d) {
                best = Some((i as u32, dist_sq));
            }
        }

        best.map(|(i, _)| i)
    }

    /// Nearest projected edge within the pick radius, or None on a miss
    fn find_closest_edge(
        &self,
        mesh: &EditableMesh,
        camera: &Camera,
        model: Mat4,
        mouse: Vec2,
        viewport: Vec2,
    ) -> Option<EdgeKey> {
        let mut best: Option<(EdgeKey, f32)> = None;

        for (a, b) in mesh.extract_edges() {
            let (ia, ib) = (a as usize, b as usize);
            if ia >= mesh.vertex_count() || ib >= mesh.vertex_count() {
                continue;
            }
            let wa = model.transform_point3(mesh.vertices()[ia]);
            let wb = model.transform_point3(mesh.vertices()[ib]);

            if self.ignore_backfaces {
                let facing = |idx: usize, world: Vec3| {
                    mesh.normals()
                        .get(idx)
                        .map(|&n| {
                            let nw = model.transform_vector3(n);
                            nw == Vec3::ZERO || is_facing_camera(nw, world - camera.position)
                        })
                        .unwrap_or(true)
                };
                // Cull only when both endpoints face away (silhouette edges stay pickable)
                if !facing(ia, wa) && !facing(ib, wb) {
                    continue;
                }
            }

            let Some(sa) = camera.world_to_screen(wa, viewport) else {
                continue;
            };
            let Some(sb) = camera.world_to_screen(wb, viewport) else {
                continue;
            };

            let dist = point_to_segment_2d(mouse, sa, sb);
            if dist <= EDGE_PICK_RADIUS && best.is_none_or(|(_, d)| dist < d) {
                best = Some(((a, b), dist));
            }
        }

        best.map(|(edge, _)| edge)
    }

    // ── Drag ─────────────────────────────────────────────────

    /// Accumulate a 2D drag delta (applied later by `apply_drag`)
    pub fn on_mouse_drag(&mut self, delta: Vec2) {
        if self.selected_vertices.is_empty() {
            return;
        }
        self.dragging = true;
        self.drag_delta += delta;
    }

    /// Convert the accumulated pixel delta into a mesh-local displacement along
    /// the camera's right/up axes and apply it to every selected vertex.
    pub fn apply_drag(&mut self, mesh: &mut EditableMesh, camera: &Camera, model: Mat4) {
        if self.drag_delta == Vec2::ZERO {
            return;
        }
        // Vertical axis inverted: screen y grows downward
        let world_delta = camera.right() * (self.drag_delta.x * DRAG_SCALE)
            + camera.up() * (-self.drag_delta.y * DRAG_SCALE);
        let local_delta = model.inverse().transform_vector3(world_delta);

        for &idx in &self.selected_vertices {
            if let Some(v) = mesh.vertices_mut().get_mut(idx as usize) {
                *v += local_delta;
            }
        }
        self.drag_delta = Vec2::ZERO;
    }

    /// Finish a drag: recompute normals once and reset drag state
    pub fn on_mouse_release(&mut self, mesh: &mut EditableMesh) {
        if self.dragging {
            mesh.recalculate_normals();
            self.dragging = false;
            self.drag_delta = Vec2::ZERO;
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    // ── Path highlighting ────────────────────────────────────

    /// Breadth-first shortest path from `start` to `end` over the mesh's
    /// implicit adjacency graph (every triangle contributes its three vertex
    /// pairs, both directions). On success the path's (child, parent) edges are
    /// appended to the highlighted path; nothing is appended if unreachable.
    pub fn find_shortest_path(&mut self, mesh: &EditableMesh, start: u32, end: u32) -> bool {
        if start == end {
            return true;
        }

        let mut adjacency: HashMap<u32, Vec<u32>> = HashMap::new();
        for tri_idx in 0..mesh.triangle_count() {
            let Some([i0, i1, i2]) = mesh.triangle_indices(tri_idx) else {
                continue;
            };
            for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            }
        }

        let mut parents: HashMap<u32, u32> = HashMap::new();
        let mut visited: HashSet<u32> = HashSet::from([start]);
        let mut queue: VecDeque<u32> = VecDeque::from([start]);

        'search: while let Some(current) = queue.pop_front() {
            let Some(neighbors) = adjacency.get(&current) else {
                continue;
            };
            for &next in neighbors {
                if visited.insert(next) {
                    parents.insert(next, current);
                    if next == end {
                        break 'search;
                    }
                    queue.push_back(next);
                }
            }
        }

        if !parents.contains_key(&end) {
            return false;
        }

        // Walk parent pointers back from the end
        let mut current = end;
        while current != start {
            let parent = parents[&current];
            self.highlighted_path.push((current, parent));
            current = parent;
        }
        true
    }

    /// Re-run shortest-path search between every consecutive pair of the
    /// remaining ordered selection (after a vertex was deselected)
    fn rebuild_highlighted_path(&mut self, mesh: &EditableMesh) {
        self.highlighted_path.clear();
        let order = self.selection_order.clone();
        for pair in order.windows(2) {
            self.find_shortest_path(mesh, pair[0], pair[1]);
        }
    }
}
