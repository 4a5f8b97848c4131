//! CPU-side editable mesh: vertex/index/normal buffers plus topology mutations.
//!
//! Normals are always derived (never imported); any edit that changes geometry
//! ends with a normal recomputation so downstream renderers read a consistent
//! mesh. Triangles whose indices fall outside the vertex array (malformed
//! imports) are skipped, never read out of bounds.

use std::collections::HashSet;

use glam::Vec3;
use shared::MeshRecord;

/// Unordered mesh edge, canonicalized as (min, max) vertex indices
pub type EdgeKey = (u32, u32);

/// Canonicalize an edge as a (min, max) index pair
pub fn edge_key(a: u32, b: u32) -> EdgeKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditableMesh {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    normals: Vec<Vec3>,
}

impl EditableMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw buffers; normals are computed immediately
    pub fn from_buffers(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let mut mesh = Self {
            vertices,
            indices,
            normals: Vec::new(),
        };
        mesh.recalculate_normals();
        mesh
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut Vec<Vec3> {
        &mut self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn indices_mut(&mut self) -> &mut Vec<u32> {
        &mut self.indices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex indices of a triangle, or None if out of range
    pub fn triangle_indices(&self, tri_idx: usize) -> Option<[u32; 3]> {
        if tri_idx * 3 + 2 < self.indices.len() {
            Some([
                self.indices[tri_idx * 3],
                self.indices[tri_idx * 3 + 1],
                self.indices[tri_idx * 3 + 2],
            ])
        } else {
            None
        }
    }

    /// Unnormalized face normal of a triangle; None if any index is out of range
    pub fn face_normal(&self, tri_idx: usize) -> Option<Vec3> {
        let [i0, i1, i2] = self.triangle_indices(tri_idx)?;
        let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
        if i0 >= self.vertices.len() || i1 >= self.vertices.len() || i2 >= self.vertices.len() {
            return None;
        }
        let edge1 = self.vertices[i1] - self.vertices[i0];
        let edge2 = self.vertices[i2] - self.vertices[i0];
        Some(edge1.cross(edge2))
    }

    /// Unique undirected edges of the mesh, canonicalized as (min, max) pairs
    pub fn extract_edges(&self) -> Vec<EdgeKey> {
        let mut seen: HashSet<EdgeKey> = HashSet::new();
        let mut edges = Vec::new();
        for tri_idx in 0..self.triangle_count() {
            let [i0, i1, i2] = self.triangle_indices(tri_idx).unwrap_or_default();
            for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
                let key = edge_key(a, b);
                if seen.insert(key) {
                    edges.push(key);
                }
            }
        }
        edges
    }

    // ── Normals ──────────────────────────────────────────────

    /// Recompute per-vertex normals from triangle geometry.
    ///
    /// Triangles referencing out-of-range vertices are skipped. Vertices with
    /// no valid adjacent face (or only degenerate ones) keep a zero normal,
    /// never NaN.
    pub fn recalculate_normals(&mut self) {
        if self.normals.len() != self.vertices.len() {
            self.normals.resize(self.vertices.len(), Vec3::ZERO);
        }
        for n in &mut self.normals {
            *n = Vec3::ZERO;
        }

        let mut skipped = 0usize;
        for tri_idx in 0..self.triangle_count() {
            let i0 = self.indices[tri_idx * 3] as usize;
            let i1 = self.indices[tri_idx * 3 + 1] as usize;
            let i2 = self.indices[tri_idx * 3 + 2] as usize;
            if i0 >= self.vertices.len() || i1 >= self.vertices.len() || i2 >= self.vertices.len() {
                skipped += 1;
                continue;
            }

            let edge1 = self.vertices[i1] - self.vertices[i0];
            let edge2 = self.vertices[i2] - self.vertices[i0];
            let face_normal = edge1.cross(edge2);

            self.normals[i0] += face_normal;
            self.normals[i1] += face_normal;
            self.normals[i2] += face_normal;
        }

        if skipped > 0 {
            tracing::warn!("skipped {skipped} triangles with out-of-range indices");
        }

        for n in &mut self.normals {
            *n = n.normalize_or_zero();
        }
    }

    // ── Topology mutations ───────────────────────────────────

    /// Extrude the given faces along their normals by `distance`.
    ///
    /// Each face gets 3 new vertices and becomes the cap; 2 side-wall triangles
    /// per original edge keep the shell closed (+3 vertices, +18 indices per
    /// face). Returns false (mutating nothing) on an empty set.
    pub fn extrude_faces(&mut self, faces: &HashSet<usize>, distance: f32) -> bool {
        if faces.is_empty() {
            return false;
        }

        // Deterministic vertex append order
        let mut sorted: Vec<usize> = faces.iter().copied().collect();
        sorted.sort_unstable();

        for face in sorted {
            let Some([i0, i1, i2]) = self.triangle_indices(face) else {
                continue;
            };
            let Some(normal) = self.face_normal(face) else {
                continue;
            };
            let offset = normal.normalize_or_zero() * distance;

            let old = [i0, i1, i2];
            let base = self.vertices.len() as u32;
            for &idx in &old {
                let v = self.vertices[idx as usize] + offset;
                self.vertices.push(v);
            }

            // The face itself becomes the cap
            self.indices[face * 3] = base;
            self.indices[face * 3 + 1] = base + 1;
            self.indices[face * 3 + 2] = base + 2;

            // Side walls: one quad (two triangles) per original edge
            for k in 0..3u32 {
                let old_a = old[k as usize];
                let old_b = old[(k as usize + 1) % 3];
                let new_a = base + k;
                let new_b = base + (k + 1) % 3;
                self.indices
                    .extend_from_slice(&[old_a, old_b, new_b, old_a, new_b, new_a]);
            }
        }

        self.recalculate_normals();
        true
    }

    /// Weld the given vertices into one.
    ///
    /// The first vertex in `selection` is retained and moved to `weld_point`;
    /// every index reference to the others is remapped onto it. Welded-away
    /// vertex slots stay in place (no compaction) — only topology merges.
    /// Returns false on fewer than 2 vertices.
    pub fn weld_vertices(&mut self, selection: &[u32], weld_point: Vec3) -> bool {
        if selection.len() < 2 {
            return false;
        }
        let target = selection[0];
        if target as usize >= self.vertices.len() {
            return false;
        }

        let welded: HashSet<u32> = selection[1..].iter().copied().collect();
        self.vertices[target as usize] = weld_point;
        for idx in &mut self.indices {
            if welded.contains(idx) {
                *idx = target;
            }
        }

        self.recalculate_normals();
        true
    }

    /// Bevel the given edges by `amount`.
    ///
    /// For each edge, two new vertices are offset along the averaged adjacent
    /// face normal; the touching faces are re-pointed at them and a two-triangle
    /// band closes the gap, producing a narrow inset strip. Returns false on an
    /// empty set.
    pub fn bevel_edges(&mut self, edges: &HashSet<EdgeKey>, amount: f32) -> bool {
        if edges.is_empty() {
            return false;
        }

        let mut sorted: Vec<EdgeKey> = edges.iter().copied().collect();
        sorted.sort_unstable();

        for (a, b) in sorted {
            if a as usize >= self.vertices.len() || b as usize >= self.vertices.len() {
                continue;
            }

            // Faces currently touching the edge, and their averaged normal
            let mut adjacent = Vec::new();
            let mut normal_sum = Vec3::ZERO;
            for tri_idx in 0..self.triangle_count() {
                let Some(tri) = self.triangle_indices(tri_idx) else {
                    continue;
                };
                if tri.contains(&a) && tri.contains(&b) {
                    if let Some(n) = self.face_normal(tri_idx) {
                        normal_sum += n.normalize_or_zero();
                    }
                    adjacent.push(tri_idx);
                }
            }
            if adjacent.is_empty() {
                continue;
            }
            let offset = normal_sum.normalize_or_zero() * amount;

            let new_a = self.vertices.len() as u32;
            let new_b = new_a + 1;
            let pos_a = self.vertices[a as usize];
            let pos_b = self.vertices[b as usize];
            self.vertices.push(pos_a + offset);
            self.vertices.push(pos_b + offset);

            // Splice the new vertices into the touching faces
            for tri_idx in adjacent {
                for k in 0..3 {
                    let slot = &mut self.indices[tri_idx * 3 + k];
                    if *slot == a {
                        *slot = new_a;
                    } else if *slot == b {
                        *slot = new_b;
                    }
                }
            }

            // Band between the original edge and the lifted copy
            self.indices
                .extend_from_slice(&[a, b, new_b, a, new_b, new_a]);
        }

        self.recalculate_normals();
        true
    }

    // ── Persistence ──────────────────────────────────────────

    /// Load from a persisted record; normals are recomputed, never deserialized
    pub fn from_record(record: &MeshRecord) -> Self {
        let vertices = record
            .sculpt_vertices
            .iter()
            .map(|&[x, y, z]| Vec3::new(x, y, z))
            .collect();
        Self::from_buffers(vertices, record.sculpt_indices.clone())
    }

    pub fn to_record(&self) -> MeshRecord {
        MeshRecord {
            sculpt_vertices: self.vertices.iter().map(|v| [v.x, v.y, v.z]).collect(),
            sculpt_indices: self.indices.clone(),
        }
    }

    // ── Primitives ───────────────────────────────────────────

    /// Single right triangle in the XY plane, normal +Z
    pub fn triangle() -> Self {
        Self::from_buffers(
            vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            vec![0, 1, 2],
        )
    }

    /// Unit quad in the XY plane (two triangles, shared diagonal), normal +Z
    pub fn quad(size: f32) -> Self {
        let h = size * 0.5;
        Self::from_buffers(
            vec![
                Vec3::new(-h, -h, 0.0),
                Vec3::new(h, -h, 0.0),
                Vec3::new(h, h, 0.0),
                Vec3::new(-h, h, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    /// Axis-aligned cube with shared corner vertices (8 vertices, 12 triangles)
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let vertices = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        let indices = vec![
            4, 5, 6, 4, 6, 7, // front (+Z)
            1, 0, 3, 1, 3, 2, // back (-Z)
            5, 1, 2, 5, 2, 6, // right (+X)
            0, 4, 7, 0, 7, 3, // left (-X)
            7, 6, 2, 7, 2, 3, // top (+Y)
            0, 1, 5, 0, 5, 4, // bottom (-Y)
        ];
        Self::from_buffers(vertices, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normals_length_matches_vertices() {
        let mut mesh = EditableMesh::cube(1.0);
        assert_eq!(mesh.normals().len(), mesh.vertex_count());

        mesh.vertices_mut().push(Vec3::new(5.0, 5.0, 5.0));
        mesh.recalculate_normals();
        assert_eq!(mesh.normals().len(), mesh.vertex_count());
    }

    #[test]
    fn test_disconnected_vertex_gets_zero_normal() {
        let mut mesh = EditableMesh::triangle();
        mesh.vertices_mut().push(Vec3::new(5.0, 5.0, 5.0));
        mesh.recalculate_normals();
        assert_eq!(mesh.normals()[3], Vec3::ZERO);
        assert!(mesh.normals().iter().all(|n| n.is_finite()));
    }

    #[test]
    fn test_out_of_range_triangle_skipped() {
        let mut mesh = EditableMesh::triangle();
        mesh.indices_mut().extend_from_slice(&[0, 1, 99]);
        mesh.recalculate_normals();
        // Valid triangle still contributes; no panic, no NaN
        assert!(mesh.normals()[0].abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_degenerate_triangle_yields_zero_normal() {
        let mesh = EditableMesh::from_buffers(
            vec![Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)],
            vec![0, 1, 2],
        );
        for n in mesh.normals() {
            assert_eq!(*n, Vec3::ZERO);
            assert!(n.is_finite());
        }
    }

    #[test]
    fn test_triangle_normals_point_up() {
        let mesh = EditableMesh::triangle();
        for n in mesh.normals() {
            assert!(n.abs_diff_eq(Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn test_extrude_empty_is_noop() {
        let mut mesh = EditableMesh::triangle();
        let (vc, ic) = (mesh.vertex_count(), mesh.indices().len());
        assert!(!mesh.extrude_faces(&HashSet::new(), 1.0));
        assert_eq!(mesh.vertex_count(), vc);
        assert_eq!(mesh.indices().len(), ic);
    }

    #[test]
    fn test_extrude_single_face_counts() {
        let mut mesh = EditableMesh::triangle();
        assert!(mesh.extrude_faces(&HashSet::from([0]), 0.5));
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices().len(), 3 + 18);
        assert_eq!(mesh.normals().len(), mesh.vertex_count());
    }

    #[test]
    fn test_extrude_offsets_cap_along_normal() {
        let mut mesh = EditableMesh::triangle();
        assert!(mesh.extrude_faces(&HashSet::from([0]), 0.5));
        // Cap vertices sit 0.5 above the originals along +Z
        for i in 0..3 {
            let lifted = mesh.vertices()[i + 3];
            let original = mesh.vertices()[i];
            assert!((lifted - original).abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), 1e-6));
        }
        // Cap triangle references only the new ring
        let cap = mesh.triangle_indices(0).unwrap();
        assert!(cap.iter().all(|&i| i >= 3));
    }

    #[test]
    fn test_extrude_two_faces() {
        let mut mesh = EditableMesh::quad(2.0);
        let (vc, ic) = (mesh.vertex_count(), mesh.indices().len());
        assert!(mesh.extrude_faces(&HashSet::from([0, 1]), 0.25));
        assert_eq!(mesh.vertex_count(), vc + 6);
        assert_eq!(mesh.indices().len(), ic + 36);
    }

    #[test]
    fn test_weld_single_vertex_fails() {
        let mut mesh = EditableMesh::triangle();
        let before = mesh.vertices().to_vec();
        assert!(!mesh.weld_vertices(&[1], Vec3::ONE));
        assert_eq!(mesh.vertices(), &before[..]);
    }

    #[test]
    fn test_weld_remaps_indices_to_target() {
        let mut mesh = EditableMesh::quad(2.0);
        assert!(mesh.weld_vertices(&[1, 2], Vec3::new(0.5, 0.5, 0.0)));
        assert_eq!(mesh.vertices()[1], Vec3::new(0.5, 0.5, 0.0));
        assert!(!mesh.indices().contains(&2));
        // Slot 2 still exists; storage is not compacted
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn test_weld_retains_first_selected() {
        let mut mesh = EditableMesh::quad(2.0);
        assert!(mesh.weld_vertices(&[3, 0, 1], Vec3::ZERO));
        assert!(!mesh.indices().contains(&0));
        assert!(!mesh.indices().contains(&1));
        assert_eq!(mesh.vertices()[3], Vec3::ZERO);
    }

    #[test]
    fn test_bevel_empty_is_noop() {
        let mut mesh = EditableMesh::cube(1.0);
        let (vc, ic) = (mesh.vertex_count(), mesh.indices().len());
        assert!(!mesh.bevel_edges(&HashSet::new(), 0.1));
        assert_eq!(mesh.vertex_count(), vc);
        assert_eq!(mesh.indices().len(), ic);
    }

    #[test]
    fn test_bevel_single_edge_adds_band() {
        let mut mesh = EditableMesh::quad(2.0);
        // Shared diagonal of the quad
        let edge = edge_key(0, 2);
        let (vc, ic) = (mesh.vertex_count(), mesh.indices().len());
        assert!(mesh.bevel_edges(&HashSet::from([edge]), 0.1));
        assert_eq!(mesh.vertex_count(), vc + 2);
        assert_eq!(mesh.indices().len(), ic + 6);
        // Touching faces no longer reference the original edge pair together
        for tri_idx in 0..2 {
            let tri = mesh.triangle_indices(tri_idx).unwrap();
            assert!(!(tri.contains(&0) && tri.contains(&2)));
        }
    }

    #[test]
    fn test_extract_edges_unique() {
        let mesh = EditableMesh::quad(2.0);
        let edges = mesh.extract_edges();
        // 4 boundary edges + 1 shared diagonal
        assert_eq!(edges.len(), 5);
        assert!(edges.contains(&edge_key(0, 2)));
        for &(a, b) in &edges {
            assert!(a < b);
        }
    }

    #[test]
    fn test_record_roundtrip() {
        let mesh = EditableMesh::cube(2.0);
        let record = mesh.to_record();
        let back = EditableMesh::from_record(&record);
        assert_eq!(mesh.vertices(), back.vertices());
        assert_eq!(mesh.indices(), back.indices());
        assert_eq!(mesh.normals(), back.normals());
    }

    #[test]
    fn test_empty_record_yields_empty_mesh() {
        let mesh = EditableMesh::from_record(&MeshRecord::default());
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.indices().is_empty());
        assert!(mesh.normals().is_empty());
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let mesh = EditableMesh::cube(2.0);
        for (v, n) in mesh.vertices().iter().zip(mesh.normals()) {
            // Corner normals of a shared-vertex cube point away from the center
            assert!(v.normalize().dot(*n) > 0.5);
        }
    }
}
