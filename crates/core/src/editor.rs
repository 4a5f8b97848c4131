//! Selection-driven mesh edits: the glue between `SubObjectSelection` and the
//! topology operations on `EditableMesh`. Precondition failures (empty
//! selection, too few vertices to weld) return false and mutate nothing.

use glam::Vec3;

use crate::mesh::EditableMesh;
use crate::selection::SubObjectSelection;

pub struct MeshEditor;

impl MeshEditor {
    /// Extrude every selected face along its normal
    pub fn extrude_selected(
        mesh: &mut EditableMesh,
        selection: &SubObjectSelection,
        distance: f32,
    ) -> bool {
        let ok = mesh.extrude_faces(selection.faces(), distance);
        if ok {
            tracing::debug!(
                "extruded {} faces by {distance}",
                selection.faces().len()
            );
        }
        ok
    }

    /// Weld the selected vertices to `weld_point`. The first-selected vertex
    /// is retained; the order list provides that ordering.
    pub fn weld_selected(
        mesh: &mut EditableMesh,
        selection: &SubObjectSelection,
        weld_point: Vec3,
    ) -> bool {
        let ok = mesh.weld_vertices(selection.order(), weld_point);
        if ok {
            tracing::debug!("welded {} vertices", selection.order().len());
        }
        ok
    }

    /// Bevel every selected edge
    pub fn bevel_selected(
        mesh: &mut EditableMesh,
        selection: &SubObjectSelection,
        amount: f32,
    ) -> bool {
        mesh.bevel_edges(selection.edges(), amount)
    }

    /// Move every selected vertex along its own normal by `amount`
    pub fn move_along_normal(
        mesh: &mut EditableMesh,
        selection: &SubObjectSelection,
        amount: f32,
    ) -> bool {
        if selection.vertices().is_empty() {
            return false;
        }
        let offsets: Vec<(usize, Vec3)> = selection
            .vertices()
            .iter()
            .filter_map(|&idx| {
                let i = idx as usize;
                mesh.normals().get(i).map(|&n| (i, n * amount))
            })
            .collect();
        for (i, offset) in offsets {
            mesh.vertices_mut()[i] += offset;
        }
        mesh.recalculate_normals();
        true
    }
}
