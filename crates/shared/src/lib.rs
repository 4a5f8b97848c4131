use serde::{Deserialize, Serialize};

/// Brush mode for sculpt tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushMode {
    Push,
    Pull,
    Smooth,
    Grab,
}

/// Persisted mesh sub-block of an object record.
///
/// Both keys are optional on load: a record lacking either one deserializes to
/// an empty mesh. Normals are never persisted — they are recomputed after load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshRecord {
    #[serde(default)]
    pub sculpt_vertices: Vec<[f32; 3]>,
    #[serde(default)]
    pub sculpt_indices: Vec<u32>,
}

impl MeshRecord {
    pub fn is_empty(&self) -> bool {
        self.sculpt_vertices.is_empty() && self.sculpt_indices.is_empty()
    }
}
