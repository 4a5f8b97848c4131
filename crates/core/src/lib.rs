// Library crate: the mesh-editing and sculpting core.
// Rendering, input plumbing, and UI panels are external collaborators; this
// crate only consumes camera matrices + screen coordinates and mutates meshes.

pub mod camera;
pub mod curve;
pub mod editor;
pub mod mesh;
pub mod picking;
pub mod sculpt;
pub mod selection;

pub use camera::Camera;
pub use curve::Curve;
pub use editor::MeshEditor;
pub use mesh::EditableMesh;
pub use picking::{MeshHit, Ray};
pub use sculpt::{BrushSettings, SculptTool};
pub use selection::{SelectionMode, SubObjectSelection};
