/// Scene data consumed by the pipeline: meshes, materials and models.
/// Hierarchy and asset loading live outside the crate; models arrive here
/// with their world transforms already resolved.
pub mod material;
pub mod mesh;
pub mod model;
pub mod primitives;

pub use material::{default_material, ClipProgram, FragmentProgram, Material, TransparencyMode};
pub use mesh::{Mesh, MeshPart, Triangle, Vertex, MAX_TRIANGLES_PER_PART};
pub use model::{BoundingSphere, Model};
