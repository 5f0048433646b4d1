/// tri_engine - CPU triangle render pipeline
/// Transform, cull, light, rasterize and composite meshes into camera buffers
pub mod camera;
pub mod error;
pub mod lighting;
pub mod perf;
pub mod rendering;
pub mod scene;

pub use camera::{Camera, CameraController, Projection};
pub use error::{RenderError, RenderResult};
pub use lighting::{AmbientLight, DirectionalLight, Light, LightDescriptor, LightSource, PointLight};
pub use perf::{CounterSnapshot, FrameMetrics, PIPELINE_COUNTERS};
pub use rendering::{
    decode_depth, encode_depth, Fog, FogMode, Image, RenderPair, RenderTargets, Renderer,
    SceneSettings, Texture,
};
pub use scene::{Material, Mesh, MeshPart, Model, TransparencyMode, Vertex, MAX_TRIANGLES_PER_PART};
