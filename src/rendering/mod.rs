/// Software rendering pipeline
/// Visibility, rasterization and compositing into camera buffers
pub mod composite;
pub mod culling;
pub mod depth;
pub mod framebuffer;
pub mod pipeline;
pub mod rasterizer;
pub mod texture;

pub use composite::{Fog, FogMode};
pub use depth::{decode_depth, encode_depth, DEPTH_PRECISION};
pub use framebuffer::{Image, RenderTargets};
pub use pipeline::{RenderPair, Renderer, SceneSettings};
pub use rasterizer::{Fragment, RasterVertex};
pub use texture::{default_texture, Texture, WrapMode};
