/// Surface description shared by every triangle of a mesh part
use std::fmt;
use std::sync::Arc;

use glam::{Vec4, Vec4Swizzles};

use crate::rendering::rasterizer::Fragment;
use crate::rendering::texture::{default_texture, Texture};

/// Which compositing sub-pass a part uses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TransparencyMode {
    #[default]
    Opaque,
    /// Texture alpha discards fragments below [`Material::alpha_clip_threshold`].
    AlphaClip,
    /// Blended; never written to the persistent depth buffer.
    Transparent,
    /// Transparent only when the material or model colour is translucent.
    Auto,
}

/// Per-vertex hook applied to the screen-space position `(x, y, z, w)` right
/// after projection.
pub type ClipProgram = Arc<dyn Fn(Vec4) -> Vec4 + Send + Sync>;

/// Replacement for the default textured colour draw. Returns a straight-alpha
/// colour, or `None` to discard the fragment.
pub type FragmentProgram = Arc<dyn Fn(&Fragment, &Texture) -> Option<Vec4> + Send + Sync>;

#[derive(Clone)]
pub struct Material {
    pub name: String,
    /// Multiplied into every fragment.
    pub color: Vec4,
    /// `None` samples the 1x1 white default.
    pub texture: Option<Arc<Texture>>,
    pub transparency: TransparencyMode,
    pub backface_culling: bool,
    /// Skips the lighting pass.
    pub shadeless: bool,
    pub alpha_clip_threshold: f32,
    pub clip_program: Option<ClipProgram>,
    pub fragment_program: Option<FragmentProgram>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            color: Vec4::ONE,
            texture: None,
            transparency: TransparencyMode::Opaque,
            backface_culling: true,
            shadeless: false,
            alpha_clip_threshold: 0.5,
            clip_program: None,
            fragment_program: None,
        }
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("color", &self.color)
            .field("texture", &self.texture.as_ref().map(|t| (t.width, t.height)))
            .field("transparency", &self.transparency)
            .field("backface_culling", &self.backface_culling)
            .field("shadeless", &self.shadeless)
            .field("alpha_clip_threshold", &self.alpha_clip_threshold)
            .field("clip_program", &self.clip_program.is_some())
            .field("fragment_program", &self.fragment_program.is_some())
            .finish()
    }
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_transparency(mut self, mode: TransparencyMode) -> Self {
        self.transparency = mode;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    /// The texture to sample, falling back to opaque white.
    #[inline]
    pub fn texture(&self) -> &Texture {
        self.texture.as_deref().unwrap_or_else(|| default_texture())
    }

    /// Resolve `Auto` against the material and model colour alpha.
    pub fn effective_transparency(&self, model_color: Vec4) -> TransparencyMode {
        match self.transparency {
            TransparencyMode::Auto if self.color.w < 1.0 || model_color.w < 1.0 => {
                TransparencyMode::Transparent
            }
            TransparencyMode::Auto => TransparencyMode::Opaque,
            mode => mode,
        }
    }

    /// Straight-alpha base colour with the model tint applied.
    #[inline]
    pub fn tint(&self, model_color: Vec4) -> Vec4 {
        (self.color.xyz() * model_color.xyz()).extend(self.color.w * model_color.w)
    }
}

/// Material used by parts that carry none: opaque, culled, white.
pub fn default_material() -> &'static Material {
    &DEFAULT_MATERIAL
}

lazy_static::lazy_static! {
    static ref DEFAULT_MATERIAL: Material = Material::default();
}
