/// Per-frame render orchestration
///
/// `Renderer::render` runs one complete frame: gather lights, partition parts
/// into solid and transparent queues, then for every part transform, cull,
/// light, rasterize and composite into the camera's buffers.
use std::time::Instant;

use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

use super::composite::{composite_color, composite_depth, Fog};
use super::culling;
use super::depth::{closer_wins, decode_depth, encode_depth, is_unwritten, DEPTH_PRECISION};
use super::framebuffer::{blend_over, premultiply, RenderTargets};
use super::rasterizer::{draw_triangles, Fragment, RasterVertex};
use crate::camera::{clip_to_viewport, round_to_pixel, Camera};
use crate::{count_call, perf_scope};
use crate::error::{RenderError, RenderResult};
use crate::lighting::{Light, LightSource};
use crate::perf::{PerfTimer, PIPELINE_COUNTERS};
use crate::scene::{
    default_material, Material, MeshPart, Model, TransparencyMode, MAX_TRIANGLES_PER_PART,
};

/// Scene-wide render settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneSettings {
    pub lighting: bool,
    pub fog: Fog,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            lighting: true,
            fog: Fog::default(),
        }
    }
}

/// One draw: a model and the index of one of its mesh parts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderPair {
    pub model: usize,
    pub part: usize,
}

/// Accepted triangles of the part being drawn.
struct PartBatch {
    /// Three per accepted triangle.
    vertices: Vec<RasterVertex>,
    /// Index of each accepted triangle within its part.
    triangles: Vec<usize>,
}

impl PartBatch {
    fn with_capacity(triangles: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(triangles * 3),
            triangles: Vec::with_capacity(triangles),
        }
    }

    fn clear(&mut self) {
        self.vertices.clear();
        self.triangles.clear();
    }
}

/// Frame renderer. Holds only scratch storage reused between frames; all
/// output goes to the camera.
pub struct Renderer {
    solids: Vec<RenderPair>,
    transparents: Vec<RenderPair>,
    active_lights: Vec<usize>,
    batch: PartBatch,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            solids: Vec::new(),
            transparents: Vec::new(),
            active_lights: Vec::new(),
            batch: PartBatch::with_capacity(MAX_TRIANGLES_PER_PART),
        }
    }

    /// Solid draw order of the last frame.
    pub fn solid_order(&self) -> &[RenderPair] {
        &self.solids
    }

    /// Transparent draw order of the last frame, farthest first.
    pub fn transparent_order(&self) -> &[RenderPair] {
        &self.transparents
    }

    /// Render `models` into `camera`'s buffers. The buffers are not cleared
    /// here; call [`Camera::clear`] between frames.
    ///
    /// Fails only when a part exceeds [`MAX_TRIANGLES_PER_PART`] accepted
    /// triangles, in which case the frame stops at that part.
    pub fn render(
        &mut self,
        settings: &SceneSettings,
        lights: &mut [Light],
        camera: &mut Camera,
        models: &mut [Model],
    ) -> RenderResult<()> {
        let frame = PerfTimer::new("frame");
        count_call!(PIPELINE_COUNTERS.render_calls);
        camera.metrics.reset();

        if !(camera.far > camera.near) {
            log::debug!(
                "skipping frame: far plane {} is not beyond near plane {}",
                camera.far,
                camera.near
            );
            return Ok(());
        }
        if camera.width() == 0 || camera.height() == 0 {
            return Ok(());
        }

        self.active_lights.clear();
        if settings.lighting {
            camera.metrics.total_lights = lights.len();
            for (index, light) in lights.iter_mut().enumerate() {
                if light.is_on() {
                    light.begin_render();
                    self.active_lights.push(index);
                }
            }
            camera.metrics.active_lights = self.active_lights.len();
        }

        let view_proj = camera.view_projection();
        camera.update_frustum_sphere();

        self.partition(models);

        let camera_position = camera.position;
        let distance_sq = |pair: &RenderPair| {
            models[pair.model]
                .world_position()
                .distance_squared(camera_position)
        };
        if !camera.render_depth {
            culling::sort_back_to_front(&mut self.solids, &distance_sq);
        }
        culling::sort_back_to_front(&mut self.transparents, &distance_sq);

        let frame_state = FrameState {
            settings,
            view_proj,
            active_lights: &self.active_lights,
        };
        for pair in self.solids.iter().chain(self.transparents.iter()) {
            render_part(&mut self.batch, &frame_state, *pair, lights, camera, models)?;
        }

        camera.metrics.frame_time = frame.elapsed();
        camera.metrics.update_averages(Instant::now());
        Ok(())
    }

    fn partition(&mut self, models: &[Model]) {
        self.solids.clear();
        self.transparents.clear();

        for (model_index, model) in models.iter().enumerate() {
            let Some(mesh) = &model.mesh else {
                continue;
            };
            for (part_index, part) in mesh.parts.iter().enumerate() {
                let material = part.material.as_deref().unwrap_or_else(|| default_material());
                let pair = RenderPair {
                    model: model_index,
                    part: part_index,
                };
                match material.effective_transparency(model.color) {
                    TransparencyMode::Transparent => self.transparents.push(pair),
                    _ => self.solids.push(pair),
                }
            }
        }
    }
}

/// Per-frame values shared by every part.
struct FrameState<'a> {
    settings: &'a SceneSettings,
    view_proj: Mat4,
    active_lights: &'a [usize],
}

fn render_part(
    batch: &mut PartBatch,
    frame: &FrameState<'_>,
    pair: RenderPair,
    lights: &mut [Light],
    camera: &mut Camera,
    models: &mut [Model],
) -> RenderResult<()> {
    let Some(model) = models.get_mut(pair.model) else {
        return Ok(());
    };
    let Some(triangle_count) = model
        .mesh
        .as_ref()
        .and_then(|mesh| mesh.parts.get(pair.part))
        .map(|part| part.triangles.len())
    else {
        return Ok(());
    };

    camera.metrics.total_parts += 1;
    camera.metrics.total_triangles += triangle_count;

    if !model.visible {
        return Ok(());
    }
    if model.frustum_culling && !model.bounding_sphere().intersects(camera.frustum_sphere()) {
        return Ok(());
    }

    let posing = PerfTimer::new("animation");
    model.transform_part(pair.part, &frame.view_proj);
    camera.metrics.animation_time += posing.elapsed();

    let model: &Model = model;
    let Some(mesh) = model.mesh.as_ref() else {
        return Ok(());
    };
    let Some(part) = mesh.parts.get(pair.part) else {
        return Ok(());
    };
    let material: &Material = part.material.as_deref().unwrap_or_else(|| default_material());
    let mode = material.effective_transparency(model.color);

    // Visibility and projection
    batch.clear();
    let width = camera.width() as f32;
    let height = camera.height() as f32;
    let perspective = camera.is_perspective();
    let far_limit = camera.far_limit();

    for (index, triangle) in part.triangles.iter().enumerate() {
        count_call!(PIPELINE_COUNTERS.triangles_tested);
        if !triangle.visible {
            continue;
        }

        let vertices = part.triangle_vertices(triangle);
        let clip = vertices.map(|v| v.transformed);
        if culling::behind_or_beyond(&clip, perspective, far_limit) {
            count_call!(PIPELINE_COUNTERS.triangles_rejected_near_far);
            continue;
        }

        let mut screen = clip.map(|c| clip_to_viewport(c, perspective, width, height));
        if let Some(program) = &material.clip_program {
            for s in &mut screen {
                *s = program(*s);
            }
        }
        let screen = screen.map(round_to_pixel);

        let points = screen.map(|s| s.xy());
        if culling::offscreen(&points, width, height) {
            count_call!(PIPELINE_COUNTERS.triangles_rejected_offscreen);
            continue;
        }
        if material.backface_culling && culling::is_backfacing(&points) {
            count_call!(PIPELINE_COUNTERS.triangles_culled_backface);
            continue;
        }

        if batch.triangles.len() == MAX_TRIANGLES_PER_PART {
            log::error!(
                "mesh '{}' of model '{}' exceeds {} triangles in one part",
                mesh.name,
                model.name,
                MAX_TRIANGLES_PER_PART
            );
            return Err(RenderError::TriangleLimitExceeded {
                model: model.name.clone(),
                mesh: mesh.name.clone(),
                triangles: batch.triangles.len() + 1,
                limit: MAX_TRIANGLES_PER_PART,
            });
        }

        batch.triangles.push(index);
        for (vertex, s) in vertices.iter().zip(screen) {
            batch.vertices.push(RasterVertex {
                position: s.xy(),
                depth: (s.z / far_limit).max(0.0),
                color: vertex.color,
                uv: vertex.uv,
            });
        }
    }

    if batch.triangles.is_empty() {
        return Ok(());
    }

    if camera.render_depth {
        depth_pass(batch, material, mode, &mut camera.targets);
    }

    if frame.settings.lighting && !material.shadeless {
        let lighting = PerfTimer::new("lighting");
        light_batch(batch, frame.active_lights, lights, model, camera, part);
        camera.metrics.lighting_time += lighting.elapsed();
    }

    color_pass(batch, material, mode, model.color, camera, &frame.settings.fog);

    count_call!(PIPELINE_COUNTERS.parts_rendered);
    camera.metrics.drawn_triangles += batch.triangles.len();
    camera.metrics.drawn_parts += 1;
    Ok(())
}

/// Write this part's nearest depths into the depth intermediate and, unless
/// the part is transparent, merge them into the persistent depth buffer.
fn depth_pass(
    batch: &PartBatch,
    material: &Material,
    mode: TransparencyMode,
    targets: &mut RenderTargets,
) {
    perf_scope!("depth pass");
    let RenderTargets {
        depth,
        depth_intermediate,
        clip_intermediate,
        ..
    } = targets;
    depth_intermediate.clear();

    // Closer-wins against both earlier parts and this part's own triangles.
    let depth_test = |frag: &Fragment, dst: Vec4| -> Option<Vec4> {
        let existing = depth.pixels()[depth.index(frag.x, frag.y)];
        (closer_wins(existing, frag.depth) && closer_wins(dst, frag.depth))
            .then(|| encode_depth(frag.depth))
    };

    if mode == TransparencyMode::AlphaClip {
        let texture = material.texture();
        let threshold = material.alpha_clip_threshold;
        clip_intermediate.clear();
        draw_triangles(clip_intermediate, &batch.vertices, |frag, dst| {
            if texture.sample(frag.uv).w < threshold {
                return None;
            }
            depth_test(frag, dst)
        });
        composite_depth(depth_intermediate, clip_intermediate);
    } else {
        draw_triangles(depth_intermediate, &batch.vertices, depth_test);
    }

    if mode != TransparencyMode::Transparent {
        composite_depth(depth, depth_intermediate);
    }
}

/// Multiply each accepted vertex colour by the summed contribution of every
/// active light.
fn light_batch(
    batch: &mut PartBatch,
    active_lights: &[usize],
    lights: &mut [Light],
    model: &Model,
    camera: &Camera,
    part: &MeshPart,
) {
    for &index in active_lights {
        lights[index].begin_model(model, camera);
    }

    for (slot, &index) in batch.triangles.iter().enumerate() {
        let triangle = &part.triangles[index];
        let mut sum = [0.0f32; 9];
        for &source in active_lights {
            for (total, value) in sum.iter_mut().zip(lights[source].light(triangle, part)) {
                *total += value;
            }
        }

        for (corner, vertex) in batch.vertices[slot * 3..slot * 3 + 3].iter_mut().enumerate() {
            let light = Vec3::from_slice(&sum[corner * 3..corner * 3 + 3]);
            vertex.color = (vertex.color.xyz() * light).extend(vertex.color.w);
        }
    }
}

fn color_pass(
    batch: &PartBatch,
    material: &Material,
    mode: TransparencyMode,
    model_color: Vec4,
    camera: &mut Camera,
    fog: &Fog,
) {
    perf_scope!("color pass");
    let texture = material.texture();
    let tint = material.tint(model_color);
    let threshold = material.alpha_clip_threshold;

    let shade = |frag: &Fragment| -> Option<Vec4> {
        let texel = texture.sample(frag.uv);
        if mode == TransparencyMode::AlphaClip && texel.w < threshold {
            return None;
        }
        let straight = match &material.fragment_program {
            Some(program) => program(frag, texture)?,
            None => texel * frag.color,
        };
        Some(premultiply(straight * tint))
    };

    if !camera.render_depth {
        draw_triangles(&mut camera.targets.color, &batch.vertices, |frag, dst| {
            shade(frag).map(|src| blend_over(dst, src))
        });
        return;
    }

    let RenderTargets {
        color,
        color_intermediate,
        depth_intermediate,
        ..
    } = &mut camera.targets;
    color_intermediate.clear();

    // Keep only the fragment that won this part's depth pass at each pixel.
    draw_triangles(color_intermediate, &batch.vertices, |frag, dst| {
        let mask = depth_intermediate.pixels()[depth_intermediate.index(frag.x, frag.y)];
        if is_unwritten(mask) || (frag.depth - decode_depth(mask)).abs() > DEPTH_PRECISION {
            return None;
        }
        shade(frag).map(|src| blend_over(dst, src))
    });

    composite_color(color, color_intermediate, depth_intermediate, fog);
}
