/// Camera: projection state, render targets and per-frame metrics
/// Plus an FPS-style controller for the viewer
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::error::RenderResult;
use crate::perf::FrameMetrics;
use crate::rendering::culling;
use crate::rendering::framebuffer::RenderTargets;
use crate::scene::BoundingSphere;

/// W used in place of non-positive clip-space w during projection.
/// Triangles straddling the camera plane smear instead of being clipped.
pub const W_EPSILON: f32 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Projection {
    /// Vertical field of view in degrees.
    Perspective { fov_y_degrees: f32 },
    /// Horizontal half-extent of the view in world units.
    Orthographic { scale: f32 },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective { fov_y_degrees: 60.0 }
    }
}

pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    pub near: f32,
    pub far: f32,
    pub projection: Projection,
    /// Depth-tested rendering. When off, solids are painter-sorted instead.
    pub render_depth: bool,
    pub targets: RenderTargets,
    pub metrics: FrameMetrics,
    frustum_sphere: BoundingSphere,
}

impl Camera {
    pub fn new(width: usize, height: usize) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            near: 0.1,
            far: 100.0,
            projection: Projection::default(),
            render_depth: true,
            targets: RenderTargets::new(width, height),
            metrics: FrameMetrics::default(),
            frustum_sphere: BoundingSphere::new(Vec3::ZERO, 0.0),
        };
        camera.update_frustum_sphere();
        camera
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.targets.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.targets.height()
    }

    #[inline]
    pub fn is_perspective(&self) -> bool {
        matches!(self.projection, Projection::Perspective { .. })
    }

    /// Resize all five render targets together.
    pub fn resize(&mut self, width: usize, height: usize) -> RenderResult<()> {
        self.targets.resize(width, height)
    }

    /// Clear the colour and depth buffers.
    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Orient the camera towards a world-space point.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let view = Mat4::look_at_rh(self.position, target, up);
        self.rotation = Quat::from_mat4(&view.inverse()).normalize();
    }

    /// Forward direction (local -Z)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Inverse of the camera's world transform: translate by the negated
    /// position, then rotate by the transposed rotation.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation.conjugate()) * Mat4::from_translation(-self.position)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let width = self.width().max(1) as f32;
        let height = self.height().max(1) as f32;
        match self.projection {
            Projection::Perspective { fov_y_degrees } => Mat4::perspective_rh(
                fov_y_degrees.to_radians(),
                width / height,
                self.near,
                self.far,
            ),
            Projection::Orthographic { scale } => {
                let vertical = scale * height / width;
                Mat4::orthographic_rh(-scale, scale, -vertical, vertical, self.near, self.far)
            }
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Clip-space z of the far plane.
    #[inline]
    pub fn far_limit(&self) -> f32 {
        if self.is_perspective() {
            self.far
        } else {
            1.0
        }
    }

    #[inline]
    pub fn frustum_sphere(&self) -> &BoundingSphere {
        &self.frustum_sphere
    }

    pub fn update_frustum_sphere(&mut self) {
        self.frustum_sphere =
            culling::frustum_sphere(self.position, self.forward(), self.near, self.far);
    }

    /// Map a clip-space position to rounded pixel coordinates, keeping z and
    /// the w used for the divide.
    pub fn clip_to_screen(&self, clip: Vec4) -> Vec4 {
        clip_to_screen(
            clip,
            self.is_perspective(),
            self.width() as f32,
            self.height() as f32,
        )
    }

    pub fn world_to_clip(&self, point: Vec3) -> Vec4 {
        self.view_projection() * point.extend(1.0)
    }

    pub fn world_to_screen(&self, point: Vec3) -> Vec2 {
        self.clip_to_screen(self.world_to_clip(point)).truncate().truncate()
    }
}

/// Clip to screen for a target of `width` x `height` pixels. Y is flipped so
/// screen space grows downward.
#[inline]
pub fn clip_to_screen(clip: Vec4, perspective: bool, width: f32, height: f32) -> Vec4 {
    round_to_pixel(clip_to_viewport(clip, perspective, width, height))
}

/// Snap x and y to whole pixels.
#[inline]
pub fn round_to_pixel(screen: Vec4) -> Vec4 {
    Vec4::new(screen.x.round(), screen.y.round(), screen.z, screen.w)
}

/// Viewport mapping without the final rounding, for callers that adjust
/// positions before snapping them.
#[inline]
pub fn clip_to_viewport(clip: Vec4, perspective: bool, width: f32, height: f32) -> Vec4 {
    let w = if !perspective {
        1.0
    } else if clip.w <= 0.0 {
        W_EPSILON
    } else {
        clip.w
    };

    let x = (clip.x / w + 1.0) * 0.5 * width;
    let y = (1.0 - clip.y / w) * 0.5 * height;
    Vec4::new(x, y, clip.z, w)
}

/// Camera controller - handles input state
#[derive(Debug)]
pub struct CameraController {
    pub forward_pressed: bool,
    pub backward_pressed: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub up_pressed: bool,
    pub down_pressed: bool,
    pub yaw: f32,
    pub pitch: f32,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            forward_pressed: false,
            backward_pressed: false,
            left_pressed: false,
            right_pressed: false,
            up_pressed: false,
            down_pressed: false,
            yaw: 0.0,
            pitch: 0.0,
            move_speed: 8.0,
            mouse_sensitivity: 0.002,
        }
    }
}

impl CameraController {
    /// Update orientation from a mouse delta.
    pub fn rotate(&mut self, mouse_delta_x: f32, mouse_delta_y: f32) {
        self.yaw -= mouse_delta_x * self.mouse_sensitivity;
        self.pitch -= mouse_delta_y * self.mouse_sensitivity;

        // Clamp pitch to prevent gimbal lock
        const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Update camera based on controller state
    pub fn update_camera(&self, camera: &mut Camera, dt: f32) {
        camera.rotation = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);

        let mut forward = 0.0;
        let mut right = 0.0;
        let mut up = 0.0;

        if self.forward_pressed {
            forward += 1.0;
        }
        if self.backward_pressed {
            forward -= 1.0;
        }
        if self.right_pressed {
            right += 1.0;
        }
        if self.left_pressed {
            right -= 1.0;
        }
        if self.up_pressed {
            up += 1.0;
        }
        if self.down_pressed {
            up -= 1.0;
        }

        let move_vec = camera.forward() * forward + camera.right() * right + Vec3::Y * up;
        camera.position += move_vec * self.move_speed * dt;
    }
}
