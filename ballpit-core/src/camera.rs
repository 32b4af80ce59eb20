//! Perspective camera used to size the simulation volume and to turn
//! normalized pointer coordinates into world-space targets.

use glam::{Mat4, Vec2, Vec3};

/// Output surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Visible extent of the plane through the origin, in world units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view before any aspect correction, in degrees
    pub base_fov: f32,
    /// Wider aspects narrow the vertical fov instead of widening the view
    pub max_aspect: Option<f32>,
    pub near: f32,
    pub far: f32,
    fov: f32,
    aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 20.0),
            base_fov: 50.0,
            max_aspect: Some(1.5),
            near: 0.1,
            far: 2000.0,
            fov: 50.0,
            aspect: 1.0,
        }
    }
}

impl Camera {
    /// Current vertical fov in degrees
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Recompute aspect and fov for a viewport. Zero-height viewports are ignored.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if !viewport.width.is_finite()
            || !viewport.height.is_finite()
            || viewport.width <= 0.0
            || viewport.height <= 0.0
        {
            return;
        }
        self.aspect = viewport.width / viewport.height;
        self.fov = match self.max_aspect {
            Some(max) if self.aspect > max => {
                let tan = (self.base_fov.to_radians() / 2.0).tan() / (self.aspect / max);
                2.0 * tan.atan().to_degrees()
            }
            _ => self.base_fov,
        };
    }

    pub fn world_size(&self) -> WorldSize {
        let height = 2.0 * (self.fov.to_radians() / 2.0).tan() * self.position.length();
        WorldSize {
            width: height * self.aspect,
            height,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        let projection = Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.position, Vec3::ZERO, Vec3::Y);
        projection * view
    }

    /// Cast a ray through `ndc` and hit the plane through the origin facing
    /// the camera. Falls back to the origin if the ray runs parallel.
    pub fn ndc_to_world(&self, ndc: Vec2) -> Vec3 {
        let forward = (-self.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let half_height = (self.fov.to_radians() / 2.0).tan();
        let direction = (forward
            + right * (ndc.x * half_height * self.aspect)
            + up * (ndc.y * half_height))
            .normalize_or_zero();
        let normal = forward;

        let denom = normal.dot(direction);
        if denom.abs() < f32::EPSILON {
            return Vec3::ZERO;
        }
        let t = -normal.dot(self.position) / denom;
        self.position + direction * t
    }
}
