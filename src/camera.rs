use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::splat(5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn get_vp_matrix(&self, resolution: Vec2) -> Mat4 {
        let view = Mat4::look_at_lh(self.eye, self.target, self.up);
        let projection =
            Mat4::perspective_lh(self.fov_y, resolution.x / resolution.y, self.near, self.far);
        projection * view
    }

    /// Projects a world-space point to normalized device coordinates.
    ///
    /// Returns `None` for points at or behind the eye plane, which have no meaningful
    /// screen position.
    pub fn project_to_ndc(&self, point: Vec3, viewport: &Viewport) -> Option<Vec3> {
        let clip = self.get_vp_matrix(viewport.resolution()) * point.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }

        Some(clip.xyz() / clip.w)
    }

    /// Projects a world-space point to viewport pixels, origin top-left, y pointing down.
    pub fn world_to_viewport(&self, point: Vec3, viewport: &Viewport) -> Option<Vec2> {
        if !viewport.is_valid() {
            return None;
        }

        self.project_to_ndc(point, viewport)
            .map(|ndc| viewport.ndc_to_pixels(ndc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn ndc_to_pixels(&self, ndc: Vec3) -> Vec2 {
        Vec2::new(
            (ndc.x * 0.5 + 0.5) * self.width,
            (-ndc.y * 0.5 + 0.5) * self.height,
        )
    }
}
