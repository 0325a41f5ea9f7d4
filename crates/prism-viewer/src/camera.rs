use glam::{Mat4, Vec3};
use prism_engine::render::Camera;

/// Radians per second the camera circles the target.
const ORBIT_SPEED: f32 = 0.4;

/// Perspective camera circling a target point.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Angle around +Y, radians.
    pub yaw: f32,
    /// Elevation above the XZ plane, radians.
    pub pitch: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 8.0,
            yaw: 0.0,
            pitch: 0.45,
            fov_y: 45f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + self.distance * Vec3::new(cp * sy, sp, cp * cy)
    }

    pub fn advance(&mut self, dt: f32) {
        self.yaw = (self.yaw + ORBIT_SPEED * dt) % std::f32::consts::TAU;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// Depth maps to `[0, 1]`, as wgpu expects.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(1e-3), self.near, self.far)
    }
}

impl Camera for OrbitCamera {
    fn view_projection(&self) -> [f32; 16] {
        (self.projection() * self.view()).to_cols_array()
    }
}
