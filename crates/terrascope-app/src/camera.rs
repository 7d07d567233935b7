//! Orbit camera for inspecting the terrain.

use glam::{Mat4, Vec3};
use terrascope_render::CameraUniform;

const MIN_DISTANCE: f32 = 2.0;
const MAX_DISTANCE: f32 = 5000.0;
const MIN_PITCH: f32 = -1.5;
const MAX_PITCH: f32 = 1.5;

/// Camera orbiting a fixed target: left-drag rotates, scroll zooms.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Rotation around +Y, radians.
    pub yaw: f32,
    /// Elevation above the XZ plane, radians.
    pub pitch: f32,
    pub aspect: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 150.0,
            yaw: 0.6,
            pitch: 0.5,
            aspect: 16.0 / 9.0,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.5,
            far: 10_000.0,
        }
    }
}

impl OrbitCamera {
    /// Point the camera at the terrain: target at the footprint center,
    /// distance chosen so the whole grid fits in view.
    pub fn frame(&mut self, min_x: f32, max_x: f32, min_z: f32, max_z: f32, min_y: f32, max_y: f32) {
        self.target = Vec3::new(
            (min_x + max_x) * 0.5,
            (min_y + max_y) * 0.5,
            (min_z + max_z) * 0.5,
        );
        let half_extent = ((max_x - min_x).max(max_z - min_z) * 0.5).max(1.0);
        self.distance =
            (half_extent / (self.fov_y * 0.5).tan() * 1.2).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.aspect = width / height.max(1.0);
    }

    /// Apply a mouse drag in screen pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * 0.005;
        self.pitch = (self.pitch + dy * 0.005).clamp(MIN_PITCH, MAX_PITCH);
    }

    /// Apply a scroll step: positive zooms in.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * (1.0 - steps * 0.1)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// World-space eye position.
    pub fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.sin(),
        ) * self.distance;
        self.target + offset
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        proj * view
    }

    pub fn to_uniform(&self) -> CameraUniform {
        let eye = self.eye();
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            position: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_position_matches_eye() {
        let camera = OrbitCamera::default();
        let eye = camera.eye();
        let uniform = camera.to_uniform();
        assert_eq!(uniform.position, [eye.x, eye.y, eye.z, 1.0]);
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let mut camera = OrbitCamera::default();
        for _ in 0..200 {
            camera.zoom(1.0);
        }
        assert!(camera.distance >= MIN_DISTANCE);
        for _ in 0..200 {
            camera.zoom(-1.0);
        }
        assert!(camera.distance <= MAX_DISTANCE);
    }

    #[test]
    fn test_pitch_clamps_short_of_poles() {
        let mut camera = OrbitCamera::default();
        camera.rotate(0.0, 10_000.0);
        assert!(camera.pitch <= MAX_PITCH);
        camera.rotate(0.0, -20_000.0);
        assert!(camera.pitch >= MIN_PITCH);
    }

    #[test]
    fn test_frame_centers_on_footprint() {
        let mut camera = OrbitCamera::default();
        camera.frame(-100.0, 100.0, -50.0, 150.0, 0.0, 40.0);
        assert_eq!(camera.target, Vec3::new(0.0, 20.0, 50.0));
        assert!(camera.distance > 100.0, "Grid must fit inside the view cone");
    }

    #[test]
    fn test_view_proj_is_finite() {
        let camera = OrbitCamera::default();
        let m = camera.view_proj().to_cols_array();
        assert!(m.iter().all(|v| v.is_finite()));
    }
}
