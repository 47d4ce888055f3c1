//! Scene cameras: a fixed free camera and a lagging chase camera behind the helicopter.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Chase camera tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowCameraConfig {
    /// Distance behind the helicopter.
    pub distance: f32,
    /// Height above the helicopter.
    pub height: f32,
    /// Fraction of the remaining gap closed per tick (0–1).
    pub lag: f32,
    /// How far ahead of the nose the camera aims.
    pub look_ahead: f32,
}

impl Default for FollowCameraConfig {
    fn default() -> Self {
        Self {
            distance: 30.0,
            height: 8.0,
            lag: 0.1,
            look_ahead: 10.0,
        }
    }
}

/// Look-at camera with perspective projection.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(50.0, 50.0, 50.0),
            target: Vec3::ZERO,
            fov: 1.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Switches between the free view and chasing the helicopter.
#[derive(Debug, Clone)]
pub struct CameraRig {
    config: FollowCameraConfig,
    camera: Camera,
    free_eye: Vec3,
    free_target: Vec3,
    following: bool,
}

impl CameraRig {
    pub fn new(config: FollowCameraConfig) -> Self {
        let camera = Camera::default();
        Self {
            free_eye: camera.eye,
            free_target: camera.target,
            camera,
            config,
            following: false,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    /// Toggle chase mode. Leaving it snaps back to the free view.
    pub fn toggle_follow(&mut self) {
        self.following = !self.following;
        if !self.following {
            self.camera.eye = self.free_eye;
            self.camera.target = self.free_target;
        }
        log::debug!("Follow camera {}", if self.following { "on" } else { "off" });
    }

    /// One chase step toward the spot behind `position` for heading `orientation`.
    pub fn update(&mut self, position: Vec3, orientation: f32) {
        if !self.following {
            return;
        }
        let (sin, cos) = orientation.sin_cos();
        let c = &self.config;
        let desired = Vec3::new(
            position.x - sin * c.distance,
            position.y + c.height,
            position.z - cos * c.distance,
        );
        let lag = c.lag.clamp(0.0, 1.0);
        self.camera.eye += (desired - self.camera.eye) * lag;
        self.camera.target = Vec3::new(
            position.x + sin * c.look_ahead,
            position.y,
            position.z + cos * c.look_ahead,
        );
    }
}

/// Camera uniform data for GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4], // w unused, padding
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        let eye = camera.eye;
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            position: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chase_converges_behind_heading() {
        let mut rig = CameraRig::new(FollowCameraConfig::default());
        rig.toggle_follow();
        let heli = Vec3::new(10.0, 30.0, -20.0);
        for _ in 0..300 {
            rig.update(heli, 0.0);
        }
        let cam = rig.camera();
        assert!(cam.eye.abs_diff_eq(Vec3::new(10.0, 38.0, -50.0), 1e-3), "{:?}", cam.eye);
        assert!(cam.target.abs_diff_eq(Vec3::new(10.0, 30.0, -10.0), 1e-5));
    }

    #[test]
    fn chase_lags() {
        let mut rig = CameraRig::new(FollowCameraConfig::default());
        rig.toggle_follow();
        let start = rig.camera().eye;
        rig.update(Vec3::ZERO, 0.0);
        let expected = start + (Vec3::new(0.0, 8.0, -30.0) - start) * 0.1;
        assert!(rig.camera().eye.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn leaving_chase_restores_free_view() {
        let mut rig = CameraRig::new(FollowCameraConfig::default());
        rig.toggle_follow();
        rig.update(Vec3::new(100.0, 20.0, 100.0), 1.0);
        rig.toggle_follow();
        assert_eq!(rig.camera().eye, Vec3::new(50.0, 50.0, 50.0));
        assert_eq!(rig.camera().target, Vec3::ZERO);
    }

    #[test]
    fn free_camera_ignores_updates() {
        let mut rig = CameraRig::new(FollowCameraConfig::default());
        rig.update(Vec3::new(100.0, 20.0, 100.0), 1.0);
        assert_eq!(rig.camera().eye, Vec3::new(50.0, 50.0, 50.0));
    }

    #[test]
    fn aspect_guards_zero_height() {
        let mut cam = Camera::default();
        cam.set_aspect(800, 0);
        assert_eq!(cam.aspect, 800.0);
    }
}
