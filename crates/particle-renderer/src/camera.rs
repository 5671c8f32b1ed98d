//! Camera system for 3D visualization

use glam::{Mat4, Quat, Vec3};

/// Anything that can tell the renderer where the eye is.
///
/// The sprite pipeline needs the inverse of `world_to_camera` to build a
/// camera-facing basis for each particle.
pub trait ViewSource {
    /// World space to camera space transform
    fn world_to_camera(&self) -> Mat4;

    /// Camera space to clip space transform
    fn projection(&self) -> Mat4;

    fn camera_to_world(&self) -> Mat4 {
        self.world_to_camera().inverse()
    }
}

/// Orbit camera for scene navigation
pub struct Camera {
    pub distance: f32,
    pub rotation: Quat,
    pub target: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let rotation = Quat::from_rotation_x(-0.3);

        Self {
            distance: 12.0,
            rotation,
            target: Vec3::ZERO,
            aspect: width as f32 / height.max(1) as f32,
            fovy: 45.0_f32.to_radians(),
            znear: 0.01,
            zfar: 1000.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        let offset = self.rotation * Vec3::new(0.0, 0.0, self.distance);
        self.target + offset
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        let up = self.rotation * Vec3::Y;
        let yaw_rotation = Quat::from_axis_angle(up, delta_x);

        let right = self.rotation * Vec3::X;
        let pitch_rotation = Quat::from_axis_angle(right, -delta_y);

        self.rotation = (yaw_rotation * pitch_rotation * self.rotation).normalize();
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(0.5, 500.0);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }
}

impl ViewSource for Camera {
    fn world_to_camera(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position());
        rotation_matrix * translation_matrix
    }

    fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar)
    }
}
