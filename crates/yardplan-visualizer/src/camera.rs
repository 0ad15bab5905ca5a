//! # Orbit camera
//!
//! Spherical coordinates around a target point (Z up). Drives the view
//! and projection matrices for rendering and unprojects clicks into
//! picking rays.

use glam::{Mat4, Vec3, Vec4};

use crate::picking::Ray;

/// Elevation of the default view from the south.
const NORTH_VIEW_PITCH_DEG: f32 = 35.0;

#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,   // radians, 0 = eye on +x
    pub pitch: f32, // radians
    pub fov: f32,   // degrees
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 150.0,
            yaw: -90.0f32.to_radians(),
            pitch: NORTH_VIEW_PITCH_DEG.to_radians(),
            fov: 45.0,
            aspect_ratio: 1.5,
            near: 0.5,
            far: 5000.0,
            min_distance: 5.0,
            max_distance: 2000.0,
        }
    }
}

impl OrbitCamera {
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            distance,
            ..Default::default()
        }
    }

    pub fn update_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        // Stay above the ground and short of straight down
        let limit = 89.0f32.to_radians();
        self.pitch = (self.pitch + delta_pitch).clamp(1.0f32.to_radians(), limit);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(self.min_distance, self.max_distance);
    }

    /// Multiplicative zoom; `factor > 1` moves closer.
    pub fn zoom_by(&mut self, factor: f32) {
        if factor > 0.0 && factor.is_finite() {
            self.distance = (self.distance / factor).clamp(self.min_distance, self.max_distance);
        }
    }

    fn offset_dir(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, sin_pitch)
    }

    fn up_for(forward: Vec3) -> Vec3 {
        if forward.cross(Vec3::Z).length_squared() < 0.001 {
            Vec3::Y
        } else {
            Vec3::Z
        }
    }

    /// Moves the target in the view plane; deltas are screen pixels.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let forward = -self.offset_dir();
        let right = forward.cross(Self::up_for(forward)).normalize();
        let up = right.cross(forward).normalize();
        let scale = self.distance * 0.001;
        self.target -= right * delta_x * scale;
        self.target += up * delta_y * scale;
    }

    pub fn eye_position(&self) -> Vec3 {
        self.target + self.offset_dir() * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.eye_position();
        let forward = (self.target - eye).normalize();
        Mat4::look_at_rh(eye, self.target, Self::up_for(forward))
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Eye south of the lot looking north, far enough back to take in a lot
    /// `lot_depth` world units deep.
    pub fn reset_north(&mut self, lot_depth: f32) {
        self.target = Vec3::ZERO;
        self.yaw = -90.0f32.to_radians();
        self.pitch = NORTH_VIEW_PITCH_DEG.to_radians();
        let half_fov = (self.fov.to_radians() / 2.0).tan();
        let distance = (lot_depth * 0.75) / half_fov;
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self.far = self.far.max(self.distance * 4.0);
    }

    pub fn fit_to_bounds(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let max_dim = (max - min).max_element();
        self.target = center;
        let distance = (max_dim * 0.6) / (self.fov.to_radians() / 2.0).tan();
        self.distance = distance.clamp(self.min_distance, self.max_distance);
    }

    /// World-space ray through a point in normalized device coordinates
    /// (x right, y up, both in `-1..=1`).
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let inverse = self.view_projection().inverse();
        // perspective_rh maps depth to 0..1
        let unproject = |z: f32| {
            let p = inverse * Vec4::new(ndc_x, ndc_y, z, 1.0);
            p.truncate() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);
        Ray::new(near, far - near)
    }

    /// Ray through a pixel of a `width` x `height` viewport (y down).
    pub fn ray_from_pixel(&self, x: f32, y: f32, width: f32, height: f32) -> Ray {
        let ndc_x = (x / width.max(1.0)) * 2.0 - 1.0;
        let ndc_y = 1.0 - (y / height.max(1.0)) * 2.0;
        self.ray_from_ndc(ndc_x, ndc_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_north_puts_eye_south() {
        let mut camera = OrbitCamera::default();
        camera.orbit(1.0, 0.3);
        camera.reset_north(150.0);
        let eye = camera.eye_position();
        assert!(eye.y < 0.0);
        assert!(eye.x.abs() < 1e-3);
        assert!(eye.z > 0.0);
        assert!(camera.distance > 150.0);
    }

    #[test]
    fn test_center_ray_hits_target_direction() {
        let camera = OrbitCamera::new(Vec3::new(5.0, 5.0, 0.0), 50.0);
        let ray = camera.ray_from_ndc(0.0, 0.0);
        let to_target = (camera.target - camera.eye_position()).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_pitch_stays_above_ground() {
        let mut camera = OrbitCamera::default();
        camera.orbit(0.0, -10.0);
        assert!(camera.eye_position().z > camera.target.z);
        camera.orbit(0.0, 10.0);
        assert!(camera.pitch < 90.0f32.to_radians());
    }

    #[test]
    fn test_zoom_clamps() {
        let mut camera = OrbitCamera::default();
        camera.zoom(1.0e6);
        assert_eq!(camera.distance, camera.min_distance);
        camera.zoom_by(0.0001);
        assert_eq!(camera.distance, camera.max_distance);
    }
}
