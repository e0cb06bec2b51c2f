use glam::Mat4;

use crate::camera::{Camera, CameraPreset, PRESETS};

/// Degrees per second the light rig turns around the Y axis.
pub const LIGHT_SPIN_DEGREES_PER_SEC: f32 = 10.0;

/// Mutable per-frame state shared by every demo.
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    camera_index: usize,
    light_angle: f32,
    aspect: f32,
}

impl SceneState {
    pub fn new() -> Self {
        Self {
            aspect: 1.0,
            ..Self::default()
        }
    }

    /// Advances animations by `dt` seconds.
    pub fn advance(&mut self, dt: f32, aspect: f32) {
        self.light_angle =
            (self.light_angle + (LIGHT_SPIN_DEGREES_PER_SEC * dt).to_radians()) % std::f32::consts::TAU;
        self.aspect = aspect;
    }

    pub fn next_camera(&mut self) -> &CameraPreset {
        self.camera_index = (self.camera_index + 1) % PRESETS.len();
        self.preset()
    }

    pub fn preset(&self) -> &CameraPreset {
        &PRESETS[self.camera_index]
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.preset(), self.aspect)
    }

    /// Current rotation of the light rig.
    pub fn light_rotation(&self) -> Mat4 {
        Mat4::from_rotation_y(self.light_angle)
    }

    pub fn light_angle(&self) -> f32 {
        self.light_angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lights_turn_ten_degrees_per_second() {
        let mut scene = SceneState::new();
        for _ in 0..10 {
            scene.advance(0.1, 1.0);
        }
        assert!((scene.light_angle() - 10f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn camera_cycles_through_presets() {
        let mut scene = SceneState::new();
        assert_eq!(scene.preset().name, "walk");
        assert_eq!(scene.next_camera().name, "overview");
        assert_eq!(scene.next_camera().name, "top-down");
        assert_eq!(scene.next_camera().name, "walk");
    }

    #[test]
    fn angle_wraps() {
        let mut scene = SceneState::new();
        scene.advance(40.0, 1.0);
        assert!(scene.light_angle() < std::f32::consts::TAU);
        assert!((scene.light_angle() - 40f32.to_radians()).abs() < 1e-4);
    }
}
