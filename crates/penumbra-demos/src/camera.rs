use glam::{Mat4, Vec3};

pub const FOV_Y_DEGREES: f32 = 60.0;
pub const NEAR: f32 = 1.5;
pub const FAR: f32 = 300.0;

/// Fixed viewpoint cycled with Space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPreset {
    pub name: &'static str,
    pub eye: Vec3,
    pub center: Vec3,
    pub up: Vec3,
}

pub const PRESETS: [CameraPreset; 3] = [
    CameraPreset {
        name: "walk",
        eye: Vec3::new(0.0, 5.0, 0.0),
        center: Vec3::new(1.0, 5.0, -1.0),
        up: Vec3::Y,
    },
    CameraPreset {
        name: "overview",
        eye: Vec3::new(-20.0, 20.0, -20.0),
        center: Vec3::ZERO,
        up: Vec3::Y,
    },
    CameraPreset {
        name: "top-down",
        eye: Vec3::new(0.0, 100.0, 0.0),
        center: Vec3::ZERO,
        up: Vec3::Z,
    },
];

/// View and projection for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Camera {
    pub fn new(preset: &CameraPreset, aspect: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(preset.eye, preset.center, preset.up),
            projection: Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, NEAR, FAR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_looks_at_its_center() {
        for preset in &PRESETS {
            let camera = Camera::new(preset, 16.0 / 9.0);
            let center = camera.view.transform_point3(preset.center);
            // Straight ahead in view space is -Z.
            assert!(center.x.abs() < 1e-4, "{}: {center:?}", preset.name);
            assert!(center.y.abs() < 1e-4, "{}: {center:?}", preset.name);
            assert!(center.z < 0.0, "{}: {center:?}", preset.name);
        }
    }

    #[test]
    fn eye_maps_to_view_origin() {
        let camera = Camera::new(&PRESETS[1], 1.0);
        let eye = camera.view.transform_point3(PRESETS[1].eye);
        assert!(eye.length() < 1e-4);
    }

    #[test]
    fn projection_maps_near_and_far_to_depth_range() {
        let camera = Camera::new(&PRESETS[0], 1.0);
        let near = camera.projection.project_point3(Vec3::new(0.0, 0.0, -NEAR));
        let far = camera.projection.project_point3(Vec3::new(0.0, 0.0, -FAR));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }
}
