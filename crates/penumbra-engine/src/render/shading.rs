//! CPU reference of the lighting pass.
//!
//! `lighting.wgsl` evaluates exactly this per fragment, in the same order and
//! with the same clamping. Keep the two in lockstep: reference images and the
//! tests below depend on it.

use glam::{Vec3, Vec4};

use crate::render::tables::{Light, MAX_MATERIALS, Material, MaterialId};

/// Color of pixels no geometry was rasterized into.
pub const BACKGROUND_COLOR: Vec3 = Vec3::new(0.0, 0.0, 0.0);

const UNPOPULATED: Material = Material::new(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, 0.0);

/// One texel of each G-buffer target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GBufferSample {
    /// View-space position.
    pub position: Vec3,
    /// View-space normal (unit length).
    pub normal: Vec3,
    /// Material target value: `id + 1`, or `0` for background.
    pub material: u32,
}

/// Shades one fragment. `lights` must already be in view space.
///
/// Ids past `MAX_MATERIALS` are background. An id within capacity but past
/// the end of `materials` reads an unpopulated, zeroed row, as the shader does.
pub fn shade_fragment(
    sample: &GBufferSample,
    materials: &[Material],
    ambient: Vec3,
    lights: &[Light],
) -> Vec3 {
    let Some(id) = MaterialId::decode(sample.material) else {
        return BACKGROUND_COLOR;
    };
    if id.index() >= MAX_MATERIALS {
        return BACKGROUND_COLOR;
    }
    let material = materials.get(id.index()).unwrap_or(&UNPOPULATED);

    let p = sample.position;
    let n = sample.normal;
    let eye = (-p).normalize();

    let mut color = Vec3::ZERO;
    for light in lights {
        let l = light_direction(light.position, p);
        let h = (l + eye).normalize();

        let diffuse = diffuse_term(material, light, n, l);
        let specular = specular_term(material, light, n, l, h);
        let attenuation = spot_attenuation(light, l);

        color += attenuation * (diffuse + specular);
    }

    color + material.ambient * ambient
}

/// Unit vector from `p` towards the light.
///
/// Directional lights (`w == 0`) already carry that direction and skip the
/// perspective divide.
pub fn light_direction(light_position: Vec4, p: Vec3) -> Vec3 {
    if light_position.w == 0.0 {
        light_position.truncate().normalize()
    } else {
        (light_position.truncate() / light_position.w - p).normalize()
    }
}

pub fn diffuse_term(material: &Material, light: &Light, n: Vec3, l: Vec3) -> Vec3 {
    material.diffuse * light.diffuse * n.dot(l).max(0.0)
}

pub fn specular_term(material: &Material, light: &Light, n: Vec3, l: Vec3, h: Vec3) -> Vec3 {
    if n.dot(l) <= 0.0 {
        return Vec3::ZERO;
    }
    material.specular * light.specular * n.dot(h).max(0.0).powf(material.shininess)
}

/// Hard-edged cone: zero at and beyond the cutoff, `k^exponent` inside.
pub fn spot_attenuation(light: &Light, l: Vec3) -> f32 {
    let Some(spot) = light.spot else {
        return 1.0;
    };
    let k = (-l).dot(spot.direction).max(0.0);
    if k > spot.cutoff { k.powf(spot.exponent) } else { 0.0 }
}
