use glam::{Mat3, Mat4, Vec3, Vec4};

use super::error::TableError;
use crate::render::uniform::{PackedBuffer, UniformBuffer};

/// Number of light records declared in the lights block.
pub const MAX_LIGHTS: usize = 100;

/// Header chunk: global ambient + active light count.
pub const LIGHT_HEADER_SIZE: usize = 16;

/// Bytes per light record (68 bytes of fields rounded to a whole chunk).
pub const LIGHT_STRIDE: usize = 80;

/// Full declared size of the lights block.
pub const LIGHT_BLOCK_SIZE: usize = LIGHT_HEADER_SIZE + MAX_LIGHTS * LIGHT_STRIDE;

/// Cone restriction of a light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spot {
    /// Direction the cone points at.
    pub direction: Vec3,
    /// Cosine of the cone half-angle. Points with `cos > cutoff` are lit.
    pub cutoff: f32,
    /// Falloff power applied to the cosine inside the cone.
    pub exponent: f32,
}

impl Spot {
    pub const fn new(direction: Vec3, cutoff: f32, exponent: f32) -> Self {
        Self {
            direction,
            cutoff,
            exponent,
        }
    }

    pub fn from_half_angle(direction: Vec3, half_angle: f32, exponent: f32) -> Self {
        Self::new(direction, half_angle.cos(), exponent)
    }
}

/// Light source.
///
/// `position.w == 0` marks a directional light whose `xyz` points towards the
/// light; `w == 1` is a positional light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub position: Vec4,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub spot: Option<Spot>,
}

impl Light {
    pub fn point(position: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        Self {
            position: position.extend(1.0),
            diffuse,
            specular,
            spot: None,
        }
    }

    pub fn directional(towards_light: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        Self {
            position: towards_light.extend(0.0),
            diffuse,
            specular,
            spot: None,
        }
    }

    pub fn with_spot(mut self, spot: Spot) -> Self {
        self.spot = Some(spot);
        self
    }

    #[inline]
    pub fn is_directional(&self) -> bool {
        self.position.w == 0.0
    }

    /// Same light expressed in the space `view` maps into.
    ///
    /// Positions go through the matrix directly; the spot direction goes
    /// through its inverse transpose and is renormalized.
    pub fn to_view_space(&self, view: Mat4) -> Self {
        let normal_matrix = Mat3::from_mat4(view).inverse().transpose();
        Self {
            position: view * self.position,
            diffuse: self.diffuse,
            specular: self.specular,
            spot: self.spot.map(|s| Spot {
                direction: (normal_matrix * s.direction).normalize_or_zero(),
                ..s
            }),
        }
    }
}

/// Packs the lights block. Lights are given in world space and are moved to
/// view space with `view` before packing.
pub fn pack_lights(
    buf: &mut PackedBuffer,
    ambient: Vec3,
    lights: &[Light],
    view: Mat4,
) -> Result<(), TableError> {
    buf.clear();
    if lights.len() > MAX_LIGHTS {
        return Err(TableError::TooManyLights {
            count: lights.len(),
            capacity: MAX_LIGHTS,
        });
    }

    buf.push(ambient);
    buf.push(lights.len() as i32);
    buf.finish_chunk();

    for light in lights {
        let l = light.to_view_space(view);
        let spot = l.spot.unwrap_or(Spot::new(Vec3::ZERO, 0.0, 0.0));

        buf.push(l.position);
        buf.push(l.diffuse);
        buf.push(l.specular);
        buf.push(l.spot.is_some());
        buf.push(spot.direction);
        buf.push(spot.cutoff);
        buf.push(spot.exponent);
        buf.finish_chunk();
    }
    Ok(())
}

/// Lights block, rebuilt whenever the camera or the lights move.
#[derive(Debug)]
pub struct LightTable {
    buffer: UniformBuffer,
    count: usize,
}

impl LightTable {
    pub fn new() -> Self {
        Self {
            buffer: UniformBuffer::new("penumbra lights ubo", LIGHT_BLOCK_SIZE),
            count: 0,
        }
    }

    pub fn build(&mut self, ambient: Vec3, lights: &[Light], view: Mat4) -> Result<(), TableError> {
        self.count = 0;
        pack_lights(&mut self.buffer, ambient, lights, view)?;
        self.count = lights.len();
        Ok(())
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        self.buffer.send_to_device(device, queue);
    }

    /// Active lights in the last successful build.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn buffer(&self) -> &UniformBuffer {
        &self.buffer
    }
}

impl Default for LightTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_at(bytes: &[u8], offset: usize) -> f32 {
        f32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn spot_light() -> Light {
        Light::point(Vec3::new(1.0, 10.0, 2.0), Vec3::new(0.3, 0.6, 0.9), Vec3::splat(0.5))
            .with_spot(Spot::new(Vec3::NEG_Y, 0.75, 16.0))
    }

    #[test]
    fn header_holds_ambient_and_count() {
        let mut buf = PackedBuffer::new();
        pack_lights(&mut buf, Vec3::splat(0.2), &[spot_light(); 3], Mat4::IDENTITY).unwrap();

        let bytes = buf.as_bytes();
        assert_eq!(f32_at(bytes, 0), 0.2);
        assert_eq!(f32_at(bytes, 8), 0.2);
        assert_eq!(u32_at(bytes, 12), 3);
        assert_eq!(bytes.len(), LIGHT_HEADER_SIZE + 3 * LIGHT_STRIDE);
    }

    #[test]
    fn record_offsets_match_block_declaration() {
        let mut buf = PackedBuffer::new();
        pack_lights(&mut buf, Vec3::ZERO, &[spot_light()], Mat4::IDENTITY).unwrap();

        let r = &buf.as_bytes()[LIGHT_HEADER_SIZE..];
        assert_eq!(r.len(), LIGHT_STRIDE);
        // position
        assert_eq!(
            [f32_at(r, 0), f32_at(r, 4), f32_at(r, 8), f32_at(r, 12)],
            [1.0, 10.0, 2.0, 1.0]
        );
        // diffuse, specular
        assert_eq!(f32_at(r, 16), 0.3);
        assert_eq!(f32_at(r, 24), 0.9);
        assert_eq!(f32_at(r, 32), 0.5);
        // is_spot shares the specular slot
        assert_eq!(u32_at(r, 44), 1);
        // spot direction + cutoff
        assert_eq!(f32_at(r, 52), -1.0);
        assert_eq!(f32_at(r, 60), 0.75);
        // exponent then padding
        assert_eq!(f32_at(r, 64), 16.0);
        assert_eq!(&r[68..80], &[0; 12]);
    }

    #[test]
    fn non_spot_light_packs_zero_cone() {
        let light = Light::point(Vec3::ZERO, Vec3::ONE, Vec3::ONE);
        let mut buf = PackedBuffer::new();
        pack_lights(&mut buf, Vec3::ZERO, &[light], Mat4::IDENTITY).unwrap();

        let r = &buf.as_bytes()[LIGHT_HEADER_SIZE..];
        assert_eq!(u32_at(r, 44), 0);
        assert_eq!(&r[48..68], &[0; 20]);
    }

    #[test]
    fn empty_light_list_is_header_only() {
        let mut buf = PackedBuffer::new();
        pack_lights(&mut buf, Vec3::splat(0.1), &[], Mat4::IDENTITY).unwrap();
        assert_eq!(buf.len(), LIGHT_HEADER_SIZE);
        assert_eq!(u32_at(buf.as_bytes(), 12), 0);
    }

    #[test]
    fn lights_are_moved_to_view_space() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let light = Light::point(Vec3::ZERO, Vec3::ONE, Vec3::ONE)
            .with_spot(Spot::new(Vec3::Z, 0.5, 1.0));

        let mut buf = PackedBuffer::new();
        pack_lights(&mut buf, Vec3::ZERO, &[light], view).unwrap();

        let r = &buf.as_bytes()[LIGHT_HEADER_SIZE..];
        // The origin sits 5 units in front of the camera (-Z in view space).
        assert!((f32_at(r, 8) + 5.0).abs() < 1e-5);
        assert_eq!(f32_at(r, 12), 1.0);
        // +Z in world points back at the camera, which is +Z in view space too.
        assert!((f32_at(r, 56) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn spot_direction_is_renormalized() {
        let scale = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let light = spot_light().with_spot(Spot::new(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.5, 1.0));
        let moved = light.to_view_space(scale);
        let dir = moved.spot.unwrap().direction;
        assert!((dir.length() - 1.0).abs() < 1e-5);
        // Inverse transpose shrinks the x component under a stretch along x.
        assert!(dir.x < dir.y);
    }

    #[test]
    fn directional_light_ignores_translation() {
        let light = Light::directional(Vec3::Y, Vec3::ONE, Vec3::ONE);
        assert!(light.is_directional());
        let moved = light.to_view_space(Mat4::from_translation(Vec3::new(3.0, 4.0, 5.0)));
        assert_eq!(moved.position, Vec4::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn overflow_is_rejected_not_truncated() {
        let mut table = LightTable::new();
        let lights = vec![spot_light(); MAX_LIGHTS + 1];
        let err = table.build(Vec3::ZERO, &lights, Mat4::IDENTITY).unwrap_err();
        assert_eq!(
            err,
            TableError::TooManyLights {
                count: MAX_LIGHTS + 1,
                capacity: MAX_LIGHTS
            }
        );
        assert_eq!(table.count(), 0);
        assert!(table.buffer().is_empty());
    }

    #[test]
    fn full_table_fills_block() {
        let mut table = LightTable::new();
        let lights = vec![spot_light(); MAX_LIGHTS];
        table.build(Vec3::splat(0.2), &lights, Mat4::IDENTITY).unwrap();
        assert_eq!(table.count(), MAX_LIGHTS);
        assert_eq!(table.buffer().len(), LIGHT_BLOCK_SIZE);
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let view = Mat4::look_at_rh(Vec3::new(-20.0, 20.0, -20.0), Vec3::ZERO, Vec3::Y);
        let lights = [spot_light(), Light::point(Vec3::X, Vec3::ONE, Vec3::ZERO)];

        let mut table = LightTable::new();
        table.build(Vec3::splat(0.2), &lights, view).unwrap();
        let first = table.buffer().as_bytes().to_vec();
        table.build(Vec3::splat(0.2), &lights, view).unwrap();
        assert_eq!(table.buffer().as_bytes(), &first[..]);
    }
}
