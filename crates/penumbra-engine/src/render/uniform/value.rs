use glam::{Mat4, Vec3, Vec4};

/// A value that can be written into a uniform block.
///
/// `SIZE` is the number of bytes the value occupies in the block, which is what
/// the chunk rule in [`PackedBuffer`](super::PackedBuffer) checks against. A
/// `vec3` occupies 12 bytes and shares its 16-byte slot with a following scalar.
pub trait Std140Value {
    const SIZE: usize;

    /// Appends exactly `SIZE` bytes (native endianness, as the GPU expects).
    fn append_to(&self, out: &mut Vec<u8>);
}

impl Std140Value for f32 {
    const SIZE: usize = 4;

    fn append_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::bytes_of(self));
    }
}

impl Std140Value for i32 {
    const SIZE: usize = 4;

    fn append_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::bytes_of(self));
    }
}

impl Std140Value for u32 {
    const SIZE: usize = 4;

    fn append_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::bytes_of(self));
    }
}

/// Shader booleans are not host-shareable; they travel as a 4-byte `0`/`1`.
impl Std140Value for bool {
    const SIZE: usize = 4;

    fn append_to(&self, out: &mut Vec<u8>) {
        u32::from(*self).append_to(out);
    }
}

impl Std140Value for [f32; 3] {
    const SIZE: usize = 12;

    fn append_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::cast_slice(self));
    }
}

impl Std140Value for [f32; 4] {
    const SIZE: usize = 16;

    fn append_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::cast_slice(self));
    }
}

impl Std140Value for Vec3 {
    const SIZE: usize = 12;

    fn append_to(&self, out: &mut Vec<u8>) {
        self.to_array().append_to(out);
    }
}

impl Std140Value for Vec4 {
    const SIZE: usize = 16;

    fn append_to(&self, out: &mut Vec<u8>) {
        self.to_array().append_to(out);
    }
}

/// Column-major, four consecutive 16-byte columns.
impl Std140Value for Mat4 {
    const SIZE: usize = 64;

    fn append_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(bytemuck::cast_slice(&self.to_cols_array()));
    }
}
