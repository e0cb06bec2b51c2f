use glam::Vec3;

use super::error::TableError;
use crate::render::uniform::{PackedBuffer, UniformBuffer};

/// Number of rows in the materials block.
pub const MAX_MATERIALS: usize = 8;

/// Bytes per material row: three `vec3` slots, shininess in the last one.
pub const MATERIAL_STRIDE: usize = 48;

/// Full declared size of the materials block.
pub const MATERIAL_BLOCK_SIZE: usize = MAX_MATERIALS * MATERIAL_STRIDE;

/// Phong material.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub diffuse: Vec3,
    pub ambient: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Material {
    pub const fn new(diffuse: Vec3, ambient: Vec3, specular: Vec3, shininess: f32) -> Self {
        Self {
            diffuse,
            ambient,
            specular,
            shininess,
        }
    }

    /// Uniform grey material, handy for quick scenes.
    pub fn grey(diffuse: f32, ambient: f32, specular: f32, shininess: f32) -> Self {
        Self::new(
            Vec3::splat(diffuse),
            Vec3::splat(ambient),
            Vec3::splat(specular),
            shininess,
        )
    }
}

/// Zero-based index into the material table.
///
/// The G-buffer stores `id + 1` so that `0` can mean "no geometry here".
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// Value written to the material target by the geometry pass.
    #[inline]
    pub const fn encode(self) -> u32 {
        self.0 + 1
    }

    /// Inverse of [`encode`](Self::encode). `0` is the background sentinel.
    #[inline]
    pub const fn decode(sample: u32) -> Option<Self> {
        match sample {
            0 => None,
            n => Some(Self(n - 1)),
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Packs `materials` in id order, one 48-byte row each.
pub fn pack_materials(buf: &mut PackedBuffer, materials: &[Material]) -> Result<(), TableError> {
    buf.clear();
    if materials.len() > MAX_MATERIALS {
        return Err(TableError::TooManyMaterials {
            count: materials.len(),
            capacity: MAX_MATERIALS,
        });
    }

    for m in materials {
        buf.push(m.diffuse);
        buf.push(m.ambient);
        buf.push(m.specular);
        buf.push(m.shininess);
        buf.finish_chunk();
    }
    Ok(())
}

/// CPU materials plus their uniform block.
///
/// Materials rarely change: edit the CPU records, then `build` and `upload`
/// again. The device copy is always rewritten as a whole.
#[derive(Debug)]
pub struct MaterialTable {
    materials: Vec<Material>,
    buffer: UniformBuffer,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self {
            materials: Vec::with_capacity(MAX_MATERIALS),
            buffer: UniformBuffer::new("penumbra materials ubo", MATERIAL_BLOCK_SIZE),
        }
    }

    /// Appends a material and returns its id. Capacity is checked by `build`.
    pub fn push(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId((self.materials.len() - 1) as u32)
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    /// Replaces a record in place on the CPU side. Returns `false` for unknown ids.
    pub fn set(&mut self, id: MaterialId, material: Material) -> bool {
        match self.materials.get_mut(id.index()) {
            Some(slot) => {
                *slot = material;
                true
            }
            None => false,
        }
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn build(&mut self) -> Result<(), TableError> {
        pack_materials(&mut self.buffer, &self.materials)
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        self.buffer.send_to_device(device, queue);
    }

    pub fn buffer(&self) -> &UniformBuffer {
        &self.buffer
    }
}

impl Default for MaterialTable {
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

    fn table_with(materials: &[Material]) -> MaterialTable {
        let mut table = MaterialTable::new();
        for m in materials {
            table.push(*m);
        }
        table
    }

    #[test]
    fn row_offsets_match_block_declaration() {
        let m = Material::new(
            Vec3::new(0.1, 0.2, 0.3),
            Vec3::new(0.4, 0.5, 0.6),
            Vec3::new(0.7, 0.8, 0.9),
            16.0,
        );
        let mut table = table_with(&[m, m]);
        table.build().unwrap();

        let bytes = table.buffer().as_bytes();
        assert_eq!(bytes.len(), 2 * MATERIAL_STRIDE);
        for row in 0..2 {
            let base = row * MATERIAL_STRIDE;
            assert_eq!(f32_at(bytes, base), 0.1);
            assert_eq!(f32_at(bytes, base + 16), 0.4);
            assert_eq!(f32_at(bytes, base + 32), 0.7);
            assert_eq!(f32_at(bytes, base + 44), 16.0);
            assert_eq!(&bytes[base + 12..base + 16], &[0; 4]);
            assert_eq!(&bytes[base + 28..base + 32], &[0; 4]);
        }
    }

    #[test]
    fn red_material_round_trip_through_bytes() {
        let red = Material::new(Vec3::X, Vec3::ZERO, Vec3::ZERO, 0.0);
        let mut buf = PackedBuffer::new();
        pack_materials(&mut buf, &[red]).unwrap();
        assert_eq!(buf.len(), 48);
        assert_eq!(
            [f32_at(buf.as_bytes(), 0), f32_at(buf.as_bytes(), 4), f32_at(buf.as_bytes(), 8)],
            [1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn build_twice_is_byte_identical() {
        let mut table = table_with(&[Material::grey(0.7, 0.5, 0.5, 16.0)]);
        table.build().unwrap();
        let first = table.buffer().as_bytes().to_vec();
        table.build().unwrap();
        assert_eq!(table.buffer().as_bytes(), &first[..]);
    }

    #[test]
    fn overflow_is_rejected() {
        let mut table = table_with(&[Material::grey(0.5, 0.5, 0.5, 1.0); MAX_MATERIALS + 1]);
        let err = table.build().unwrap_err();
        assert_eq!(
            err,
            TableError::TooManyMaterials {
                count: MAX_MATERIALS + 1,
                capacity: MAX_MATERIALS
            }
        );
        assert!(table.buffer().is_empty());
    }

    #[test]
    fn full_table_fills_block() {
        let mut table = table_with(&[Material::grey(0.5, 0.5, 0.5, 1.0); MAX_MATERIALS]);
        table.build().unwrap();
        assert_eq!(table.buffer().len(), MATERIAL_BLOCK_SIZE);
    }

    #[test]
    fn ids_are_sequential_and_editable() {
        let mut table = MaterialTable::new();
        let a = table.push(Material::grey(0.1, 0.1, 0.1, 1.0));
        let b = table.push(Material::grey(0.2, 0.2, 0.2, 1.0));
        assert_eq!((a, b), (MaterialId(0), MaterialId(1)));

        assert!(table.set(b, Material::grey(0.9, 0.9, 0.9, 8.0)));
        assert_eq!(table.get(b).unwrap().shininess, 8.0);
        assert!(!table.set(MaterialId(5), Material::grey(0.0, 0.0, 0.0, 0.0)));
    }

    #[test]
    fn material_id_sentinel_encoding() {
        assert_eq!(MaterialId(0).encode(), 1);
        assert_eq!(MaterialId::decode(0), None);
        assert_eq!(MaterialId::decode(1), Some(MaterialId(0)));
        assert_eq!(MaterialId::decode(8), Some(MaterialId(7)));
    }
}
