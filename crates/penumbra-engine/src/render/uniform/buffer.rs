use std::borrow::Cow;
use std::ops::{Deref, DerefMut};

use super::packed::{CHUNK_SIZE, PackedBuffer};

/// A [`PackedBuffer`] together with the device buffer it is uploaded to.
///
/// The device buffer is created lazily on the first upload and is sized to at
/// least `min_size`, which callers set to the full declared block size so the
/// binding always satisfies the shader's declaration even when only part of an
/// array is populated. It is recreated only when the packed data outgrows it;
/// `generation` changes whenever that happens so dependent bind groups can be
/// rebuilt.
#[derive(Debug)]
pub struct UniformBuffer {
    label: &'static str,
    min_size: u64,
    packed: PackedBuffer,
    buffer: Option<wgpu::Buffer>,
    buffer_size: u64,
    generation: u64,
}

impl UniformBuffer {
    pub fn new(label: &'static str, min_size: usize) -> Self {
        Self {
            label,
            min_size: min_size as u64,
            packed: PackedBuffer::with_capacity(min_size),
            buffer: None,
            buffer_size: 0,
            generation: 0,
        }
    }

    /// Uploads the packed bytes.
    ///
    /// May be called every frame with a different amount of data.
    pub fn send_to_device(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let required = device_size(self.packed.len() as u64, self.min_size);
        self.ensure_capacity(device, required);

        let Some(buffer) = self.buffer.as_ref() else { return };
        queue.write_buffer(buffer, 0, &upload_bytes(&self.packed));
    }

    /// Device handle for binding. `None` until the first upload.
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }

    /// Changes every time the device buffer is (re)created.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, required: u64) {
        if self.buffer.is_some() && required <= self.buffer_size {
            return;
        }

        log::debug!(
            "{}: allocating device buffer ({} -> {} bytes)",
            self.label,
            self.buffer_size,
            required
        );

        self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: required,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.buffer_size = required;
        self.generation = self.generation.wrapping_add(1);
    }
}

impl Deref for UniformBuffer {
    type Target = PackedBuffer;

    fn deref(&self) -> &PackedBuffer {
        &self.packed
    }
}

impl DerefMut for UniformBuffer {
    fn deref_mut(&mut self) -> &mut PackedBuffer {
        &mut self.packed
    }
}

/// Bytes written by [`UniformBuffer::send_to_device`].
///
/// Never shorter than one chunk, so an empty table still overwrites the
/// previous header with a zero count. Copies must also be a multiple of
/// `COPY_BUFFER_ALIGNMENT`; the tail is zero-padded when they are not.
fn upload_bytes(packed: &PackedBuffer) -> Cow<'_, [u8]> {
    let bytes = packed.as_bytes();
    let len = (bytes.len().max(CHUNK_SIZE) as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
    if len == bytes.len() as u64 {
        return Cow::Borrowed(bytes);
    }
    let mut padded = bytes.to_vec();
    padded.resize(len as usize, 0);
    Cow::Owned(padded)
}

/// Device allocation size: never below `min_size`, never zero, chunk aligned.
fn device_size(len: u64, min_size: u64) -> u64 {
    let size = len.max(min_size).max(CHUNK_SIZE as u64);
    size.div_ceil(CHUNK_SIZE as u64) * CHUNK_SIZE as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_size_respects_minimum() {
        assert_eq!(device_size(32, 384), 384);
        assert_eq!(device_size(400, 384), 400);
    }

    #[test]
    fn device_size_is_never_zero() {
        assert_eq!(device_size(0, 0), 16);
    }

    #[test]
    fn device_size_rounds_to_chunk() {
        assert_eq!(device_size(20, 0), 32);
        assert_eq!(device_size(0, 8016), 8016);
    }

    #[test]
    fn empty_buffer_uploads_zeroed_header() {
        let mut ubo = UniformBuffer::new("test ubo", 64);
        ubo.push(3i32);
        ubo.finish_chunk();
        ubo.clear();
        assert_eq!(&*upload_bytes(&ubo), &[0u8; 16]);
    }

    #[test]
    fn short_upload_is_padded_to_a_chunk() {
        let mut packed = PackedBuffer::new();
        packed.push(7u32);
        let bytes = upload_bytes(&packed);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..4], &7u32.to_ne_bytes());
        assert_eq!(&bytes[4..], &[0u8; 12]);
    }

    #[test]
    fn chunked_upload_is_borrowed() {
        let mut packed = PackedBuffer::new();
        packed.push(glam::Vec4::ONE);
        packed.push(glam::Vec4::ONE);
        assert!(matches!(upload_bytes(&packed), Cow::Borrowed(b) if b.len() == 32));
    }

    #[test]
    fn derefs_to_packed_buffer() {
        let mut ubo = UniformBuffer::new("test ubo", 64);
        ubo.push(1.0f32);
        ubo.finish_chunk();
        assert_eq!(ubo.len(), 16);
        assert!(ubo.buffer().is_none());
        assert_eq!(ubo.generation(), 0);
        assert!(ubo.capacity() >= 64);
    }
}
