use glam::Mat4;

use super::error::TableError;
use super::material::{MAX_MATERIALS, MaterialId};
use crate::render::uniform::{PackedBuffer, UniformBuffer};

/// Instances per draw batch.
pub const MAX_INSTANCES: usize = 100;

/// Header chunk: the batch's material id.
pub const INSTANCE_HEADER_SIZE: usize = 16;

/// Bytes per instance: three `mat4x4<f32>`.
pub const INSTANCE_STRIDE: usize = 192;

pub const INSTANCE_BLOCK_SIZE: usize = INSTANCE_HEADER_SIZE + MAX_INSTANCES * INSTANCE_STRIDE;

/// Per-instance transforms consumed by the geometry pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InstanceMatrices {
    pub mvp: Mat4,
    pub modelview: Mat4,
    pub normal_matrix: Mat4,
}

impl InstanceMatrices {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        let modelview = view * model;
        Self {
            mvp: projection * modelview,
            modelview,
            normal_matrix: modelview.inverse().transpose(),
        }
    }
}

pub fn pack_instances(
    buf: &mut PackedBuffer,
    material: MaterialId,
    instances: &[InstanceMatrices],
) -> Result<(), TableError> {
    buf.clear();
    if material.index() >= MAX_MATERIALS {
        return Err(TableError::MaterialOutOfRange {
            id: material.0,
            capacity: MAX_MATERIALS,
        });
    }
    if instances.len() > MAX_INSTANCES {
        return Err(TableError::TooManyInstances {
            count: instances.len(),
            capacity: MAX_INSTANCES,
        });
    }

    buf.push(material.0);
    buf.finish_chunk();
    for inst in instances {
        buf.push(inst.mvp);
        buf.push(inst.modelview);
        buf.push(inst.normal_matrix);
    }
    Ok(())
}

/// Transform block for one instanced draw.
#[derive(Debug)]
pub struct InstanceTable {
    buffer: UniformBuffer,
    count: u32,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self {
            buffer: UniformBuffer::new("penumbra instances ubo", INSTANCE_BLOCK_SIZE),
            count: 0,
        }
    }

    pub fn build(
        &mut self,
        material: MaterialId,
        instances: &[InstanceMatrices],
    ) -> Result<(), TableError> {
        self.count = 0;
        pack_instances(&mut self.buffer, material, instances)?;
        self.count = instances.len() as u32;
        Ok(())
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        self.buffer.send_to_device(device, queue);
    }

    pub fn instance_count(&self) -> u32 {
        self.count
    }

    pub fn buffer(&self) -> &UniformBuffer {
        &self.buffer
    }
}

impl Default for InstanceTable {
    fn default() -> Self {
        Self::new()
    }
}
