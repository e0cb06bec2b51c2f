//! Material, light and instance tables.
//!
//! Each table owns its CPU records and a [`UniformBuffer`](super::uniform::UniformBuffer)
//! and packs itself into the block layout declared by the pass shaders. Every
//! `build` starts from an empty buffer, so rebuilding with the same input
//! yields the same bytes.

mod error;
mod instance;
mod light;
mod material;

pub use error::TableError;
pub use instance::{
    INSTANCE_BLOCK_SIZE, INSTANCE_HEADER_SIZE, INSTANCE_STRIDE, InstanceMatrices, InstanceTable,
    MAX_INSTANCES, pack_instances,
};
pub use light::{
    LIGHT_BLOCK_SIZE, LIGHT_HEADER_SIZE, LIGHT_STRIDE, Light, LightTable, MAX_LIGHTS, Spot,
    pack_lights,
};
pub use material::{
    MATERIAL_BLOCK_SIZE, MATERIAL_STRIDE, MAX_MATERIALS, Material, MaterialId, MaterialTable,
    pack_materials,
};
