//! Uniform block packing.
//!
//! `PackedBuffer` builds a byte-exact image of a uniform block on the CPU;
//! `UniformBuffer` owns one and uploads it. WGSL's uniform address space lays
//! out `vec3`/`vec4`/`mat4x4`/struct arrays the same way std140 does, so the
//! same chunk rule serves both.

mod buffer;
mod packed;
mod value;

pub use buffer::UniformBuffer;
pub use packed::{CHUNK_SIZE, PackedBuffer};
pub use value::Std140Value;
