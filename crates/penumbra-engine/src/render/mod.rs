//! GPU rendering subsystem.
//!
//! Deferred shading in two passes: the geometry pass rasterizes instanced
//! batches into a [`GBuffer`](gbuffer::GBuffer); the lighting pass shades
//! each pixel from it using the material and light uniform blocks.
//!
//! Convention:
//! - Lighting happens in view space; tables move lights there when packing.
//! - Uniform blocks are packed with std140-style 16-byte chunks.

mod ctx;
mod deferred;
pub mod gbuffer;
pub mod mesh;
pub mod passes;
pub mod shading;
pub mod tables;
pub mod uniform;

pub use ctx::{RenderCtx, RenderTarget};
pub use deferred::{DeferredRenderer, DeferredScene};
