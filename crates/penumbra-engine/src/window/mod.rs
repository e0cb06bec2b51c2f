//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the demo window, and wires them to the GPU
//! layer and the per-frame application callback.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
