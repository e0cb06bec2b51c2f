//! GPU device + surface management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue with the limits the
//! deferred passes need, owns the window surface, and hands out one encoder
//! per acquired frame.

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::{DEFERRED_BYTES_PER_SAMPLE, GpuInit};
