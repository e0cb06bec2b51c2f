//! Penumbra engine crate.
//!
//! Deferred-shading building blocks (packed uniform blocks, material and
//! light tables, G-buffer, geometry and lighting passes) plus the platform
//! and GPU runtime the demos run on.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
