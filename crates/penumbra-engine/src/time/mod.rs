//! Frame timing.
//!
//! One `FrameClock` per render loop; call `tick()` once per presented frame.
//! `FpsCounter` turns those ticks into a periodic frame-rate figure.

mod fps;
mod frame_clock;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
