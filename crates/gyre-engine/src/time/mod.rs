//! Frame timing.
//!
//! - one `FrameClock` per render loop, ticked once per presented frame
//! - one `FpsCounter` per window for the periodic frame-rate log

mod fps;
mod frame_clock;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
