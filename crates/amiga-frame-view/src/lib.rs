//! One captured Amiga frame and the views it supports.
//!
//! A [`FrameCapture`] owns the frame's DMA trace, the memory and register
//! state at the top of the frame, and the blit log. Every view takes the
//! cycle it should reflect as an explicit argument, so several views of
//! the same frame (say the static screen and the display replay) can be
//! computed side by side at different points in time.

mod capture;
mod probe;

pub use capture::FrameCapture;
pub use probe::{
    BeamProbe, ScreenProbe, cpu_cycle_at_display, cycle_at_display, probe_denise, probe_screen,
};
