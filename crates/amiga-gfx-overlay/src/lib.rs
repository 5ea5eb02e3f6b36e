//! Diagnostic overlays drawn over a decoded screen: how often each byte of
//! the bitmap was written during the frame, and where the blitter drew.

mod blit;
mod overdraw;

pub use blit::{BlitDescriptor, BlitRect, extract};
pub use overdraw::{
    HEAT_STEPS, OverdrawMap, analyze, heat_index, locate_byte, overdraw_ramp, render,
};
