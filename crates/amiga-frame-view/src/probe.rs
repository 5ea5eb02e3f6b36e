//! Pixel probes: what sits under a point of a decoded screen or of the
//! display raster.

use amiga_dma_trace::{CYCLES_PER_LINE, MemoryView, dma_cycles_to_cpu_cycles};
use amiga_planar::{DISPLAY_LEFT, DISPLAY_TOP, PlanarError, ScreenLayout, pixel_index};
use commodore_denise_replay::HPOS_LINE_START;

/// Palette indices under one pixel of a static screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenProbe {
    pub x: u32,
    pub y: u32,
    pub color: u8,
    pub mask: Option<u8>,
}

/// Read the colour index (and mask index, if any) at `(x, y)` of `layout`.
/// Points outside the layout probe as `None`.
pub fn probe_screen(
    layout: &ScreenLayout,
    mask: Option<&ScreenLayout>,
    memory: &impl MemoryView,
    x: u32,
    y: u32,
) -> Result<Option<ScreenProbe>, PlanarError> {
    if x >= layout.width || y >= layout.height {
        return Ok(None);
    }
    let color = pixel_index(layout, memory, x, y)?;
    let mask = mask.map(|m| pixel_index(m, memory, x, y)).transpose()?;
    Ok(Some(ScreenProbe { x, y, color, mask }))
}

/// Beam coordinates behind one pixel of the display raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeamProbe {
    pub x: u32,
    pub y: u32,
    /// Denise horizontal counter (lo-res pixels).
    pub hpos: u32,
    pub vpos: u32,
    /// Agnus line and colour clock.
    pub line: u32,
    pub cck: u32,
}

#[must_use]
pub fn probe_denise(x: u32, y: u32) -> BeamProbe {
    let line = y + DISPLAY_TOP;
    BeamProbe {
        x,
        y,
        hpos: (x >> 1) + HPOS_LINE_START as u32 + DISPLAY_LEFT,
        vpos: line,
        line,
        cck: (x >> 2) + (DISPLAY_LEFT >> 1),
    }
}

/// Trace cycle at which the beam draws display pixel `(x, y)`; the seek
/// target for a click on the display raster.
#[must_use]
pub fn cycle_at_display(x: u32, y: u32) -> usize {
    let probe = probe_denise(x, y);
    probe.line as usize * CYCLES_PER_LINE + probe.cck as usize
}

/// [`cycle_at_display`] in CPU cycles.
#[must_use]
pub fn cpu_cycle_at_display(x: u32, y: u32) -> u64 {
    dma_cycles_to_cpu_cycles(cycle_at_display(x, y) as u64)
}
