use amiga_dma_trace::{CustomRegisters, DmaRecord, MemorySnapshot};
use amiga_gfx_overlay::{BlitDescriptor, BlitRect, OverdrawMap};
use amiga_planar::{Palette, PlanarError, Raster, ScreenLayout};
use commodore_denise_replay::ReplayOptions;
use log::debug;

/// Everything captured for one frame.
///
/// `memory` and `custom_regs` are the state at the start of the frame;
/// the `*_at` views roll them forward through `records` to a cycle.
/// Cycles are DMA cycles (colour clocks) from the top of the frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameCapture {
    pub memory: MemorySnapshot,
    pub records: Vec<DmaRecord>,
    /// Register dump indexed by `offset >> 1`.
    pub custom_regs: Vec<u16>,
    /// DMA enable latch at the start of the frame.
    pub dmacon: u16,
    pub blits: Vec<BlitDescriptor>,
}

impl FrameCapture {
    #[must_use]
    pub fn new(
        memory: MemorySnapshot,
        records: Vec<DmaRecord>,
        custom_regs: Vec<u16>,
        dmacon: u16,
    ) -> Self {
        Self {
            memory,
            records,
            custom_regs,
            dmacon,
            blits: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_blits(mut self, blits: Vec<BlitDescriptor>) -> Self {
        self.blits = blits;
        self
    }

    /// Memory after every CPU and blitter write before `cycle`.
    #[must_use]
    pub fn memory_at(&self, cycle: usize) -> MemorySnapshot {
        MemorySnapshot::after_dma(&self.memory, &self.records, cycle)
    }

    #[must_use]
    pub fn custom_regs_at(&self, cycle: usize) -> CustomRegisters {
        CustomRegisters::after_dma(&self.custom_regs, self.dmacon, &self.records, cycle)
    }

    /// The `COLORxx` palette in effect at `cycle`.
    #[must_use]
    pub fn palette_at(&self, cycle: usize) -> Palette {
        Palette::from_custom_regs(&self.custom_regs_at(cycle))
    }

    /// Static decode of `layout` from memory as it stood at `cycle`.
    pub fn screen_at(
        &self,
        layout: &ScreenLayout,
        mask: Option<&ScreenLayout>,
        palette: &Palette,
        cycle: usize,
    ) -> Result<Raster, PlanarError> {
        debug!("frame view: decoding {}x{} screen at cycle {cycle}", layout.width, layout.height);
        amiga_planar::decode(layout, &self.memory_at(cycle), palette, mask)
    }

    /// What the display chips had put on screen by `cycle`.
    #[must_use]
    pub fn denise_at(&self, options: &ReplayOptions, cycle: usize) -> Raster {
        commodore_denise_replay::simulate(
            &self.records,
            &self.custom_regs,
            self.dmacon,
            options,
            cycle,
        )
    }

    pub fn overdraw_at(
        &self,
        layout: &ScreenLayout,
        cycle: usize,
    ) -> Result<OverdrawMap, PlanarError> {
        amiga_gfx_overlay::analyze(layout, &self.records, cycle)
    }

    #[must_use]
    pub fn blit_rects_at(&self, layout: &ScreenLayout, cycle: usize) -> Vec<BlitRect> {
        amiga_gfx_overlay::extract(layout, &self.blits, cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amiga_dma_trace::custom_regs::{NUM_CUSTOM_REGS, color};

    fn capture() -> FrameCapture {
        let mut regs = vec![0u16; NUM_CUSTOM_REGS];
        regs[usize::from(color(0) >> 1)] = 0x000;
        let records = vec![
            DmaRecord::default(),
            DmaRecord::chip_fetch(color(0), 0x0F00, 0x00DF_F180),
            DmaRecord::cpu_write(0x10, 0xABCD, 2),
        ];
        FrameCapture::new(MemorySnapshot::linear(vec![0; 0x100]), records, regs, 0x8200)
    }

    #[test]
    fn palette_follows_color_writes() {
        let capture = capture();
        let black = capture.palette_at(1).get(0).expect("colour 0");
        let red = capture.palette_at(2).get(0).expect("colour 0");
        assert_eq!(black, 0xFF00_0000);
        assert_eq!(red, 0xFF00_00FF);
    }

    #[test]
    fn memory_follows_cpu_writes() {
        use amiga_dma_trace::MemoryView;
        let capture = capture();
        assert_eq!(capture.memory_at(2).read_word(0x10), Ok(0));
        assert_eq!(capture.memory_at(3).read_word(0x10), Ok(0xABCD));
        assert_eq!(capture.memory.read_word(0x10), Ok(0), "base snapshot untouched");
    }

    #[test]
    fn dmacon_comes_from_the_separate_latch() {
        assert_eq!(capture().custom_regs_at(0).dmacon(), 0x8200);
    }
}
