//! Chip state threaded through the replay, one DMA record at a time.

use amiga_dma_trace::custom_regs::{
    BPL1DAT, BPLCON0, BPLCON1, BPLCON2, DIWHIGH, DIWSTOP, DIWSTRT, STREQU, STRHOR, STRVBL,
    bpl_dat,
};
use amiga_dma_trace::{CustomRegisters, DmaRecord};
use amiga_planar::{DISPLAY_LEFT, DISPLAY_TOP, TRANSPARENT};
use log::trace;

use crate::options::ReplayOptions;
use crate::priority::{
    ModeFlags, compose_playfields, pixel_color, resolve_sprites, select_source,
};
use crate::sprite::{SpriteRegister, SpriteUnit};

/// Denise's horizontal counter value right after a line strobe.
pub const HPOS_LINE_START: i32 = 2;

const HAM_RESET: u32 = 0xFF00_0000;

/// One hi-res pixel produced by a step, at its beam position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BeamPixel {
    /// Lo-res horizontal counter when the pixel was produced.
    pub hpos: i32,
    pub vpos: i32,
    /// 0 or 1: which hi-res half of the lo-res pixel.
    pub half: u8,
    pub color: u32,
}

impl BeamPixel {
    /// Position in the cropped display raster, before clipping on the right
    /// and bottom. `None` left of or above the visible area.
    #[must_use]
    pub fn display_position(&self) -> Option<(i64, i64)> {
        let column = i64::from(self.hpos - HPOS_LINE_START) - i64::from(DISPLAY_LEFT);
        let line = i64::from(self.vpos) - i64::from(DISPLAY_TOP);
        (column >= 0 && line >= 0).then(|| (column * 2 + i64::from(self.half), line))
    }
}

/// The four hi-res pixels one colour clock produces, in beam order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutput {
    pub pixels: [BeamPixel; 4],
}

/// Everything the replay carries from one colour clock to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipState {
    /// Working copy of the custom register file.
    pub regs: CustomRegisters,
    /// Bitplane serial shifters, loaded from BPLxDAT on a BPL1DAT write.
    pub shifters: [u16; 8],
    /// Shifter output history; the scroll delay picks a bit out of it.
    pub scrollers: [u16; 8],
    pub sprites: [SpriteUnit; 8],
    /// Horizontal window start and stop (9-bit lo-res positions).
    pub hdiwstrt: u16,
    pub hdiwstop: u16,
    pub window: bool,
    /// BPLCON1 delay for odd and even planes.
    pub scroll: [u8; 2],
    /// Previous HAM colour.
    pub ham_carry: u32,
    pub hpos: i32,
    /// Line counter; -1 until the first line strobe.
    pub vpos: i32,
    pub options: ReplayOptions,
}

impl ChipState {
    /// State at the start of a frame. The window latches and scroll delay
    /// come from the register dump; `dmacon` replaces the DMACON image.
    #[must_use]
    pub fn new(initial_regs: &[u16], dmacon: u16) -> Self {
        Self::with_options(initial_regs, dmacon, ReplayOptions::default())
    }

    #[must_use]
    pub fn with_options(initial_regs: &[u16], dmacon: u16, options: ReplayOptions) -> Self {
        let regs = CustomRegisters::new(initial_regs, dmacon);
        let bplcon1 = regs.get(BPLCON1);
        Self {
            hdiwstrt: regs.get(DIWSTRT) & 0x00FF,
            hdiwstop: (regs.get(DIWSTOP) & 0x00FF) | 0x0100,
            scroll: split_scroll(bplcon1),
            regs,
            shifters: [0; 8],
            scrollers: [0; 8],
            sprites: [SpriteUnit::default(); 8],
            window: false,
            ham_carry: HAM_RESET,
            hpos: 0,
            vpos: -1,
            options,
        }
    }

    /// Advance one colour clock.
    pub fn step(&mut self, record: &DmaRecord) -> CycleOutput {
        self.regs.apply(record);
        if let Some(reg) = record.reg {
            self.register_event(reg, record.dat);
        }

        let mode = ModeFlags::from_regs(self.regs.get(BPLCON0), self.regs.get(BPLCON2));
        let scroll = mode.scroll(self.scroll);
        let mut pixels = [BeamPixel::default(); 4];

        for lores in 0..2 {
            if self.hpos == i32::from(self.hdiwstrt) {
                self.window = true;
            }
            if self.hpos - 1 == i32::from(self.hdiwstop) {
                self.window = false;
            }

            for sprite in &mut self.sprites {
                sprite.clock(self.hpos);
            }
            let sprite = resolve_sprites(&self.sprites, &self.options.sprites);

            for half in 0..2u8 {
                if mode.hires || half == 0 {
                    self.shift_planes();
                }
                let playfield = compose_playfields(self.sample_planes(&mode, scroll), &mode);
                let source = select_source(&sprite, &playfield, &mode);
                let resolved = pixel_color(source, &mode, &self.regs, self.ham_carry);
                self.ham_carry = resolved.carry;

                let color = if self.window && mode.num_planes > 0 {
                    resolved.color
                } else {
                    TRANSPARENT
                };
                pixels[lores * 2 + usize::from(half)] = BeamPixel {
                    hpos: self.hpos,
                    vpos: self.vpos,
                    half,
                    color,
                };
            }
            self.hpos += 1;
        }

        CycleOutput { pixels }
    }

    fn register_event(&mut self, reg: u16, dat: u16) {
        match reg {
            STRHOR | STRVBL | STREQU => {
                self.hpos = HPOS_LINE_START;
                self.vpos += 1;
                self.window = false;
                self.ham_carry = HAM_RESET;
                trace!("line strobe ${reg:03X}: vpos {}", self.vpos);
            }
            BPL1DAT => {
                for (plane, shifter) in self.shifters.iter_mut().enumerate() {
                    *shifter = self.regs.get(bpl_dat(plane));
                }
            }
            DIWSTRT => self.hdiwstrt = dat & 0x00FF,
            DIWSTOP => self.hdiwstop = (dat & 0x00FF) | 0x0100,
            DIWHIGH => {
                self.hdiwstrt = (self.hdiwstrt & 0x00FF) | (((dat >> 5) & 1) << 8);
                self.hdiwstop = (self.hdiwstop & 0x00FF) | (((dat >> 13) & 1) << 8);
            }
            BPLCON1 => self.scroll = split_scroll(dat),
            _ => match SpriteRegister::decode(reg) {
                Some(SpriteRegister::Pos(i)) => self.sprites[i].write_pos(dat),
                Some(SpriteRegister::Ctl(i)) => self.sprites[i].write_ctl(dat),
                Some(SpriteRegister::Data(i)) => self.sprites[i].write_data(dat),
                Some(SpriteRegister::Datb(i)) => self.sprites[i].write_datb(dat),
                None => {}
            },
        }
    }

    fn shift_planes(&mut self) {
        for (scroller, shifter) in self.scrollers.iter_mut().zip(&mut self.shifters) {
            *scroller = (*scroller << 1) | (*shifter >> 15);
            *shifter <<= 1;
        }
    }

    /// Raw plane bits of the current pixel, delayed by the scroll value.
    fn sample_planes(&self, mode: &ModeFlags, scroll: [u8; 2]) -> u8 {
        let mut bpldata = 0u8;
        for plane in 0..mode.num_planes {
            if !self.options.planes[plane] {
                continue;
            }
            let bit = u32::from(scroll[plane & 1]);
            if (u32::from(self.scrollers[plane]) >> bit) & 1 != 0 {
                bpldata |= 1 << plane;
            }
        }
        bpldata
    }
}

fn split_scroll(bplcon1: u16) -> [u8; 2] {
    [(bplcon1 & 0xF) as u8, ((bplcon1 >> 4) & 0xF) as u8]
}
