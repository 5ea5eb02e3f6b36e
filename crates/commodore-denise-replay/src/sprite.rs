//! One hardware sprite channel as Denise sees it.

use amiga_dma_trace::custom_regs::{SPR0CTL, SPR0DATA, SPR0DATB, SPR0POS, SPRITE_STRIDE};

/// Serial state of one sprite.
///
/// Vertical start and stop are Agnus' business (it decides when to fetch
/// data words); Denise only needs the horizontal comparator, the attach bit
/// and the two data words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteUnit {
    /// Comparator enabled: set by a SPRxDATA write, cleared by SPRxCTL.
    pub armed: bool,
    /// Lo-res beam column (9 bits) at which the data words load.
    pub hstart: u16,
    pub attach: bool,
    pub data: u16,
    pub datb: u16,
    pub shift_a: u16,
    pub shift_b: u16,
}

impl SpriteUnit {
    /// Writing SPRxCTL disables the horizontal comparator.
    pub fn write_ctl(&mut self, val: u16) {
        self.armed = false;
        self.hstart = (self.hstart & !1) | (val & 1);
        self.attach = val & 0x0080 != 0;
    }

    pub fn write_pos(&mut self, val: u16) {
        self.hstart = ((val & 0x00FF) << 1) | (self.hstart & 1);
    }

    /// Writing SPRxDATA arms the comparator.
    pub fn write_data(&mut self, val: u16) {
        self.armed = true;
        self.data = val;
    }

    pub fn write_datb(&mut self, val: u16) {
        self.datb = val;
    }

    /// Advance one lo-res pixel: load at the comparator match, else shift.
    pub fn clock(&mut self, hpos: i32) {
        if self.armed && i32::from(self.hstart) == hpos {
            self.shift_a = self.data;
            self.shift_b = self.datb;
        } else {
            self.shift_a <<= 1;
            self.shift_b <<= 1;
        }
    }

    /// 2-bit colour code currently at the shifter outputs.
    #[must_use]
    pub fn code(&self) -> u8 {
        (((self.shift_b >> 15) << 1) | (self.shift_a >> 15)) as u8
    }
}

/// Which register of which sprite an offset names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpriteRegister {
    Pos(usize),
    Ctl(usize),
    Data(usize),
    Datb(usize),
}

impl SpriteRegister {
    pub(crate) fn decode(offset: u16) -> Option<Self> {
        if !(SPR0POS..SPR0POS + 8 * SPRITE_STRIDE).contains(&offset) {
            return None;
        }
        let sprite = usize::from((offset - SPR0POS) / SPRITE_STRIDE);
        match SPR0POS + (offset - SPR0POS) % SPRITE_STRIDE {
            SPR0POS => Some(Self::Pos(sprite)),
            SPR0CTL => Some(Self::Ctl(sprite)),
            SPR0DATA => Some(Self::Data(sprite)),
            SPR0DATB => Some(Self::Datb(sprite)),
            _ => None,
        }
    }
}
