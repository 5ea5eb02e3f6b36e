//! Per-pixel decisions: sprite pair priority, dual-playfield split,
//! sprite versus playfield, and the final colour rule.
//!
//! Everything here is a pure function of its arguments so the cascade can
//! be checked without stepping a whole frame.

use amiga_dma_trace::CustomRegisters;
use amiga_planar::HamOp;
use amiga_planar::color::{rgb12_to_abgr, rgb12_to_abgr_ehb};

use crate::sprite::SpriteUnit;

/// Sprite code meaning "no sprite pixel here". Real codes are the sprite
/// pair number plus one (1..=4).
pub const NO_SPRITE: u8 = 7;

const SPRITE_COLOR_BASE: u8 = 16;

/// Display mode bits for one colour clock, from BPLCON0 and BPLCON2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub hires: bool,
    pub num_planes: usize,
    pub ham: bool,
    pub dual_playfield: bool,
    pub extra_half_brite: bool,
    /// PF2PRI: playfield 2 in front of playfield 1.
    pub pf2pri: bool,
    /// PF1P: sprite pairs with a code above this sit behind playfield 1.
    pub pf1p: u8,
    /// PF2P, likewise for playfield 2.
    pub pf2p: u8,
}

impl ModeFlags {
    #[must_use]
    pub fn from_regs(bplcon0: u16, bplcon2: u16) -> Self {
        let num_planes = usize::from((bplcon0 >> 12) & 0x7);
        let ham = bplcon0 & 0x0800 != 0;
        let dual_playfield = bplcon0 & 0x0400 != 0;
        Self {
            hires: bplcon0 & 0x8000 != 0,
            num_planes,
            ham,
            dual_playfield,
            extra_half_brite: num_planes == 6 && !ham && !dual_playfield,
            pf2pri: bplcon2 & 0x0040 != 0,
            pf1p: (bplcon2 & 0x7) as u8,
            pf2p: ((bplcon2 >> 3) & 0x7) as u8,
        }
    }

    /// BPLCON1 delays in the current resolution: hi-res counts twice as many
    /// pixels per lo-res step.
    #[must_use]
    pub fn scroll(&self, scroll: [u8; 2]) -> [u8; 2] {
        if self.hires {
            [scroll[0] << 1, scroll[1] << 1]
        } else {
            scroll
        }
    }
}

/// Sprite pair priority outcome for one lo-res pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteSample {
    /// Winning pair plus one, or [`NO_SPRITE`].
    pub code: u8,
    /// 2-bit colour (4-bit when attached).
    pub data: u8,
    pub attached: bool,
}

impl SpriteSample {
    pub const NONE: Self = Self {
        code: NO_SPRITE,
        data: 0,
        attached: false,
    };

    /// Palette index of the sprite pixel, or `None` when no sprite shows.
    #[must_use]
    pub fn color_index(&self) -> Option<u8> {
        if self.code == NO_SPRITE {
            None
        } else if self.attached {
            Some(SPRITE_COLOR_BASE + self.data)
        } else {
            Some(SPRITE_COLOR_BASE + (self.code - 1) * 4 + self.data)
        }
    }
}

/// Pick the sprite pixel among the eight units. The lowest pair with any
/// pixel wins; an attached pair (odd sprite's attach bit) combines both
/// codes into 4 bits, odd sprite high.
#[must_use]
pub fn resolve_sprites(units: &[SpriteUnit; 8], visible: &[bool; 8]) -> SpriteSample {
    for pair in 0..4 {
        let even = pair * 2;
        let odd = even + 1;
        let (even_code, odd_code) = (units[even].code(), units[odd].code());
        if even_code == 0 && odd_code == 0 {
            continue;
        }

        let mut data = 0;
        let attached = units[odd].attach;
        if attached {
            if visible[even] {
                data |= even_code;
            }
            if visible[odd] {
                data |= odd_code << 2;
            }
        } else if even_code != 0 && visible[even] {
            data = even_code;
        } else if visible[odd] {
            data = odd_code;
        }

        if data == 0 {
            return SpriteSample::NONE;
        }
        return SpriteSample {
            code: pair as u8 + 1,
            data,
            attached,
        };
    }
    SpriteSample::NONE
}

/// Playfield colour index for one hi-res pixel, and which playfields have a
/// non-zero pixel there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayfieldPixel {
    pub index: u8,
    pub pf1: bool,
    pub pf2: bool,
}

/// Split raw plane bits into playfields. In dual-playfield mode odd planes
/// (bits 0, 2, 4, 6) form playfield 1 and even planes (bits 1, 3, 5, 7)
/// playfield 2, whose colours start at 8. A single playfield reports itself
/// as playfield 2 so sprites compare against PF2P.
#[must_use]
pub fn compose_playfields(bpldata: u8, mode: &ModeFlags) -> PlayfieldPixel {
    if !mode.dual_playfield {
        return PlayfieldPixel {
            index: bpldata,
            pf1: false,
            pf2: bpldata != 0,
        };
    }

    let pf1_code = gather_bits(bpldata, 0);
    let pf2_code = gather_bits(bpldata, 1);
    let (pf1, pf2) = (pf1_code != 0, pf2_code != 0);
    let index = match (pf1, pf2) {
        (false, false) => 0,
        (true, true) if mode.pf2pri => 0x08 | pf2_code,
        (true, _) => pf1_code,
        (false, true) => 0x08 | pf2_code,
    };
    PlayfieldPixel { index, pf1, pf2 }
}

/// Every other bit of `bits` from `first`, packed into a 4-bit code.
fn gather_bits(bits: u8, first: u8) -> u8 {
    (0..4).fold(0, |code, i| code | (((bits >> (first + i * 2)) & 1) << i))
}

/// Where the colour of a pixel comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelSource {
    Sprite(u8),
    Playfield(u8),
}

/// Sprite versus playfield: a playfield hides the sprite when it has a
/// pixel here and the sprite pair code exceeds that playfield's priority
/// value.
#[must_use]
pub fn select_source(
    sprite: &SpriteSample,
    playfield: &PlayfieldPixel,
    mode: &ModeFlags,
) -> PixelSource {
    let Some(sprite_index) = sprite.color_index() else {
        return PixelSource::Playfield(playfield.index);
    };
    let pf1_front = sprite.code > mode.pf1p && playfield.pf1;
    let pf2_front = sprite.code > mode.pf2p && playfield.pf2;
    if pf1_front || pf2_front {
        PixelSource::Playfield(playfield.index)
    } else {
        PixelSource::Sprite(sprite_index)
    }
}

/// A colour and the HAM carry to use for the next pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColor {
    pub color: u32,
    pub carry: u32,
}

/// The colour decision table, in precedence order:
///
/// | source | mode | colour |
/// |---|---|---|
/// | sprite | any | `COLOR[index]` |
/// | playfield | HAM | set or modify the carry |
/// | playfield | EHB, bit 5 set | `COLOR[index & 31]` halved |
/// | playfield | otherwise | `COLOR[index & 31]` |
///
/// Only the HAM row changes the carry.
#[must_use]
pub fn pixel_color(
    source: PixelSource,
    mode: &ModeFlags,
    regs: &CustomRegisters,
    carry: u32,
) -> ResolvedColor {
    let color = match source {
        PixelSource::Sprite(index) => rgb12_to_abgr(regs.color(usize::from(index))),
        PixelSource::Playfield(index) if mode.ham => {
            let color = match HamOp::decode(index) {
                HamOp::Set(i) => rgb12_to_abgr(regs.color(usize::from(i))),
                op => op.modify(carry).unwrap_or(carry),
            };
            return ResolvedColor {
                color,
                carry: color,
            };
        }
        PixelSource::Playfield(index) if mode.extra_half_brite && index & 0x20 != 0 => {
            rgb12_to_abgr_ehb(regs.color(usize::from(index & 0x1F)))
        }
        PixelSource::Playfield(index) => rgb12_to_abgr(regs.color(usize::from(index & 0x1F))),
    };
    ResolvedColor { color, carry }
}
