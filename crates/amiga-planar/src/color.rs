//! Colour conversion: OCS 12-bit registers to packed `0xAABBGGRR`, the
//! extra-half-brite and hold-and-modify derivations, and the HSL ramp used
//! by the heat-map overlay.

use amiga_dma_trace::{CustomRegisters, MemoryError, MemoryView};

use crate::error::PlanarError;

const OPAQUE: u32 = 0xFF00_0000;

/// Expand a 12-bit `0x0RGB` colour register to opaque `0xAABBGGRR`.
#[must_use]
pub fn rgb12_to_abgr(rgb12: u16) -> u32 {
    let r = u32::from((rgb12 >> 8) & 0xF);
    let g = u32::from((rgb12 >> 4) & 0xF);
    let b = u32::from(rgb12 & 0xF);
    OPAQUE | ((b << 4 | b) << 16) | ((g << 4 | g) << 8) | (r << 4 | r)
}

/// The extra-half-brite variant of a colour register: every channel
/// shifted right by one.
#[must_use]
pub fn rgb12_to_abgr_ehb(rgb12: u16) -> u32 {
    rgb12_to_abgr((rgb12 >> 1) & 0x0777)
}

/// What a 6-bit HAM pixel does with the previous colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HamOp {
    /// Take a base palette colour (index 0..15).
    Set(u8),
    ModifyBlue(u8),
    ModifyRed(u8),
    ModifyGreen(u8),
}

impl HamOp {
    /// Split a HAM pixel index: bits 5..4 select the operation, bits 3..0
    /// carry the palette index or channel nibble.
    #[must_use]
    pub const fn decode(index: u8) -> Self {
        let nibble = index & 0x0F;
        match (index >> 4) & 0x03 {
            0 => Self::Set(nibble),
            1 => Self::ModifyBlue(nibble),
            2 => Self::ModifyRed(nibble),
            _ => Self::ModifyGreen(nibble),
        }
    }

    /// Apply a modify operation to `prev`. `Set` has no channel to modify
    /// and returns `None`; the caller resolves it through its palette.
    #[must_use]
    pub fn modify(self, prev: u32) -> Option<u32> {
        let (shift, nibble): (u32, u8) = match self {
            Self::Set(_) => return None,
            Self::ModifyBlue(n) => (16, n),
            Self::ModifyGreen(n) => (8, n),
            Self::ModifyRed(n) => (0, n),
        };
        let byte = (u32::from(nibble) << 4) | u32::from(nibble);
        Some((prev & !(0xFF << shift)) | (byte << shift))
    }
}

/// HSL to RGB, `h` in degrees `[0, 360]`, `s` and `l` in `[0, 1]`;
/// channels returned in `[0, 1]`.
#[must_use]
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let a = s * l.min(1.0 - l);
    let f = |n: f32| {
        let k = (n + h / 30.0) % 12.0;
        l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };
    [f(0.0), f(8.0), f(4.0)]
}

/// A resolved palette of packed `0xAABBGGRR` colours.
///
/// Palettes built from 12-bit sources carry the base colours followed by
/// their half-brite variants, so an EHB pixel index 32..63 resolves by plain
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<u32>,
}

impl Palette {
    #[must_use]
    pub fn from_colors(colors: Vec<u32>) -> Self {
        Self { colors }
    }

    /// Base colours then half-brite colours.
    #[must_use]
    pub fn from_rgb12(entries: &[u16]) -> Self {
        let colors = entries
            .iter()
            .map(|&c| rgb12_to_abgr(c))
            .chain(entries.iter().map(|&c| rgb12_to_abgr_ehb(c)))
            .collect();
        Self { colors }
    }

    /// The 32 `COLORxx` registers (plus half-brite variants).
    #[must_use]
    pub fn from_custom_regs(regs: &CustomRegisters) -> Self {
        let entries: Vec<u16> = (0..32).map(|i| regs.color(i)).collect();
        Self::from_rgb12(&entries)
    }

    /// `num_entries` 12-bit colour words stored in memory at `addr`.
    pub fn from_memory(
        memory: &impl MemoryView,
        addr: u32,
        num_entries: usize,
    ) -> Result<Self, MemoryError> {
        let entries = (0..num_entries as u32)
            .map(|i| memory.read_word(addr + i * 2).map(|w| w & 0x0FFF))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_rgb12(&entries))
    }

    pub fn get(&self, index: usize) -> Result<u32, PlanarError> {
        self.colors
            .get(index)
            .copied()
            .ok_or(PlanarError::PaletteIndexOutOfRange {
                index,
                len: self.colors.len(),
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.colors
    }
}
