//! Amiga custom chip register offsets and the working register file used
//! while replaying a trace.
//!
//! Custom registers live at $DFF000-$DFF1FF. Offsets below are relative to
//! $DFF000, the same encoding the trace uses in [`DmaRecord::reg`].

use crate::record::DmaRecord;

/// Number of word registers in the custom chip space.
pub const NUM_CUSTOM_REGS: usize = 0x100;

pub const BLTDDAT: u16 = 0x000;
pub const DMACONR: u16 = 0x002;
pub const STREQU: u16 = 0x038;
pub const STRVBL: u16 = 0x03A;
pub const STRHOR: u16 = 0x03C;
pub const DIWSTRT: u16 = 0x08E;
pub const DIWSTOP: u16 = 0x090;
pub const DMACON: u16 = 0x096;
pub const BPLCON0: u16 = 0x100;
pub const BPLCON1: u16 = 0x102;
pub const BPLCON2: u16 = 0x104;
pub const BPL1DAT: u16 = 0x110;
pub const SPR0POS: u16 = 0x140;
pub const SPR0CTL: u16 = 0x142;
pub const SPR0DATA: u16 = 0x144;
pub const SPR0DATB: u16 = 0x146;
/// Byte distance between consecutive sprites' POS/CTL/DATA/DATB groups.
pub const SPRITE_STRIDE: u16 = 8;
pub const COLOR00: u16 = 0x180;
pub const DIWHIGH: u16 = 0x1E4;

/// `BPLxDAT` offset for a 0-based plane index (BPL1DAT..BPL8DAT).
#[must_use]
pub const fn bpl_dat(plane: usize) -> u16 {
    BPL1DAT + (plane as u16) * 2
}

/// `COLORxx` offset for a palette index (COLOR00..COLOR31).
#[must_use]
pub const fn color(index: usize) -> u16 {
    COLOR00 + (index as u16) * 2
}

// DMACON bits
pub const DMAF_DMAEN: u16 = 1 << 9;
pub const DMAF_BPLEN: u16 = 1 << 8;
pub const DMAF_SPREN: u16 = 1 << 5;

/// How a register offset behaves on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterAccess {
    /// Read-only register; CPU/copper writes have no effect.
    Read,
    /// Normal write register; the written value is latched.
    Write,
    /// Strobe: the write itself is the event, the data is discarded.
    Strobe,
    /// No register at this offset.
    Unused,
}

impl RegisterAccess {
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

/// Classify a custom register offset (OCS/ECS plus the AGA extensions the
/// trace can mention).
#[must_use]
pub fn register_access(offset: u16) -> RegisterAccess {
    use RegisterAccess::{Read, Strobe, Unused, Write};

    if offset & 1 != 0 || offset >= 0x200 {
        return Unused;
    }
    match offset {
        // BLTDDAT, DMACONR, VPOSR, VHPOSR, DSKDATR, JOYxDAT, CLXDAT,
        // ADKCONR, POTxDAT, POTGOR, SERDATR, DSKBYTR, INTENAR, INTREQR
        0x000..=0x01E => Read,
        // DSKPT..JOYTEST
        0x020..=0x036 => Write,
        // STREQU, STRVBL, STRHOR, STRLONG
        0x038..=0x03E => Strobe,
        // Blitter control, pointers, BLTSIZE, ECS BLTCON0L/BLTSIZV/BLTSIZH
        0x040..=0x05E => Write,
        // Blitter modulos
        0x060..=0x066 => Write,
        0x068..=0x06E => Unused,
        // Blitter data
        0x070..=0x074 => Write,
        0x076 => Unused,
        // SPRHDAT, BPLHDAT (AGA)
        0x078 | 0x07A => Write,
        // DENISEID / LISAID
        0x07C => Read,
        // DSKSYNC, COP1LC, COP2LC
        0x07E..=0x086 => Write,
        // COPJMP1, COPJMP2
        0x088 | 0x08A => Strobe,
        // COPINS, DIWSTRT, DIWSTOP, DDFSTRT, DDFSTOP, DMACON, CLXCON,
        // INTENA, INTREQ, ADKCON
        0x08C..=0x09E => Write,
        // Audio channels: LCH, LCL, LEN, PER, VOL, DAT, then two unused words
        0x0A0..=0x0DE => {
            if (offset & 0x0F) >= 0x0C {
                Unused
            } else {
                Write
            }
        }
        // BPL1PT..BPL8PT
        0x0E0..=0x0FE => Write,
        // BPLCON0..BPLCON3, BPL1MOD, BPL2MOD, BPLCON4, CLXCON2
        0x100..=0x10E => Write,
        // BPL1DAT..BPL8DAT
        0x110..=0x11E => Write,
        // SPR0PT..SPR7PT
        0x120..=0x13E => Write,
        // SPRxPOS/CTL/DATA/DATB
        0x140..=0x17E => Write,
        // COLOR00..COLOR31
        0x180..=0x1BE => Write,
        // HHPOSR
        0x1DA => Read,
        // ECS beam/display registers, DIWHIGH, BPLHMOD, SPRHPT, BPLHPT
        0x1C0..=0x1EE => Write,
        0x1FC => Write,
        _ => Unused,
    }
}

/// Apply SET/CLR write logic used by DMACON, INTENA, INTREQ, ADKCON.
///
/// Bit 15 determines set (1) or clear (0) mode for bits 0-14.
pub fn set_clr_write(reg: &mut u16, val: u16) {
    if val & 0x8000 != 0 {
        *reg |= val & 0x7FFF;
    } else {
        *reg &= !(val & 0x7FFF);
    }
}

/// Working copy of the custom register file.
///
/// Seeded from the register dump taken at the start of a captured frame,
/// with `DMACON` replaced by the separately captured DMA enable state (the
/// dump holds the read-only `DMACONR` image, not the write latch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRegisters {
    regs: [u16; NUM_CUSTOM_REGS],
}

impl CustomRegisters {
    /// `initial` is indexed by word (`offset >> 1`); missing entries read 0.
    #[must_use]
    pub fn new(initial: &[u16], dmacon: u16) -> Self {
        let mut regs = [0u16; NUM_CUSTOM_REGS];
        let n = initial.len().min(NUM_CUSTOM_REGS);
        regs[..n].copy_from_slice(&initial[..n]);
        regs[usize::from(DMACON >> 1)] = dmacon;
        Self { regs }
    }

    /// Replay every register write in `records[..cycle_bound]` on top of the
    /// initial state.
    #[must_use]
    pub fn after_dma(
        initial: &[u16],
        dmacon: u16,
        records: &[DmaRecord],
        cycle_bound: usize,
    ) -> Self {
        let mut regs = Self::new(initial, dmacon);
        for record in crate::record::records_before(records, cycle_bound) {
            regs.apply(record);
        }
        regs
    }

    #[must_use]
    pub fn get(&self, offset: u16) -> u16 {
        self.regs[usize::from((offset >> 1) & 0xFF)]
    }

    /// Overwrite one register, bypassing the trace rules. Used to build
    /// fixtures and by collaborators that patch in copper-derived values.
    pub fn set(&mut self, offset: u16, val: u16) {
        self.regs[usize::from((offset >> 1) & 0xFF)] = val;
    }

    /// Apply one trace record. Only records that carry both a register and a
    /// bus address are latched; anything else leaves the file untouched.
    pub fn apply(&mut self, record: &DmaRecord) {
        let (Some(reg), Some(_)) = (record.reg, record.addr) else {
            return;
        };
        if reg == DMACON {
            set_clr_write(&mut self.regs[usize::from(DMACON >> 1)], record.dat);
        } else if register_access(reg).is_write() {
            self.set(reg, record.dat);
        }
    }

    /// 12-bit colour register `index` (0..32).
    #[must_use]
    pub fn color(&self, index: usize) -> u16 {
        self.get(color(index & 0x1F)) & 0x0FFF
    }

    #[must_use]
    pub fn dmacon(&self) -> u16 {
        self.get(DMACON)
    }
}

impl Default for CustomRegisters {
    fn default() -> Self {
        Self::new(&[], 0)
    }
}
