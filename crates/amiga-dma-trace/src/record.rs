//! Per-cycle DMA records and frame timing.

use crate::custom_regs::BLTDDAT;

/// Colour clocks recorded per raster line (PAL).
pub const CYCLES_PER_LINE: usize = 227;
/// Raster lines recorded per frame (PAL long frame).
pub const LINES_PER_FRAME: usize = 313;
/// Total record slots in one captured frame.
pub const CYCLES_PER_FRAME: usize = CYCLES_PER_LINE * LINES_PER_FRAME;

/// Raw capture value meaning "this slot carried no bus address".
const NO_ADDRESS: u32 = 0xFFFF_FFFF;

const MODE_CPU: u16 = 0x1000;
const MODE_WRITE: u16 = 0x0100;

/// One colour-clock slot of the bus trace.
///
/// `reg` is the custom register offset the slot targeted (relative to
/// `$DFF000`), `addr` the chip bus address involved, and `mode` the access
/// flags: `0x1000` for a CPU access, `0x0100` when that access is a write,
/// and the access width in bytes in the low byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DmaRecord {
    pub reg: Option<u16>,
    pub dat: u16,
    pub addr: Option<u32>,
    pub mode: u16,
}

/// Decoded bus activity of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusAccess {
    /// No memory access in this slot.
    Idle,
    CpuRead { width: u8 },
    CpuWrite { width: u8 },
    /// Chip DMA fetch into a custom register (bitplane, sprite, copper...).
    ChipRead,
    /// Chip DMA store to memory (blitter D channel).
    ChipWrite,
}

impl DmaRecord {
    /// Build a record from the raw capture encoding, where an address of
    /// `0xFFFF_FFFF` stands for "no address".
    #[must_use]
    pub fn from_raw(reg: Option<u16>, dat: u16, addr: u32, mode: u16) -> Self {
        Self {
            reg,
            dat,
            addr: (addr != NO_ADDRESS).then_some(addr),
            mode,
        }
    }

    /// A chip DMA register fetch (e.g. BPL1DAT loaded from `addr`).
    #[must_use]
    pub const fn chip_fetch(reg: u16, dat: u16, addr: u32) -> Self {
        Self {
            reg: Some(reg),
            dat,
            addr: Some(addr),
            mode: 0,
        }
    }

    /// A register hit that did not touch memory (strobes, copper moves
    /// recorded without a bus address).
    #[must_use]
    pub const fn register_only(reg: u16, dat: u16) -> Self {
        Self {
            reg: Some(reg),
            dat,
            addr: None,
            mode: 0,
        }
    }

    /// A CPU write of `width` bytes to `addr`.
    #[must_use]
    pub const fn cpu_write(addr: u32, dat: u16, width: u8) -> Self {
        Self {
            reg: None,
            dat,
            addr: Some(addr),
            mode: MODE_CPU | MODE_WRITE | width as u16,
        }
    }

    /// A blitter D-channel store of one word to `addr`.
    #[must_use]
    pub const fn blitter_write(addr: u32, dat: u16) -> Self {
        Self {
            reg: Some(BLTDDAT),
            dat,
            addr: Some(addr),
            mode: 0,
        }
    }

    #[must_use]
    pub fn access(&self) -> BusAccess {
        if self.addr.is_none() {
            return BusAccess::Idle;
        }
        if self.mode & MODE_CPU != 0 {
            let width = (self.mode & 0x00FF) as u8;
            return if self.mode & MODE_WRITE != 0 {
                BusAccess::CpuWrite { width }
            } else {
                BusAccess::CpuRead { width }
            };
        }
        match self.reg {
            Some(BLTDDAT) => BusAccess::ChipWrite,
            Some(_) => BusAccess::ChipRead,
            None => BusAccess::Idle,
        }
    }

    /// Number of memory bytes this record stores, 0 for anything that is
    /// not a write. CPU widths other than 1, 2 or 4 are not writes.
    #[must_use]
    pub fn written_bytes(&self) -> u32 {
        match self.access() {
            BusAccess::CpuWrite { width: w @ (1 | 2 | 4) } => u32::from(w),
            BusAccess::ChipWrite => 2,
            _ => 0,
        }
    }
}

/// Record index of a beam position.
#[must_use]
pub const fn cycle_index(line: usize, column: usize) -> usize {
    line * CYCLES_PER_LINE + column
}

/// The prefix of `records` strictly before `cycle_bound`.
#[must_use]
pub fn records_before(records: &[DmaRecord], cycle_bound: usize) -> &[DmaRecord] {
    &records[..cycle_bound.min(records.len())]
}

/// One colour clock spans two 68000 clocks.
#[must_use]
pub const fn cpu_cycles_to_dma_cycles(cpu_cycles: u64) -> u64 {
    cpu_cycles / 2
}

#[must_use]
pub const fn dma_cycles_to_cpu_cycles(dma_cycles: u64) -> u64 {
    dma_cycles * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_sentinel_address_means_no_address() {
        let rec = DmaRecord::from_raw(Some(0x110), 0x1234, 0xFFFF_FFFF, 0);
        assert_eq!(rec.addr, None);
        assert_eq!(rec.access(), BusAccess::Idle);

        let rec = DmaRecord::from_raw(Some(0x110), 0x1234, 0x0000_2000, 0);
        assert_eq!(rec.addr, Some(0x2000));
        assert_eq!(rec.access(), BusAccess::ChipRead);
    }

    #[test]
    fn cpu_write_width_comes_from_mode_low_byte() {
        assert_eq!(
            DmaRecord::cpu_write(0x100, 0xAB, 1).access(),
            BusAccess::CpuWrite { width: 1 }
        );
        assert_eq!(DmaRecord::cpu_write(0x100, 0, 4).written_bytes(), 4);
        assert_eq!(DmaRecord::cpu_write(0x100, 0, 3).written_bytes(), 0);
    }

    #[test]
    fn cpu_read_is_not_a_write() {
        let rec = DmaRecord {
            reg: None,
            dat: 0,
            addr: Some(0x400),
            mode: MODE_CPU | 2,
        };
        assert_eq!(rec.access(), BusAccess::CpuRead { width: 2 });
        assert_eq!(rec.written_bytes(), 0);
    }

    #[test]
    fn blitter_store_is_a_two_byte_chip_write() {
        let rec = DmaRecord::blitter_write(0x8000, 0xFFFF);
        assert_eq!(rec.access(), BusAccess::ChipWrite);
        assert_eq!(rec.written_bytes(), 2);
    }

    #[test]
    fn cycle_index_is_line_major() {
        assert_eq!(cycle_index(0, 0), 0);
        assert_eq!(cycle_index(1, 0), CYCLES_PER_LINE);
        assert_eq!(cycle_index(2, 5), 2 * CYCLES_PER_LINE + 5);
    }

    #[test]
    fn records_before_clamps_to_trace_length() {
        let trace = vec![DmaRecord::default(); 10];
        assert_eq!(records_before(&trace, 4).len(), 4);
        assert_eq!(records_before(&trace, 400).len(), 10);
    }

    #[test]
    fn cpu_and_dma_cycle_conversion() {
        assert_eq!(cpu_cycles_to_dma_cycles(455), 227);
        assert_eq!(dma_cycles_to_cpu_cycles(227), 454);
    }
}
