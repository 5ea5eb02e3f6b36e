//! Byte-addressable memory snapshots.
//!
//! A snapshot is a set of disjoint regions (chip RAM, slow RAM, ROM...).
//! Reads outside every region fail instead of wrapping: a layout pointing
//! past the captured memory is a caller bug worth surfacing.

use log::debug;

use crate::record::{DmaRecord, records_before};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("address ${addr:08X} is outside the captured memory")]
    AddressOutOfRange { addr: u32 },
}

/// Read access to a memory image.
pub trait MemoryView {
    fn read_byte(&self, addr: u32) -> Result<u8, MemoryError>;

    /// Big-endian word at `addr`. The low byte never wraps to address 0.
    fn read_word(&self, addr: u32) -> Result<u16, MemoryError> {
        let hi = self.read_byte(addr)?;
        let next = addr
            .checked_add(1)
            .ok_or(MemoryError::AddressOutOfRange { addr })?;
        let lo = self.read_byte(next)?;
        Ok((u16::from(hi) << 8) | u16::from(lo))
    }
}

/// One contiguous span of captured memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub start: u32,
    pub bytes: Vec<u8>,
    /// Whether trace writes may land here (RAM) or not (ROM).
    pub writable: bool,
}

impl Region {
    fn contains(&self, addr: u32) -> bool {
        addr >= self.start && u64::from(addr - self.start) < self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    regions: Vec<Region>,
}

impl MemorySnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single writable region at address 0, i.e. a chip RAM dump.
    #[must_use]
    pub fn linear(bytes: Vec<u8>) -> Self {
        Self::new().with_region(0, bytes, true)
    }

    /// Add a region. Regions are kept sorted by start address; overlapping
    /// regions resolve to the one with the lowest start.
    #[must_use]
    pub fn with_region(mut self, start: u32, bytes: Vec<u8>, writable: bool) -> Self {
        let at = self.regions.partition_point(|r| r.start <= start);
        self.regions.insert(
            at,
            Region {
                start,
                bytes,
                writable,
            },
        );
        self
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    fn region_of(&self, addr: u32) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(addr))
    }

    #[must_use]
    pub fn is_writable(&self, addr: u32) -> bool {
        self.region_of(addr).is_some_and(|r| r.writable)
    }

    /// Store a byte. Writes to ROM or unmapped addresses are ignored, the
    /// same as on the real bus.
    pub fn write_byte(&mut self, addr: u32, val: u8) {
        if let Some(region) = self
            .regions
            .iter_mut()
            .find(|r| r.writable && r.contains(addr))
        {
            region.bytes[(addr - region.start) as usize] = val;
        }
    }

    pub fn write_word(&mut self, addr: u32, val: u16) {
        self.write_byte(addr, (val >> 8) as u8);
        if let Some(next) = addr.checked_add(1) {
            self.write_byte(next, val as u8);
        }
    }

    /// Roll `base` forward by every memory write recorded before
    /// `cycle_bound`.
    ///
    /// Byte-wide CPU writes store the low data byte; every other write stores
    /// the 16-bit data word at the record address (the trace only carries
    /// 16 data bits per slot, so a long write contributes one word).
    #[must_use]
    pub fn after_dma(base: &Self, records: &[DmaRecord], cycle_bound: usize) -> Self {
        let mut mem = base.clone();
        let mut applied = 0usize;
        for record in records_before(records, cycle_bound) {
            let Some(addr) = record.addr else {
                continue;
            };
            match record.written_bytes() {
                0 => continue,
                1 => mem.write_byte(addr, record.dat as u8),
                _ => mem.write_word(addr, record.dat),
            }
            applied += 1;
        }
        debug!("after_dma: applied {applied} writes before cycle {cycle_bound}");
        mem
    }
}

impl MemoryView for MemorySnapshot {
    fn read_byte(&self, addr: u32) -> Result<u8, MemoryError> {
        self.region_of(addr)
            .map(|r| r.bytes[(addr - r.start) as usize])
            .ok_or(MemoryError::AddressOutOfRange { addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_big_endian() {
        let mem = MemorySnapshot::linear(vec![0x12, 0x34, 0x56]);
        assert_eq!(mem.read_word(0), Ok(0x1234));
        assert_eq!(mem.read_word(1), Ok(0x3456));
    }

    #[test]
    fn reads_past_the_end_fail_without_wrapping() {
        let mem = MemorySnapshot::linear(vec![0; 16]);
        assert_eq!(
            mem.read_byte(16),
            Err(MemoryError::AddressOutOfRange { addr: 16 })
        );
        assert_eq!(
            mem.read_word(15),
            Err(MemoryError::AddressOutOfRange { addr: 16 })
        );
    }

    #[test]
    fn sparse_regions_resolve_independently() {
        let mem = MemorySnapshot::new()
            .with_region(0xF8_0000, vec![0xAA; 4], false)
            .with_region(0, vec![0x55; 4], true);
        assert_eq!(mem.read_byte(3), Ok(0x55));
        assert_eq!(mem.read_byte(0xF8_0002), Ok(0xAA));
        assert!(mem.read_byte(0x10_0000).is_err());
        assert!(mem.is_writable(0));
        assert!(!mem.is_writable(0xF8_0000));
    }

    #[test]
    fn words_do_not_wrap_past_the_top_of_memory() {
        let mut mem = MemorySnapshot::new()
            .with_region(0xFFFF_FF00, vec![0x77; 0x100], true)
            .with_region(0, vec![0x00; 4], true);
        assert_eq!(
            mem.read_word(0xFFFF_FFFF),
            Err(MemoryError::AddressOutOfRange { addr: 0xFFFF_FFFF })
        );
        assert_eq!(mem.read_word(0xFFFF_FFFE), Ok(0x7777));

        mem.write_word(0xFFFF_FFFF, 0x1234);
        assert_eq!(mem.read_byte(0xFFFF_FFFF), Ok(0x12));
        assert_eq!(mem.read_byte(0), Ok(0x00), "low byte is dropped, not wrapped");
    }

    #[test]
    fn writes_to_rom_are_ignored() {
        let mut mem = MemorySnapshot::new().with_region(0xF8_0000, vec![0xAA; 4], false);
        mem.write_word(0xF8_0000, 0x1234);
        assert_eq!(mem.read_word(0xF8_0000), Ok(0xAAAA));
    }

    #[test]
    fn after_dma_applies_only_the_prefix() {
        let base = MemorySnapshot::linear(vec![0; 8]);
        let trace = vec![
            DmaRecord::cpu_write(0, 0x00AB, 1),
            DmaRecord::default(),
            DmaRecord::blitter_write(2, 0xBEEF),
            DmaRecord::cpu_write(4, 0x1234, 2),
        ];

        let mem = MemorySnapshot::after_dma(&base, &trace, 3);
        assert_eq!(mem.read_byte(0), Ok(0xAB));
        assert_eq!(mem.read_word(2), Ok(0xBEEF));
        assert_eq!(mem.read_word(4), Ok(0x0000));
        assert_eq!(base.read_byte(0), Ok(0), "base snapshot must not change");

        let full = MemorySnapshot::after_dma(&base, &trace, trace.len());
        assert_eq!(full.read_word(4), Ok(0x1234));
    }

    #[test]
    fn after_dma_ignores_chip_reads_and_unmapped_writes() {
        let base = MemorySnapshot::linear(vec![0x11; 4]);
        let trace = vec![
            DmaRecord::chip_fetch(0x110, 0xFFFF, 0),
            DmaRecord::cpu_write(0x100, 0xFFFF, 2),
        ];
        let mem = MemorySnapshot::after_dma(&base, &trace, trace.len());
        assert_eq!(mem, base);
    }

    #[test]
    fn after_dma_is_deterministic() {
        let base = MemorySnapshot::linear(vec![0; 64]);
        let trace: Vec<DmaRecord> = (0..32u16)
            .map(|i| DmaRecord::cpu_write(u32::from(i) * 2, i * 0x0101, 2))
            .collect();
        assert_eq!(
            MemorySnapshot::after_dma(&base, &trace, 20),
            MemorySnapshot::after_dma(&base, &trace, 20)
        );
    }
}
