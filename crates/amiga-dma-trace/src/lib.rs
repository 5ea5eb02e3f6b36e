//! Amiga DMA trace model: per-cycle bus records, custom register replay,
//! and byte-addressable memory snapshots.
//!
//! A captured frame is a flat list of [`DmaRecord`]s, one per colour clock,
//! indexed by `line * CYCLES_PER_LINE + column`. Everything downstream
//! (static bitmap decode, Denise replay, overlays) borrows that list and a
//! [`MemorySnapshot`] for the duration of one call.

pub mod custom_regs;
mod memory;
mod record;

pub use custom_regs::{CustomRegisters, RegisterAccess, register_access, set_clr_write};
pub use memory::{MemoryError, MemorySnapshot, MemoryView, Region};
pub use record::{
    BusAccess, CYCLES_PER_FRAME, CYCLES_PER_LINE, DmaRecord, LINES_PER_FRAME,
    cpu_cycles_to_dma_cycles, cycle_index, dma_cycles_to_cpu_cycles, records_before,
};
