//! Whole-frame replay: run the chip state over a trace prefix and collect
//! the displayed raster.

use amiga_dma_trace::{CYCLES_PER_LINE, DmaRecord, records_before};
use amiga_planar::{DISPLAY_HEIGHT, DISPLAY_WIDTH, Raster};
use log::{debug, trace};

use crate::options::ReplayOptions;
use crate::state::ChipState;

/// Replay `records[..cycle_bound]` from the frame's initial register state
/// and return the displayed image as of that cycle.
///
/// The raster covers the visible display (`DISPLAY_WIDTH` x
/// `DISPLAY_HEIGHT` hi-res pixels). Pixels the beam has not reached by
/// `cycle_bound` stay transparent. The result depends only on the record
/// prefix and the initial state.
#[must_use]
pub fn simulate(
    records: &[DmaRecord],
    initial_regs: &[u16],
    dmacon: u16,
    options: &ReplayOptions,
    cycle_bound: usize,
) -> Raster {
    let mut state = ChipState::with_options(initial_regs, dmacon, *options);
    let mut raster = Raster::new(DISPLAY_WIDTH, DISPLAY_HEIGHT);
    let prefix = records_before(records, cycle_bound);

    for (cycle, record) in prefix.iter().enumerate() {
        if cycle % CYCLES_PER_LINE == 0 {
            trace!("simulate: line {}", cycle / CYCLES_PER_LINE);
        }
        for pixel in state.step(record).pixels {
            if let Some((x, y)) = pixel.display_position() {
                raster.put(x, y, pixel.color);
            }
        }
    }

    debug!(
        "simulate: replayed {} of {} records, beam at line {}",
        prefix.len(),
        records.len(),
        state.vpos
    );
    raster
}

#[cfg(test)]
mod tests {
    use super::*;
    use amiga_dma_trace::custom_regs::{
        BPL1DAT, BPLCON0, COLOR00, DIWSTOP, DIWSTRT, NUM_CUSTOM_REGS, STRHOR, color,
    };
    use amiga_dma_trace::{CYCLES_PER_FRAME, cycle_index};
    use amiga_planar::TRANSPARENT;
    use amiga_planar::color::rgb12_to_abgr;

    fn initial_regs() -> Vec<u16> {
        let mut words = vec![0u16; NUM_CUSTOM_REGS];
        let mut set = |offset: u16, val: u16| words[usize::from(offset >> 1)] = val;
        set(DIWSTRT, 0x2C81);
        set(DIWSTOP, 0x2CC1);
        set(BPLCON0, 0x1200);
        set(COLOR00, 0x00F);
        set(color(1), 0xFF0);
        words
    }

    /// A frame of line strobes with a BPL1DAT fetch of `dat` every 4 cycles
    /// inside the fetch window.
    fn frame_trace(dat: u16) -> Vec<DmaRecord> {
        let mut trace = vec![DmaRecord::default(); CYCLES_PER_FRAME];
        for line in 0..313 {
            trace[cycle_index(line, 0)] = DmaRecord::register_only(STRHOR, 0);
            for column in (0x38..0xD8).step_by(4) {
                trace[cycle_index(line, column)] = DmaRecord::chip_fetch(BPL1DAT, dat, 0x1000);
            }
        }
        trace
    }

    #[test]
    fn all_zero_bitplanes_show_color00_inside_window() {
        let trace = frame_trace(0);
        let raster = simulate(&trace, &initial_regs(), 0, &ReplayOptions::default(), trace.len());
        let background = rgb12_to_abgr(0x00F);

        // Line 0x40, well inside DIWSTRT..DIWSTOP horizontally.
        let y = 0x40 - amiga_planar::DISPLAY_TOP;
        let row = raster.row(y);
        let inside = &row[100..300];
        assert!(inside.iter().all(|&p| p == background));
        assert_eq!(row[0], TRANSPARENT, "left border is outside the window");
    }

    #[test]
    fn simulate_is_idempotent() {
        let trace = frame_trace(0xF0F0);
        let options = ReplayOptions::default();
        let bound = cycle_index(200, 100);
        let a = simulate(&trace, &initial_regs(), 0, &options, bound);
        let b = simulate(&trace, &initial_regs(), 0, &options, bound);
        assert_eq!(a, b);
    }

    #[test]
    fn earlier_bound_is_a_prefix_of_later_bound() {
        let trace = frame_trace(0x8421);
        let options = ReplayOptions::default();
        let early = simulate(&trace, &initial_regs(), 0, &options, cycle_index(100, 0));
        let late = simulate(&trace, &initial_regs(), 0, &options, cycle_index(150, 0));

        // Lines up to vpos 98 completed before the early bound.
        let last_complete = 98 - amiga_planar::DISPLAY_TOP;
        for y in 0..=last_complete {
            assert_eq!(early.row(y), late.row(y), "line {y} differs");
        }
        let unreached = 120 - amiga_planar::DISPLAY_TOP;
        assert!(early.row(unreached).iter().all(|&p| p == TRANSPARENT));
        assert!(late.row(unreached).iter().any(|&p| p != TRANSPARENT));
    }

    #[test]
    fn cpu_writes_between_fetches_do_not_change_the_picture() {
        let plain = frame_trace(0xF0F0);
        let mut busy = plain.clone();
        for line in 0x30..0x80 {
            busy[cycle_index(line, 0x39)] = DmaRecord::cpu_write(0x1000, 0xFFFF, 2);
            busy[cycle_index(line, 0x3A)] = DmaRecord::cpu_write(0x00DF_F180, 0x0F00, 2);
        }
        let options = ReplayOptions::default();
        let expected = simulate(&plain, &initial_regs(), 0, &options, plain.len());
        let raster = simulate(&busy, &initial_regs(), 0, &options, busy.len());
        assert_eq!(raster, expected);
    }

    #[test]
    fn zero_bound_leaves_raster_empty() {
        let trace = frame_trace(0xFFFF);
        let raster = simulate(&trace, &initial_regs(), 0, &ReplayOptions::default(), 0);
        assert!(raster.pixels().iter().all(|&p| p == TRANSPARENT));
        assert_eq!(raster.width(), 724);
        assert_eq!(raster.height(), 284);
    }

    #[test]
    fn set_bitplane_shows_color01() {
        let trace = frame_trace(0xFFFF);
        let raster = simulate(&trace, &initial_regs(), 0, &ReplayOptions::default(), trace.len());
        let y = 0x40 - amiga_planar::DISPLAY_TOP;
        assert_eq!(raster.get(200, y), Some(rgb12_to_abgr(0xFF0)));
    }
}
