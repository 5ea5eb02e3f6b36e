//! Overdraw: count memory writes landing in each visible byte of a screen.

use amiga_dma_trace::{DmaRecord, records_before};
use amiga_planar::color::hsl_to_rgb;
use amiga_planar::{PlanarError, Raster, ScreenLayout, TRANSPARENT};
use log::debug;

/// Non-transparent entries of the heat ramp.
pub const HEAT_STEPS: usize = 240;

const HEAT_PER_WRITE: usize = 48;
const HEAT_ALPHA: u32 = 0xA000_0000;

/// Where a byte address sits inside a layout: `(plane, line, byte_x)`.
///
/// Planes are searched in order and the first one whose visible span of
/// some line holds `addr` wins. Modulo bytes between lines belong to no
/// line.
#[must_use]
pub fn locate_byte(layout: &ScreenLayout, addr: u32) -> Option<(usize, u32, u32)> {
    let row = i64::from(layout.bytes_per_row());
    if row == 0 {
        return None;
    }
    (0..layout.num_planes()).find_map(|plane| {
        let offset = i64::from(addr) - i64::from(layout.planes[plane]);
        let stride = layout.stride(plane);
        if offset < 0 {
            return None;
        }
        if stride > 0 && stride >= row {
            let (y, x) = (offset / stride, offset % stride);
            (y < i64::from(layout.height) && x < row).then_some((plane, y as u32, x as u32))
        } else {
            // Overlapping lines: take the first one that covers the byte.
            (0..layout.height).find_map(|y| {
                let x = offset - i64::from(y) * stride;
                (0..row).contains(&x).then_some((plane, y, x as u32))
            })
        }
    })
}

/// Per-plane write counts for every visible byte of a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdrawMap {
    layout: ScreenLayout,
    counts: Vec<Vec<u32>>,
}

impl OverdrawMap {
    fn new(layout: &ScreenLayout) -> Self {
        let cells = (layout.bytes_per_row() * layout.height) as usize;
        Self {
            layout: layout.clone(),
            counts: vec![vec![0; cells]; layout.num_planes()],
        }
    }

    fn cell(&self, byte_x: u32, y: u32) -> usize {
        (y * self.layout.bytes_per_row() + byte_x) as usize
    }

    fn touch(&mut self, addr: u32) -> bool {
        let Some((plane, y, x)) = locate_byte(&self.layout, addr) else {
            return false;
        };
        let cell = self.cell(x, y);
        self.counts[plane][cell] += 1;
        true
    }

    /// Writes counted for the byte at `addr`; 0 outside the layout.
    #[must_use]
    pub fn count_at(&self, addr: u32) -> u32 {
        locate_byte(&self.layout, addr)
            .map_or(0, |(plane, y, x)| self.counts[plane][self.cell(x, y)])
    }

    /// Writes to byte column `byte_x` of line `y`, summed over all planes.
    #[must_use]
    pub fn cell_total(&self, byte_x: u32, y: u32) -> u32 {
        if byte_x >= self.layout.bytes_per_row() || y >= self.layout.height {
            return 0;
        }
        let cell = self.cell(byte_x, y);
        self.counts.iter().map(|plane| plane[cell]).sum()
    }

    #[must_use]
    pub fn plane_counts(&self, plane: usize) -> Option<&[u32]> {
        self.counts.get(plane).map(Vec::as_slice)
    }

    #[must_use]
    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }
}

/// Count every CPU or blitter write before `cycle_bound` that lands in a
/// visible byte of `layout`. A multi-byte write counts once per byte.
///
/// # Errors
///
/// Fails when the layout itself is malformed.
pub fn analyze(
    layout: &ScreenLayout,
    records: &[DmaRecord],
    cycle_bound: usize,
) -> Result<OverdrawMap, PlanarError> {
    layout.validate()?;
    let mut map = OverdrawMap::new(layout);
    let mut counted = 0usize;
    for record in records_before(records, cycle_bound) {
        let Some(addr) = record.addr else {
            continue;
        };
        for byte in 0..record.written_bytes() {
            if map.touch(addr.wrapping_add(byte)) {
                counted += 1;
            }
        }
    }
    debug!("overdraw: {counted} byte writes inside the layout before cycle {cycle_bound}");
    Ok(map)
}

/// Heat-map colours: entry 0 is transparent, entries 1..=240 run from blue
/// through green to red, all at alpha `0xA0`.
#[must_use]
pub fn overdraw_ramp() -> Vec<u32> {
    let mut ramp = Vec::with_capacity(HEAT_STEPS + 1);
    ramp.push(TRANSPARENT);
    for i in 1..=HEAT_STEPS {
        let [r, g, b] = hsl_to_rgb((HEAT_STEPS - i) as f32, 1.0, 0.5);
        let channel = |c: f32| (c * 255.0) as u32;
        ramp.push(HEAT_ALPHA | (channel(b) << 16) | (channel(g) << 8) | channel(r));
    }
    ramp
}

/// Ramp entry for a write count.
#[must_use]
pub fn heat_index(count: u32) -> usize {
    (count as usize).saturating_mul(HEAT_PER_WRITE).min(HEAT_STEPS)
}

/// Paint the map: every byte cell becomes an 8-pixel run coloured by its
/// total write count.
#[must_use]
pub fn render(map: &OverdrawMap) -> Raster {
    let ramp = overdraw_ramp();
    let layout = map.layout();
    let mut raster = Raster::new(layout.width, layout.height);
    for y in 0..layout.height {
        for byte_x in 0..layout.bytes_per_row() {
            let color = ramp[heat_index(map.cell_total(byte_x, y))];
            if color == TRANSPARENT {
                continue;
            }
            for bit in 0..8 {
                raster.put(i64::from(byte_x * 8 + bit), i64::from(y), color);
            }
        }
    }
    raster
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ScreenLayout {
        // 32 pixels wide, 4 lines, 2 byte modulo; two planes.
        ScreenLayout::bitmap(32, 4, vec![0x1000, 0x2000]).with_modulos([2, 2])
    }

    #[test]
    fn three_writes_to_one_byte_count_three() {
        let addr = 0x1000 + 6 + 1; // line 1, byte 1
        let trace = vec![
            DmaRecord::cpu_write(addr, 0x00FF, 1),
            DmaRecord::default(),
            DmaRecord::cpu_write(addr, 0x0011, 1),
            DmaRecord::cpu_write(addr, 0x0022, 1),
        ];
        let map = analyze(&layout(), &trace, trace.len()).expect("valid layout");
        assert_eq!(map.count_at(addr), 3);
        assert_eq!(map.cell_total(1, 1), 3);

        let counts = map.plane_counts(0).expect("plane 0");
        assert_eq!(counts.iter().sum::<u32>(), 3, "no other byte counted");
        assert!(map.plane_counts(1).expect("plane 1").iter().all(|&c| c == 0));
    }

    #[test]
    fn word_and_long_writes_count_every_byte() {
        let trace = vec![
            DmaRecord::cpu_write(0x1000, 0, 4),
            DmaRecord::blitter_write(0x1002, 0),
        ];
        let map = analyze(&layout(), &trace, trace.len()).expect("valid layout");
        assert_eq!(map.count_at(0x1000), 1);
        assert_eq!(map.count_at(0x1001), 1);
        assert_eq!(map.count_at(0x1002), 2);
        assert_eq!(map.count_at(0x1003), 2);
    }

    #[test]
    fn modulo_bytes_and_reads_are_ignored() {
        let trace = vec![
            DmaRecord::cpu_write(0x1004, 0, 2), // modulo gap after line 0
            DmaRecord::chip_fetch(0x110, 0, 0x1000), // bitplane fetch
        ];
        let map = analyze(&layout(), &trace, trace.len()).expect("valid layout");
        assert_eq!(map.count_at(0x1004), 0);
        assert!((0..4).all(|x| map.cell_total(x, 0) == 0));
    }

    #[test]
    fn every_plane_is_searched() {
        let trace = vec![DmaRecord::cpu_write(0x2000 + 12 + 3, 0, 1)];
        let map = analyze(&layout(), &trace, trace.len()).expect("valid layout");
        assert_eq!(locate_byte(map.layout(), 0x2000 + 15), Some((1, 2, 3)));
        assert_eq!(map.cell_total(3, 2), 1);
    }

    #[test]
    fn empty_layout_is_rejected_not_divided_by() {
        let empty = ScreenLayout::bitmap(0, 4, vec![0x1000]);
        let trace = vec![DmaRecord::cpu_write(0x1000, 0, 1)];
        assert!(matches!(
            analyze(&empty, &trace, 1),
            Err(PlanarError::MalformedScreenLayout(_))
        ));
        assert_eq!(locate_byte(&empty, 0x1000), None);
    }

    #[test]
    fn zero_stride_lines_resolve_to_the_first_line() {
        // Modulo -2 on a 16 pixel line: every line starts at the same byte.
        let layout = ScreenLayout::bitmap(16, 4, vec![0x1000]).with_modulos([-2, -2]);
        assert_eq!(layout.stride(0), 0);
        assert_eq!(locate_byte(&layout, 0x1001), Some((0, 0, 1)));
        assert_eq!(locate_byte(&layout, 0x1002), None);
    }

    #[test]
    fn writes_after_the_bound_are_not_counted() {
        let trace = vec![
            DmaRecord::cpu_write(0x1000, 0, 1),
            DmaRecord::cpu_write(0x1000, 0, 1),
        ];
        let map = analyze(&layout(), &trace, 1).expect("valid layout");
        assert_eq!(map.count_at(0x1000), 1);
    }

    #[test]
    fn ramp_runs_blue_to_red() {
        let ramp = overdraw_ramp();
        assert_eq!(ramp.len(), 241);
        assert_eq!(ramp[0], TRANSPARENT);
        assert_eq!(ramp[240], 0xA000_00FF, "hue 0 is red");
        assert_eq!(ramp[120] & 0x00FF_FF00, 0x0000_FF00, "hue 120 is green");
        assert!(ramp[1..].iter().all(|&c| c >> 24 == 0xA0));
    }

    #[test]
    fn heat_index_scales_and_clamps() {
        assert_eq!(heat_index(0), 0);
        assert_eq!(heat_index(1), 48);
        assert_eq!(heat_index(5), 240);
        assert_eq!(heat_index(u32::MAX), 240);
    }

    #[test]
    fn render_paints_eight_pixels_per_byte() {
        let trace = vec![DmaRecord::cpu_write(0x1000 + 1, 0, 1)];
        let map = analyze(&layout(), &trace, trace.len()).expect("valid layout");
        let raster = render(&map);
        let hot = overdraw_ramp()[48];
        assert_eq!(&raster.row(0)[8..16], &[hot; 8]);
        assert_eq!(raster.get(7, 0), Some(TRANSPARENT));
        assert_eq!(raster.get(16, 0), Some(TRANSPARENT));
    }
}
