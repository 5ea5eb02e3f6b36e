//! Packed RGBA output surfaces and the display crop used for beam-space
//! output.

use amiga_dma_trace::{CYCLES_PER_LINE, LINES_PER_FRAME};

/// First visible lo-res beam column (Denise `hpos`, after the +2 offset).
pub const DISPLAY_LEFT: u32 = 92;
/// First visible raster line.
pub const DISPLAY_TOP: u32 = 28;
/// Visible width in hi-res pixels: four per colour clock, minus the crop.
pub const DISPLAY_WIDTH: u32 = CYCLES_PER_LINE as u32 * 4 - DISPLAY_LEFT * 2;
/// Visible height in lines.
pub const DISPLAY_HEIGHT: u32 = LINES_PER_FRAME as u32 - 1 - DISPLAY_TOP;

/// Fully transparent black.
pub const TRANSPARENT: u32 = 0;

/// Row-major `0xAABBGGRR` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Raster {
    /// A transparent raster.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    #[must_use]
    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[self.index(x, y)])
    }

    /// Store a pixel; coordinates outside the raster are clipped.
    pub fn put(&mut self, x: i64, y: i64, color: u32) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let index = self.index(x as u32, y as u32);
        self.pixels[index] = color;
    }

    #[must_use]
    pub fn row(&self, y: u32) -> &[u32] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_crop_matches_pal_frame() {
        assert_eq!(DISPLAY_WIDTH, 724);
        assert_eq!(DISPLAY_HEIGHT, 284);
    }

    #[test]
    fn put_clips_out_of_range_coordinates() {
        let mut raster = Raster::new(4, 2);
        raster.put(-1, 0, 0xFFFF_FFFF);
        raster.put(4, 0, 0xFFFF_FFFF);
        raster.put(0, 2, 0xFFFF_FFFF);
        assert!(raster.pixels().iter().all(|&p| p == TRANSPARENT));

        raster.put(3, 1, 0xFF00_00FF);
        assert_eq!(raster.get(3, 1), Some(0xFF00_00FF));
        assert_eq!(raster.row(1), &[0, 0, 0, 0xFF00_00FF]);
        assert_eq!(raster.get(4, 1), None);
    }
}
