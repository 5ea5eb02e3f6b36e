//! Blitter destination rectangles on a screen layout.

use amiga_planar::ScreenLayout;

/// One blit of the frame, as logged by the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlitDescriptor {
    /// D channel pointer at the start of the blit.
    pub dest: u32,
    /// BLTSIZE width in words.
    pub size_h_words: u16,
    /// BLTSIZE height in lines.
    pub size_v: u16,
    pub cycle_start: u32,
    pub cycle_end: u32,
}

/// Rectangle in screen pixels covered by a blit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    /// The blit is still running at the cycle bound.
    pub active: bool,
}

/// Rectangles of the blits that started by `cycle_bound` and write into
/// `layout`.
///
/// `blits` is in start order, so the scan ends at the first blit that has
/// not started yet. Blits drawing all planes of an interleaved bitmap at
/// once are `planes` times taller than the image, hence the division.
#[must_use]
pub fn extract(
    layout: &ScreenLayout,
    blits: &[BlitDescriptor],
    cycle_bound: usize,
) -> Vec<BlitRect> {
    let num_planes = layout.num_planes().max(1) as u32;
    blits
        .iter()
        .take_while(|blit| blit.cycle_start as usize <= cycle_bound)
        .filter_map(|blit| {
            let (left, top) = destination_origin(layout, blit.dest)?;
            Some(BlitRect {
                left,
                top,
                width: u32::from(blit.size_h_words) * 16,
                height: u32::from(blit.size_v) / num_planes,
                active: blit.cycle_end as usize > cycle_bound,
            })
        })
        .collect()
}

/// Pixel position of `dest` in the first plane whose memory span holds it.
fn destination_origin(layout: &ScreenLayout, dest: u32) -> Option<(u32, u32)> {
    layout.planes.iter().enumerate().find_map(|(plane, &start)| {
        let stride = layout.stride(plane);
        let offset = i64::from(dest) - i64::from(start);
        let span = i64::from(layout.height) * stride;
        (stride > 0 && (0..span).contains(&offset))
            .then(|| (((offset % stride) * 8) as u32, (offset / stride) as u32))
    })
}
