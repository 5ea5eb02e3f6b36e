//! Static planar decode: read a layout straight out of a memory snapshot.

use amiga_dma_trace::MemoryView;
use log::debug;

use crate::color::{HamOp, Palette};
use crate::error::PlanarError;
use crate::layout::{ScreenKind, ScreenLayout};
use crate::raster::{DISPLAY_LEFT, DISPLAY_TOP, Raster, TRANSPARENT};
use crate::sprite::decode_sprite_records;

/// First palette entry used by sprites.
const SPRITE_COLOR_BASE: usize = 16;

/// Decode `layout` from `memory` into a fresh raster.
///
/// With a `mask`, the mask's pixel index is ANDed into the image index and
/// index 0 renders transparent (cookie-cut compositing). Sprite layouts
/// ignore the mask.
///
/// # Errors
///
/// Fails on an invalid layout or mask, on a read outside `memory`, or on a
/// pixel index the palette does not cover. No partial raster is returned.
pub fn decode(
    layout: &ScreenLayout,
    memory: &impl MemoryView,
    palette: &Palette,
    mask: Option<&ScreenLayout>,
) -> Result<Raster, PlanarError> {
    layout.validate()?;
    if layout.kind == ScreenKind::Sprite {
        return decode_sprites(layout, memory, palette);
    }
    if let Some(mask) = mask {
        layout.validate_mask(mask)?;
    }

    let mut raster = Raster::new(layout.width, layout.height);
    for y in 0..layout.height {
        let indices = row_indices(layout, memory, y)?;
        let mask_indices = mask.map(|m| row_indices(m, memory, y)).transpose()?;

        // HAM holds across a line only.
        let mut carry = palette.get(0)?;
        for (x, &index) in indices.iter().enumerate() {
            let color = if let Some(mask_indices) = &mask_indices {
                match index & mask_indices[x] {
                    0 => TRANSPARENT,
                    i => palette.get(usize::from(i))?,
                }
            } else if layout.ham {
                carry = ham_color(HamOp::decode(index), carry, palette)?;
                carry
            } else {
                palette.get(usize::from(index))?
            };
            raster.put(x as i64, i64::from(y), color);
        }
    }

    debug!(
        "decode: {}x{} {} planes{}{}",
        layout.width,
        layout.height,
        layout.num_planes(),
        if layout.ham { " HAM" } else { "" },
        if mask.is_some() { " masked" } else { "" },
    );
    Ok(raster)
}

/// Raw colour index of pixel (`x`, `y`): bit `p` comes from plane `p`.
///
/// # Errors
///
/// Fails on an invalid layout or a read outside `memory`.
pub fn pixel_index(
    layout: &ScreenLayout,
    memory: &impl MemoryView,
    x: u32,
    y: u32,
) -> Result<u8, PlanarError> {
    layout.validate()?;
    let bit = 7 - (x & 7);
    let mut index = 0u8;
    for plane in 0..layout.num_planes() {
        let byte = memory.read_byte(layout.byte_address(plane, y, x / 8))?;
        index |= ((byte >> bit) & 1) << plane;
    }
    Ok(index)
}

fn ham_color(op: HamOp, carry: u32, palette: &Palette) -> Result<u32, PlanarError> {
    match op {
        HamOp::Set(i) => palette.get(usize::from(i)),
        modify => Ok(modify.modify(carry).unwrap_or(carry)),
    }
}

/// Gather the pixel indices of line `y`, one byte of every plane at a time.
fn row_indices(
    layout: &ScreenLayout,
    memory: &impl MemoryView,
    y: u32,
) -> Result<Vec<u8>, PlanarError> {
    let mut indices = vec![0u8; layout.width as usize];
    for plane in 0..layout.num_planes() {
        for byte_x in 0..layout.bytes_per_row() {
            let byte = memory.read_byte(layout.byte_address(plane, y, byte_x))?;
            if byte == 0 {
                continue;
            }
            let pixels = &mut indices[byte_x as usize * 8..][..8];
            for (bit, index) in pixels.iter_mut().enumerate() {
                if byte & (0x80 >> bit) != 0 {
                    *index |= 1 << plane;
                }
            }
        }
    }
    Ok(indices)
}

fn decode_sprites(
    layout: &ScreenLayout,
    memory: &impl MemoryView,
    palette: &Palette,
) -> Result<Raster, PlanarError> {
    let mut raster = Raster::new(layout.width, layout.height);
    let records = decode_sprite_records(memory, layout.planes[0])?;
    for record in &records {
        for (row, line) in record.lines.iter().enumerate() {
            let y = i64::from(record.vstart) + row as i64 - i64::from(DISPLAY_TOP);
            for (x, &index) in line.indices().iter().enumerate() {
                if index == 0 {
                    continue;
                }
                let color = palette.get(SPRITE_COLOR_BASE + usize::from(index))?;
                let x = i64::from(record.hstart) + x as i64 - i64::from(DISPLAY_LEFT);
                raster.put(x, y, color);
            }
        }
    }
    debug!("decode: {} sprite records", records.len());
    Ok(raster)
}
