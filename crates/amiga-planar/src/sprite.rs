//! Hardware sprite record streams as stored in chip memory.
//!
//! A stream is a sequence of `(pos, ctl)` control word pairs, each followed
//! by one `(data, datb)` pair per line, terminated by a `(0, 0)` pair.

use amiga_dma_trace::{MemoryError, MemoryView};
use log::{debug, warn};

/// Records walked before giving up on a stream with no terminator.
pub const SPRITE_RECORD_LIMIT: usize = 256;

/// One line of sprite image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteLine {
    pub data: u16,
    pub datb: u16,
}

impl SpriteLine {
    /// The 16 two-bit colour indices of the line, leftmost pixel first.
    /// Index 0 is transparent.
    #[must_use]
    pub fn indices(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        for (x, index) in out.iter_mut().enumerate() {
            let bit = 15 - x;
            let a = (self.data >> bit) & 1;
            let b = (self.datb >> bit) & 1;
            *index = ((b << 1) | a) as u8;
        }
        out
    }
}

/// One `(pos, ctl)` record and its image lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteRecord {
    pub vstart: u16,
    pub vstop: u16,
    /// Lo-res beam column of the leftmost pixel.
    pub hstart: u16,
    pub lines: Vec<SpriteLine>,
}

impl SpriteRecord {
    fn from_control(pos: u16, ctl: u16) -> Self {
        Self {
            vstart: (pos >> 8) | ((ctl & 0x0004) << 6),
            vstop: (ctl >> 8) | ((ctl & 0x0002) << 7),
            hstart: ((pos & 0x00FF) << 1) | (ctl & 0x0001),
            lines: Vec::new(),
        }
    }
}

struct WordCursor<'a, M> {
    memory: &'a M,
    /// `None` once the stream has run past the top of the address space.
    addr: Option<u32>,
}

impl<M: MemoryView> WordCursor<'_, M> {
    fn next(&mut self) -> Result<u16, MemoryError> {
        let addr = self
            .addr
            .ok_or(MemoryError::AddressOutOfRange { addr: u32::MAX })?;
        let word = self.memory.read_word(addr)?;
        self.addr = addr.checked_add(2);
        Ok(word)
    }
}

/// Walk the sprite record stream starting at `addr`.
///
/// Each record reads one line for every raster line in `vstart..=vstop`.
/// The inclusive bound is kept as the display hardware is commonly
/// modelled; a record with `vstop < vstart` yields no lines.
pub fn decode_sprite_records(
    memory: &impl MemoryView,
    addr: u32,
) -> Result<Vec<SpriteRecord>, MemoryError> {
    let mut cursor = WordCursor {
        memory,
        addr: Some(addr),
    };
    let mut records = Vec::new();

    for _ in 0..SPRITE_RECORD_LIMIT {
        let pos = cursor.next()?;
        let ctl = cursor.next()?;
        if pos == 0 && ctl == 0 {
            debug!("sprite stream: {} records", records.len());
            return Ok(records);
        }
        let mut record = SpriteRecord::from_control(pos, ctl);
        for _ in record.vstart..=record.vstop {
            let data = cursor.next()?;
            let datb = cursor.next()?;
            record.lines.push(SpriteLine { data, datb });
        }
        records.push(record);
    }

    warn!("sprite stream has no terminator after {SPRITE_RECORD_LIMIT} records, truncating");
    Ok(records)
}
