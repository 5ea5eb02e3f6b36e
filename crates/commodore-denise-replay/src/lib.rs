//! Commodore Denise display replay.
//!
//! Re-runs the video half of the chipset (Denise's bitplane shifters,
//! sprite engine and priority logic, plus the beam and window tracking
//! Agnus drives it with) over a captured per-cycle DMA trace. The result is
//! the image the chips actually put on screen up to a given cycle, including
//! every mid-frame register change the copper or CPU made.

mod options;
mod priority;
mod simulate;
mod sprite;
mod state;

pub use options::ReplayOptions;
pub use priority::{
    ModeFlags, NO_SPRITE, PixelSource, PlayfieldPixel, ResolvedColor, SpriteSample,
    compose_playfields, pixel_color, resolve_sprites, select_source,
};
pub use simulate::simulate;
pub use sprite::SpriteUnit;
pub use state::{BeamPixel, ChipState, CycleOutput, HPOS_LINE_START};
