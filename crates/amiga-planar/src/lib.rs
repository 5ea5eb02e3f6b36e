//! Amiga planar graphics decoding.
//!
//! Turns a [`ScreenLayout`] (plane pointers, modulos, mode flags) plus a
//! memory snapshot and a [`Palette`] into a packed `0xAABBGGRR` [`Raster`].
//! This is the static "what is in memory right now" view; the cycle-exact
//! view lives in `commodore-denise-replay`.

pub mod color;
mod decode;
mod error;
mod layout;
mod raster;
mod sprite;

pub use color::{HamOp, Palette};
pub use decode::{decode, pixel_index};
pub use error::{LayoutError, PlanarError};
pub use layout::{BitmapDescriptor, BitmapFlags, MAX_DIMENSION, ScreenKind, ScreenLayout};
pub use raster::{DISPLAY_HEIGHT, DISPLAY_LEFT, DISPLAY_TOP, DISPLAY_WIDTH, Raster, TRANSPARENT};
pub use sprite::{SPRITE_RECORD_LIMIT, SpriteLine, SpriteRecord, decode_sprite_records};
