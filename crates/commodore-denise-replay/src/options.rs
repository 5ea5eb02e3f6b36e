//! Replay configuration.

/// Per-plane and per-sprite visibility toggles.
///
/// A hidden plane reads as 0 in every pixel; a hidden sprite never wins
/// sprite priority. Neither changes what the chips latch, only what is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplayOptions {
    pub planes: [bool; 8],
    pub sprites: [bool; 8],
}

impl ReplayOptions {
    #[must_use]
    pub fn with_plane(mut self, plane: usize, visible: bool) -> Self {
        self.planes[plane & 7] = visible;
        self
    }

    #[must_use]
    pub fn with_sprite(mut self, sprite: usize, visible: bool) -> Self {
        self.sprites[sprite & 7] = visible;
        self
    }
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            planes: [true; 8],
            sprites: [true; 8],
        }
    }
}
