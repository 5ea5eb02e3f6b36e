//! Screen layouts: where each bitplane of a bitmap lives and how to step
//! from one line to the next.

use bitflags::bitflags;

use crate::error::LayoutError;

const MAX_PLANES: usize = 8;
/// Largest width or height the ECS blitter can address.
pub const MAX_DIMENSION: u32 = 0x8000;

/// How the plane pointers of a layout are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScreenKind {
    /// Planar bitmap, one pointer per plane.
    #[default]
    Normal,
    /// Hardware sprite: the single pointer is the start of a record stream.
    Sprite,
}

/// Plane pointers, modulos and mode flags of one screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreenLayout {
    pub kind: ScreenKind,
    /// Width in pixels; a multiple of 16.
    pub width: u32,
    pub height: u32,
    pub planes: Vec<u32>,
    /// Modulo added after each line: `[0]` for odd planes (BPL1MOD),
    /// `[1]` for even planes (BPL2MOD).
    pub modulos: [i32; 2],
    pub hires: bool,
    pub ham: bool,
}

impl ScreenLayout {
    #[must_use]
    pub fn bitmap(width: u32, height: u32, planes: Vec<u32>) -> Self {
        Self {
            kind: ScreenKind::Normal,
            width,
            height,
            planes,
            ..Self::default()
        }
    }

    /// A sprite layout whose records start at `addr`, rendered into a
    /// `width` x `height` raster.
    #[must_use]
    pub fn sprite(addr: u32, width: u32, height: u32) -> Self {
        Self {
            kind: ScreenKind::Sprite,
            width,
            height,
            planes: vec![addr],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_modulos(mut self, modulos: [i32; 2]) -> Self {
        self.modulos = modulos;
        self
    }

    #[must_use]
    pub fn with_ham(mut self, ham: bool) -> Self {
        self.ham = ham;
        self
    }

    #[must_use]
    pub fn num_planes(&self) -> usize {
        self.planes.len()
    }

    #[must_use]
    pub const fn bytes_per_row(&self) -> u32 {
        self.width / 8
    }

    /// Bytes between the starts of two consecutive lines of `plane`.
    #[must_use]
    pub fn stride(&self, plane: usize) -> i64 {
        i64::from(self.bytes_per_row()) + i64::from(self.modulos[plane & 1])
    }

    /// Address of byte `byte_x` on line `y` of `plane`. Negative modulos
    /// wrap the same way the chip's pointer arithmetic does.
    #[must_use]
    pub fn byte_address(&self, plane: usize, y: u32, byte_x: u32) -> u32 {
        let offset = i64::from(y) * self.stride(plane) + i64::from(byte_x);
        (i64::from(self.planes[plane]) + offset) as u32
    }

    /// 6 planes without HAM.
    #[must_use]
    pub fn is_extra_half_brite(&self) -> bool {
        self.planes.len() == 6 && !self.ham
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let sides = 1..=MAX_DIMENSION;
        if !sides.contains(&self.width) || !sides.contains(&self.height) {
            return Err(LayoutError::Dimensions {
                width: self.width,
                height: self.height,
            });
        }
        match self.kind {
            ScreenKind::Sprite if self.planes.len() != 1 => {
                Err(LayoutError::SpritePlanes(self.planes.len()))
            }
            ScreenKind::Sprite => Ok(()),
            ScreenKind::Normal => {
                if self.planes.is_empty() {
                    return Err(LayoutError::NoPlanes);
                }
                if self.planes.len() > MAX_PLANES {
                    return Err(LayoutError::TooManyPlanes(self.planes.len()));
                }
                if self.width % 16 != 0 {
                    return Err(LayoutError::WidthNotMultipleOf16(self.width));
                }
                Ok(())
            }
        }
    }

    /// Check `mask` can be composited over `self`.
    pub fn validate_mask(&self, mask: &Self) -> Result<(), LayoutError> {
        if self.ham {
            return Err(LayoutError::HamWithMask);
        }
        if mask.kind != ScreenKind::Normal {
            return Err(LayoutError::MaskNotBitmap);
        }
        if mask.width != self.width || mask.height != self.height {
            return Err(LayoutError::MaskDimensions {
                width: self.width,
                height: self.height,
                mask_width: mask.width,
                mask_height: mask.height,
            });
        }
        mask.validate()
    }
}

bitflags! {
    /// Storage flags of a graphics resource.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct BitmapFlags: u32 {
        /// Lines of all planes follow each other (plane 0 line 0, plane 1
        /// line 0, ...).
        const INTERLEAVED = 1 << 0;
        /// A cookie-cut mask is stored beside the image data.
        const MASKED = 1 << 1;
        const HAM = 1 << 2;
    }
}

/// A bitmap as described by the resource list of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitmapDescriptor {
    pub address: u32,
    pub width: u32,
    pub height: u32,
    pub num_planes: u32,
    pub flags: BitmapFlags,
}

impl BitmapDescriptor {
    /// The image layout, plus the mask layout when the bitmap is masked.
    ///
    /// Interleaved masked bitmaps store a mask line after every image
    /// line, so the modulo skips twice as many rows.
    #[must_use]
    pub fn layouts(&self) -> (ScreenLayout, Option<ScreenLayout>) {
        let row = self.width / 8;
        let masked = self.flags.contains(BitmapFlags::MASKED);
        let interleaved = self.flags.contains(BitmapFlags::INTERLEAVED);

        let (planes, modulo): (Vec<u32>, i32) = if interleaved {
            let scale = if masked { 2 } else { 1 };
            let planes = (0..self.num_planes)
                .map(|p| self.address + p * row * scale)
                .collect();
            (planes, (row * (self.num_planes * scale).saturating_sub(1)) as i32)
        } else {
            let planes = (0..self.num_planes)
                .map(|p| self.address + p * row * self.height)
                .collect();
            (planes, 0)
        };

        let screen = ScreenLayout::bitmap(self.width, self.height, planes)
            .with_modulos([modulo, modulo])
            .with_ham(self.flags.contains(BitmapFlags::HAM));

        let mask = masked.then(|| {
            // Non-interleaved offset is unverified against real captures.
            let shift = if interleaved { row } else { row * self.height };
            let planes = screen.planes.iter().map(|&p| p + shift).collect();
            ScreenLayout::bitmap(self.width, self.height, planes).with_modulos(screen.modulos)
        });

        (screen, mask)
    }
}
