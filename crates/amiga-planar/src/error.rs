use amiga_dma_trace::MemoryError;

/// Why a [`ScreenLayout`](crate::ScreenLayout) cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout is {width}x{height}, each side must be 1..=32768")]
    Dimensions { width: u32, height: u32 },
    #[error("layout has no bitplanes")]
    NoPlanes,
    #[error("layout has {0} bitplanes, at most 8 are supported")]
    TooManyPlanes(usize),
    #[error("layout width {0} is not a multiple of 16")]
    WidthNotMultipleOf16(u32),
    #[error("sprite layout needs exactly one record stream pointer, got {0}")]
    SpritePlanes(usize),
    #[error("mask is {mask_width}x{mask_height}, screen is {width}x{height}")]
    MaskDimensions {
        width: u32,
        height: u32,
        mask_width: u32,
        mask_height: u32,
    },
    #[error("mask must be a normal bitmap")]
    MaskNotBitmap,
    #[error("HAM bitmaps cannot be decoded with a mask")]
    HamWithMask,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanarError {
    #[error(transparent)]
    AddressOutOfRange(#[from] MemoryError),
    #[error("palette index {index} is out of range for a {len}-entry palette")]
    PaletteIndexOutOfRange { index: usize, len: usize },
    #[error("malformed screen layout: {0}")]
    MalformedScreenLayout(#[from] LayoutError),
}
