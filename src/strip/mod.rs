//! Addressable RGB pixel chains
//!
//! WS2812 ("neopixel") and APA102 chains take one colour per LED in chain order.
//! A mapping table, fixed at construction, translates the row-major index of a
//! logical pixel into its position on the chain, so snake-wired panels such as the
//! Unicorn HAT can be drawn as ordinary bitmaps.

mod apa102;
mod unicornhathd;
mod ws2812;

pub use apa102::{apa102_frame, Apa102};
pub use unicornhathd::{UnicornHatHd, UNICORN_HAT_HD_SIZE};
pub use ws2812::{PixelDriver, SpiPixelDriver, Ws2812};

use crate::bitmap::Rotation;
use crate::error::{Error, Result};

/// Row-major to chain order for the 8x8 Unicorn HAT, which is wired as a snake
pub const UNICORN_HAT: [usize; 64] = [
    7, 6, 5, 4, 3, 2, 1, 0, //
    8, 9, 10, 11, 12, 13, 14, 15, //
    23, 22, 21, 20, 19, 18, 17, 16, //
    24, 25, 26, 27, 28, 29, 30, 31, //
    39, 38, 37, 36, 35, 34, 33, 32, //
    40, 41, 42, 43, 44, 45, 46, 47, //
    55, 54, 53, 52, 51, 50, 49, 48, //
    56, 57, 58, 59, 60, 61, 62, 63, //
];

/// Default brightness, 0 to 255
pub const DEFAULT_CONTRAST: u8 = 0x70;

/// Construction options for [`Ws2812`] and [`Apa102`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripConfig {
    /// Pixels laid out horizontally
    pub width: u32,
    /// Pixels laid out vertically
    pub height: u32,
    /// Length of a single strip; when set, overrides the size to `cascaded` by 1
    pub cascaded: Option<usize>,
    /// Whole device rotation
    pub rotate: Rotation,
    /// Chain position of every row-major pixel, identity when `None`
    pub mapping: Option<Vec<usize>>,
    /// Brightness applied at start-up
    pub contrast: u8,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 4,
            cascaded: None,
            rotate: Rotation::Deg0,
            mapping: None,
            contrast: DEFAULT_CONTRAST,
        }
    }
}

impl StripConfig {
    /// A single strip of `n` pixels
    pub fn cascaded(n: usize) -> Self {
        Self {
            cascaded: Some(n),
            ..Self::default()
        }
    }

    /// A `width` x `height` panel
    pub fn size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Set the whole device rotation
    pub fn with_rotate(mut self, rotate: Rotation) -> Self {
        self.rotate = rotate;
        self
    }

    /// Set a custom pixel to chain position table
    pub fn with_mapping(mut self, mapping: impl Into<Vec<usize>>) -> Self {
        self.mapping = Some(mapping.into());
        self
    }

    /// Set the start-up brightness
    pub fn with_contrast(mut self, contrast: u8) -> Self {
        self.contrast = contrast;
        self
    }

    /// Physical size and the checked mapping table
    pub(crate) fn resolve(&self) -> Result<(u32, u32, Vec<usize>)> {
        let (width, height) = match self.cascaded {
            Some(n) => (n as u32, 1),
            None => (self.width, self.height),
        };
        if width == 0 || height == 0 {
            return Err(Error::UnsupportedMode { width, height });
        }
        let len = (width * height) as usize;
        let mapping = match &self.mapping {
            None => (0..len).collect(),
            Some(mapping) => {
                if mapping.len() != len {
                    return Err(Error::MappingLength {
                        expected: len,
                        actual: mapping.len(),
                    });
                }
                if let Some(&index) = mapping.iter().find(|&&i| i >= len) {
                    return Err(Error::MappingOutOfRange { index, len });
                }
                mapping.clone()
            }
        };
        Ok((width, height, mapping))
    }
}
