//! Pixel bitmaps handed to the devices
//!
//! A [`Bitmap`] is a plain row-major grid of `embedded-graphics` colours. It implements
//! [`DrawTarget`] so frames can be composed with the usual primitives, text styles and
//! image types before being pushed to a device.

use core::convert::Infallible;
use core::fmt::Debug;

use embedded_graphics::pixelcolor::{BinaryColor, Rgb888};
use embedded_graphics::prelude::*;

use crate::error::{Error, Result};

/// Colour modes a device can accept
///
/// One of 1-bit ([`BinaryColor`]), RGB ([`Rgb888`]) or RGBA ([`Rgba8888`]).
pub trait ColorMode: PixelColor + Debug + Send + Sync + 'static {
    /// Colour of an unlit pixel
    const BLANK: Self;
    /// Short mode name used in log output
    const NAME: &'static str;
}

impl ColorMode for BinaryColor {
    const BLANK: Self = BinaryColor::Off;
    const NAME: &'static str = "1";
}

impl ColorMode for Rgb888 {
    const BLANK: Self = Rgb888::BLACK;
    const NAME: &'static str = "RGB";
}

impl ColorMode for Rgba8888 {
    const BLANK: Self = Rgba8888::new(0, 0, 0, 0);
    const NAME: &'static str = "RGBA";
}

/// 32 bit colour with an alpha channel
///
/// The strip drivers read alpha as a per-pixel brightness override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba8888 {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Rgba8888 {
    /// Fully opaque white
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a colour from its channels
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Red channel
    pub const fn r(self) -> u8 {
        self.r
    }

    /// Green channel
    pub const fn g(self) -> u8 {
        self.g
    }

    /// Blue channel
    pub const fn b(self) -> u8 {
        self.b
    }

    /// Alpha channel
    pub const fn a(self) -> u8 {
        self.a
    }
}

impl PixelColor for Rgba8888 {
    type Raw = ();
}

impl From<Rgb888> for Rgba8888 {
    fn from(c: Rgb888) -> Self {
        Self::new(c.r(), c.g(), c.b(), 255)
    }
}

/// Whole-device rotation, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    /// No rotation
    #[default]
    Deg0,
    /// 90 degrees clockwise
    Deg90,
    /// 180 degrees
    Deg180,
    /// 270 degrees clockwise
    Deg270,
}

impl Rotation {
    /// Number of clockwise quarter turns
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// Whether width and height trade places
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = Error;

    fn try_from(degrees: u16) -> Result<Self> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(Error::InvalidRotation(other)),
        }
    }
}

/// Row-major grid of pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap<C> {
    width: u32,
    height: u32,
    pixels: Vec<C>,
}

impl<C: ColorMode> Bitmap<C> {
    /// Bitmap with every pixel unlit
    pub fn blank(width: u32, height: u32) -> Self {
        Self::filled(width, height, C::BLANK)
    }

    /// Bitmap with every pixel set to `color`
    pub fn filled(width: u32, height: u32, color: C) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }

    /// Wrap an existing row-major pixel vector
    ///
    /// Panics when the vector length is not `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<C>) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height) as usize,
            "pixel count does not match {}x{}",
            width,
            height
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels in row-major order
    pub fn pixels(&self) -> &[C] {
        &self.pixels
    }

    /// Pixel at `(x, y)`; panics outside the bitmap
    pub fn pixel(&self, x: u32, y: u32) -> C {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at `(x, y)`; panics outside the bitmap
    pub fn set_pixel(&mut self, x: u32, y: u32, color: C) {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy of the bitmap turned clockwise by `rotation`
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let (w, h) = (self.width, self.height);
        let (dw, dh) = if rotation.swaps_axes() { (h, w) } else { (w, h) };
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for y in 0..dh {
            for x in 0..dw {
                let (sx, sy) = match rotation {
                    Rotation::Deg0 => (x, y),
                    Rotation::Deg90 => (y, h - 1 - x),
                    Rotation::Deg180 => (w - 1 - x, h - 1 - y),
                    Rotation::Deg270 => (w - 1 - y, x),
                };
                pixels.push(self.pixel(sx, sy));
            }
        }
        Self {
            width: dw,
            height: dh,
            pixels,
        }
    }

    /// Panics unless the bitmap is exactly `size`
    pub(crate) fn assert_size(&self, size: Size) {
        assert!(
            self.width == size.width && self.height == size.height,
            "bitmap is {}x{}, device expects {}x{} ({})",
            self.width,
            self.height,
            size.width,
            size.height,
            C::NAME
        );
    }
}

impl<C: ColorMode> OriginDimensions for Bitmap<C> {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl<C: ColorMode> DrawTarget for Bitmap<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x < self.width && y < self.height {
                self.pixels[(y * self.width + x) as usize] = color;
            }
        }
        Ok(())
    }
}
