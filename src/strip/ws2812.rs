//! WS2812 ("neopixel") chains
//!
//! The WS2812 protocol is a single self-clocked data line, so the pixel timing is
//! left to a [`PixelDriver`]: a native DMA/PWM binding, or the bundled
//! [`SpiPixelDriver`] which fakes the waveform with SPI bit patterns.

use embedded_graphics::{geometry::Size, pixelcolor::Rgb888, prelude::RgbColor};
use embedded_hal::spi::SpiDevice;

use crate::bitmap::Bitmap;
use crate::device::{Device, Geometry};
use crate::error::Result;
use crate::interface::SerialInterface;
use crate::strip::StripConfig;

/// Low level pixel chain driver
///
/// Mirrors the shape of the usual neopixel libraries: colours are staged with
/// `set_pixel` and only reach the LEDs on `render`.
pub trait PixelDriver {
    /// Allocate a chain of `num_pixels`
    fn begin(&mut self, num_pixels: usize) -> Result<()>;

    /// Stage the colour of chain position `index`
    fn set_pixel(&mut self, index: usize, color: Rgb888);

    /// Global brightness, 0 to 255
    fn set_brightness(&mut self, brightness: u8);

    /// Push staged colours to the LEDs
    ///
    /// Bindings that report a status code map non-zero values to
    /// [`Error::Render`](crate::Error::Render).
    fn render(&mut self) -> Result<()>;
}

/// WS2812 chain as a [`Device`]
pub struct Ws2812<D: PixelDriver> {
    driver: D,
    geometry: Geometry,
    mapping: Vec<usize>,
    level: u8,
    /// Contrast to restore on `show`, set while hidden
    prev_contrast: Option<u8>,
    persist: bool,
    cleaned_up: bool,
}

impl<D> Ws2812<D>
where
    D: PixelDriver,
{
    /// Create and initialize the chain: allocate, blank, then light at `config.contrast`
    pub fn new(mut driver: D, config: StripConfig) -> Result<Self> {
        let (width, height, mapping) = config.resolve()?;
        log::info!(
            "Initializing WS2812 chain of {} ({}x{}), rotate {:?}",
            mapping.len(),
            width,
            height,
            config.rotate
        );
        driver.begin(mapping.len())?;
        let mut device = Ws2812 {
            driver,
            geometry: Geometry::new(width, height, config.rotate),
            mapping,
            level: 0,
            prev_contrast: Some(config.contrast),
            persist: false,
            cleaned_up: false,
        };
        device.clear()?;
        device.show()?;
        Ok(device)
    }

    /// The pixel driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Number of pixels on the chain
    pub fn cascaded(&self) -> usize {
        self.mapping.len()
    }
}

impl<D> Device for Ws2812<D>
where
    D: PixelDriver,
{
    type Color = Rgb888;

    fn size(&self) -> Size {
        self.geometry.size()
    }

    fn display(&mut self, image: &Bitmap<Rgb888>) -> Result<()> {
        let image = self.geometry.preprocess(image);
        for (idx, color) in image.pixels().iter().enumerate() {
            self.driver.set_pixel(self.mapping[idx], *color);
        }
        self.driver.render()
    }

    /// Restore the contrast saved by `hide`
    fn show(&mut self) -> Result<()> {
        match self.prev_contrast.take() {
            Some(level) => self.contrast(level),
            None => Ok(()),
        }
    }

    /// Drop the contrast to zero, remembering the current level
    fn hide(&mut self) -> Result<()> {
        if self.prev_contrast.is_none() {
            self.prev_contrast = Some(self.level);
            self.contrast(0)?;
        }
        Ok(())
    }

    fn contrast(&mut self, level: u8) -> Result<()> {
        self.level = level;
        self.driver.set_brightness(level);
        self.driver.render()
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        log::info!("Cleaning up WS2812 chain");
        let hidden = self.hide();
        let cleared = self.clear();
        hidden.and(cleared)?;
        self.cleaned_up = true;
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        self.persist
    }

    fn set_persist(&mut self, persist: bool) {
        self.persist = persist;
    }
}

impl<D: PixelDriver> Drop for Ws2812<D> {
    fn drop(&mut self) {
        if self.persist {
            return;
        }
        if let Err(e) = self.cleanup() {
            log::warn!("WS2812 cleanup failed: {}", e);
        }
    }
}

/// SPI bytes encoding two WS2812 bits each, indexed by the bit pair
const PATTERNS: [u8; 4] = [0b1000_1000, 0b1000_1110, 0b1110_1000, 0b1110_1110];

/// Zero bytes that hold the line low long enough to latch
pub const RESET_LEN: usize = 140;

/// [`PixelDriver`] that bit-bangs the WS2812 waveform over SPI
///
/// Needs the SPI clock near 3.2 MHz so that 4 SPI bits span one WS2812 bit.
/// Every colour byte becomes 4 SPI bytes, sent green, red, blue.
pub struct SpiPixelDriver<SPI> {
    interface: SerialInterface<SPI>,
    pixels: Vec<Rgb888>,
    brightness: u8,
}

impl<SPI> SpiPixelDriver<SPI> {
    /// Wrap an SPI device
    pub fn new(spi: SPI) -> Self {
        SpiPixelDriver {
            interface: SerialInterface::new(spi),
            pixels: Vec::new(),
            brightness: 255,
        }
    }

    /// The SPI bytes `render` would send
    pub fn encode(&self) -> Vec<u8> {
        let scale = |c: u8| ((u16::from(c) * (u16::from(self.brightness) + 1)) >> 8) as u8;
        self.pixels
            .iter()
            .flat_map(|pixel| {
                let mut chunk = [0u8; 12];
                for (i, color) in [pixel.g(), pixel.r(), pixel.b()].into_iter().enumerate() {
                    let mut color = scale(color);
                    for j in 0..4 {
                        chunk[i * 4 + j] = PATTERNS[((color & 0b1100_0000) >> 6) as usize];
                        color <<= 2;
                    }
                }
                chunk
            })
            .chain([0u8; RESET_LEN])
            .collect()
    }
}

impl<SPI> PixelDriver for SpiPixelDriver<SPI>
where
    SPI: SpiDevice,
{
    fn begin(&mut self, num_pixels: usize) -> Result<()> {
        log::debug!("SPI pixel driver: {} pixels", num_pixels);
        self.pixels = vec![Rgb888::BLACK; num_pixels];
        Ok(())
    }

    fn set_pixel(&mut self, index: usize, color: Rgb888) {
        self.pixels[index] = color;
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn render(&mut self) -> Result<()> {
        let frame = self.encode();
        self.interface.data(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSpi;

    impl embedded_hal::spi::ErrorType for NullSpi {
        type Error = core::convert::Infallible;
    }

    impl SpiDevice for NullSpi {
        fn transaction(
            &mut self,
            _operations: &mut [embedded_hal::spi::Operation<'_, u8>],
        ) -> core::result::Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn encodes_green_red_blue_msb_first() {
        let mut driver = SpiPixelDriver::new(NullSpi);
        driver.begin(1).unwrap();
        driver.set_pixel(0, Rgb888::new(0xFF, 0x00, 0b0110_0000));
        let bytes = driver.encode();
        assert_eq!(bytes.len(), 12 + RESET_LEN);
        assert_eq!(bytes[..4], [PATTERNS[0]; 4]);
        assert_eq!(bytes[4..8], [PATTERNS[3]; 4]);
        assert_eq!(bytes[8..12], [PATTERNS[1], PATTERNS[2], PATTERNS[0], PATTERNS[0]]);
        assert!(bytes[12..].iter().all(|b| *b == 0));
    }

    #[test]
    fn brightness_scales_channels() {
        let mut driver = SpiPixelDriver::new(NullSpi);
        driver.begin(1).unwrap();
        driver.set_pixel(0, Rgb888::WHITE);
        driver.set_brightness(0);
        assert!(driver.encode()[..12].iter().all(|b| *b == PATTERNS[0]));
        driver.set_brightness(255);
        assert!(driver.encode()[..12].iter().all(|b| *b == PATTERNS[3]));
    }
}
