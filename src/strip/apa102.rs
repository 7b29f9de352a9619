//! APA102 ("dotstar") chains
//!
//! APA102 is clocked SPI. Each LED takes a 4 byte quad `0xE0 | brightness, B, G, R`
//! with a 5 bit brightness, so per-pixel brightness comes straight from the alpha
//! channel of an RGBA bitmap.

use embedded_graphics::geometry::Size;
use embedded_hal::spi::SpiDevice;

use crate::bitmap::{Bitmap, Rgba8888};
use crate::device::{Device, Geometry};
use crate::error::Result;
use crate::interface::SerialInterface;
use crate::strip::StripConfig;

/// Marker bits of a LED quad's first byte
const LED_FRAME: u8 = 0xE0;

/// Encode one frame
///
/// Zero padding of 4 bytes per pixel goes on both ends, which covers the start frame
/// and the extra clock edges the end of a long chain needs. A pixel that is not fully
/// opaque uses `alpha >> 4` as its brightness, an opaque one uses `brightness`.
pub fn apa102_frame(pixels: &[Rgba8888], mapping: &[usize], brightness: u8) -> Vec<u8> {
    let pad = pixels.len() * 4;
    let mut buf = vec![0u8; pad * 3];
    for (idx, pixel) in pixels.iter().enumerate() {
        let offset = pad + mapping[idx] * 4;
        let level = if pixel.a() != 0xFF { pixel.a() >> 4 } else { brightness };
        buf[offset] = LED_FRAME | level;
        buf[offset + 1] = pixel.b();
        buf[offset + 2] = pixel.g();
        buf[offset + 3] = pixel.r();
    }
    buf
}

/// APA102 chain as a [`Device`]
///
/// The chain has no off switch, so `show` and `hide` send nothing.
pub struct Apa102<SPI: SpiDevice> {
    interface: SerialInterface<SPI>,
    geometry: Geometry,
    mapping: Vec<usize>,
    brightness: u8,
    last_image: Option<Bitmap<Rgba8888>>,
    persist: bool,
    cleaned_up: bool,
}

impl<SPI> Apa102<SPI>
where
    SPI: SpiDevice,
{
    /// Create and blank the chain
    pub fn new(spi: SPI, config: StripConfig) -> Result<Self> {
        let (width, height, mapping) = config.resolve()?;
        log::info!(
            "Initializing APA102 chain of {} ({}x{}), rotate {:?}",
            mapping.len(),
            width,
            height,
            config.rotate
        );
        let mut device = Apa102 {
            interface: SerialInterface::new(spi),
            geometry: Geometry::new(width, height, config.rotate),
            mapping,
            brightness: 0,
            last_image: None,
            persist: false,
            cleaned_up: false,
        };
        device.contrast(config.contrast)?;
        device.clear()?;
        device.show()?;
        Ok(device)
    }

    /// Current 4 bit global brightness
    pub fn brightness(&self) -> u8 {
        self.brightness
    }
}

impl<SPI> Device for Apa102<SPI>
where
    SPI: SpiDevice,
{
    type Color = Rgba8888;

    fn size(&self) -> Size {
        self.geometry.size()
    }

    fn display(&mut self, image: &Bitmap<Rgba8888>) -> Result<()> {
        let physical = self.geometry.preprocess(image);
        let frame = apa102_frame(physical.pixels(), &self.mapping, self.brightness);
        self.last_image = Some(image.clone());
        log::debug!("APA102 frame: {} bytes", frame.len());
        self.interface.data(&frame)
    }

    fn show(&mut self) -> Result<()> {
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        Ok(())
    }

    /// Store `level >> 4` and re-send the last frame
    fn contrast(&mut self, level: u8) -> Result<()> {
        self.brightness = level >> 4;
        match self.last_image.take() {
            Some(image) => self.display(&image),
            None => Ok(()),
        }
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        log::info!("Cleaning up APA102 chain");
        self.clear()?;
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

impl<SPI: SpiDevice> Drop for Apa102<SPI> {
    fn drop(&mut self) {
        if self.persist {
            return;
        }
        if let Err(e) = self.cleanup() {
            log::warn!("APA102 cleanup failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_is_padded_on_both_ends() {
        let pixels = [Rgba8888::new(0x11, 0x22, 0x33, 0x44); 2];
        let frame = apa102_frame(&pixels, &[0, 1], 7);
        assert_eq!(frame.len(), 24);
        assert_eq!(frame[..8], [0; 8]);
        assert_eq!(frame[8..12], [0xE4, 0x33, 0x22, 0x11]);
        assert_eq!(frame[16..], [0; 8]);
    }

    #[test]
    fn opaque_pixels_use_global_brightness() {
        let frame = apa102_frame(&[Rgba8888::new(0xFF, 0, 0, 0xFF)], &[0], 6);
        assert_eq!(frame[4..8], [0xE6, 0, 0, 0xFF]);
    }

    #[test]
    fn mapping_moves_quads() {
        let pixels = [Rgba8888::new(1, 0, 0, 0xFF), Rgba8888::new(2, 0, 0, 0xFF)];
        let frame = apa102_frame(&pixels, &[1, 0], 0);
        assert_eq!(frame[8 + 3], 2);
        assert_eq!(frame[12 + 3], 1);
    }
}
