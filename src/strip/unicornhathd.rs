//! Pimoroni Unicorn HAT HD
//!
//! A 16x16 RGB matrix behind a microcontroller that takes a whole frame per SPI
//! transfer: a start byte followed by 3 bytes per pixel, row by row.

use embedded_graphics::geometry::Size;
use embedded_hal::spi::SpiDevice;

use crate::bitmap::{Bitmap, Rgba8888, Rotation};
use crate::device::{Device, Geometry};
use crate::error::Result;
use crate::interface::SerialInterface;
use crate::strip::DEFAULT_CONTRAST;

/// Panel side in pixels
pub const UNICORN_HAT_HD_SIZE: u32 = 16;

const START_OF_FRAME: u8 = 0x72;

/// Unicorn HAT HD as a [`Device`]
///
/// Channels are scaled by `alpha / 255` for translucent pixels and by
/// `contrast / 255` for opaque ones.
pub struct UnicornHatHd<SPI: SpiDevice> {
    interface: SerialInterface<SPI>,
    geometry: Geometry,
    brightness: u8,
    last_image: Option<Bitmap<Rgba8888>>,
    hidden: bool,
    persist: bool,
    cleaned_up: bool,
}

impl<SPI> UnicornHatHd<SPI>
where
    SPI: SpiDevice,
{
    /// Create and blank the panel
    pub fn new(spi: SPI, rotate: Rotation) -> Result<Self> {
        log::info!("Initializing Unicorn HAT HD, rotate {:?}", rotate);
        let mut device = UnicornHatHd {
            interface: SerialInterface::new(spi),
            geometry: Geometry::new(UNICORN_HAT_HD_SIZE, UNICORN_HAT_HD_SIZE, rotate),
            brightness: DEFAULT_CONTRAST,
            last_image: None,
            hidden: false,
            persist: false,
            cleaned_up: false,
        };
        device.clear()?;
        Ok(device)
    }

    fn send(&mut self, pixels: &[Rgba8888]) -> Result<()> {
        let mut buf = Vec::with_capacity(1 + pixels.len() * 3);
        buf.push(START_OF_FRAME);
        for pixel in pixels {
            let scale = u16::from(if pixel.a() != 0xFF { pixel.a() } else { self.brightness });
            for channel in [pixel.r(), pixel.g(), pixel.b()] {
                buf.push((u16::from(channel) * scale / 255) as u8);
            }
        }
        self.interface.data(&buf)
    }

    fn resend(&mut self) -> Result<()> {
        match self.last_image.take() {
            Some(image) => self.display(&image),
            None => Ok(()),
        }
    }
}

impl<SPI> Device for UnicornHatHd<SPI>
where
    SPI: SpiDevice,
{
    type Color = Rgba8888;

    fn size(&self) -> Size {
        self.geometry.size()
    }

    /// Remembers the frame; only sends it while shown
    fn display(&mut self, image: &Bitmap<Rgba8888>) -> Result<()> {
        let physical = self.geometry.preprocess(image).into_owned();
        self.last_image = Some(image.clone());
        if self.hidden {
            return Ok(());
        }
        self.send(physical.pixels())
    }

    fn show(&mut self) -> Result<()> {
        if !self.hidden {
            return Ok(());
        }
        self.hidden = false;
        self.resend()
    }

    /// Send a dark frame, keeping the last image for `show`
    fn hide(&mut self) -> Result<()> {
        self.hidden = true;
        let pixels = (UNICORN_HAT_HD_SIZE * UNICORN_HAT_HD_SIZE) as usize;
        let dark = vec![Rgba8888::new(0, 0, 0, 0); pixels];
        self.send(&dark)
    }

    fn contrast(&mut self, level: u8) -> Result<()> {
        self.brightness = level;
        if self.hidden {
            return Ok(());
        }
        self.resend()
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        log::info!("Cleaning up Unicorn HAT HD");
        self.hide()?;
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

impl<SPI: SpiDevice> Drop for UnicornHatHd<SPI> {
    fn drop(&mut self) {
        if self.persist {
            return;
        }
        if let Err(e) = self.cleanup() {
            log::warn!("Unicorn HAT HD cleanup failed: {}", e);
        }
    }
}
