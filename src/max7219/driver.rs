//! MAX7219 LED matrix driver
//!
//! Drives one or more cascaded 8x8 matrix modules from a monochrome [`Bitmap`].
//!
//! ## Frame encoding
//!
//! Each chip takes one byte per digit register, and on a matrix module a digit
//! register is one column of 8 pixels (bit `y` = row `y`). A frame is therefore sent
//! as 8 transfers, one per column index, each holding a `[register, byte]` pair for
//! every chip in the chain. Chips are visited through an offset table built once at
//! construction: tiles bottom-to-top, right-to-left, which is the order bytes fall
//! through the daisy chain.
//!
//! Before packing, the (already rotated) image goes through two optional fixes for
//! the way modules are soldered:
//! - block orientation turns every 8x8 tile on its own (0, 90, -90 or 180 degrees,
//!   counter-clockwise positive)
//! - reverse order swaps tile `i` with tile `n - 1 - i`
//!
//! Orientation is applied first.

use embedded_graphics::{geometry::Size, pixelcolor::BinaryColor};
use embedded_hal::spi::SpiDevice;

use crate::bitmap::{Bitmap, Rotation};
use crate::device::{Device, Geometry};
use crate::error::{Error, Result};
use crate::interface::SerialInterface;
use crate::max7219::{cmd::Cmd, flag::Flag};

const TILE: u32 = 8;

/// Per-tile correction for modules mounted turned, counter-clockwise positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockOrientation {
    /// As wired
    #[default]
    Deg0,
    /// Turn each tile 90 degrees counter-clockwise
    Deg90,
    /// Turn each tile 90 degrees clockwise
    DegMinus90,
    /// Turn each tile upside down
    Deg180,
}

impl TryFrom<i32> for BlockOrientation {
    type Error = Error;

    fn try_from(degrees: i32) -> Result<Self> {
        match degrees {
            0 => Ok(BlockOrientation::Deg0),
            90 => Ok(BlockOrientation::Deg90),
            -90 => Ok(BlockOrientation::DegMinus90),
            180 => Ok(BlockOrientation::Deg180),
            other => Err(Error::InvalidBlockOrientation(other)),
        }
    }
}

/// Construction options for [`Max7219`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Max7219Config {
    /// Physical width in pixels, a multiple of 8
    pub width: u32,
    /// Physical height in pixels, a multiple of 8
    pub height: u32,
    /// Number of chips; when set, overrides the size to `cascaded * 8` by 8
    pub cascaded: Option<usize>,
    /// Whole device rotation
    pub rotate: Rotation,
    /// Per-tile correction
    pub block_orientation: BlockOrientation,
    /// Tiles are chained in the opposite order to the panel layout
    pub blocks_arranged_in_reverse_order: bool,
    /// Brightness applied at start-up
    pub contrast: u8,
}

impl Default for Max7219Config {
    fn default() -> Self {
        Self {
            width: TILE,
            height: TILE,
            cascaded: None,
            rotate: Rotation::Deg0,
            block_orientation: BlockOrientation::Deg0,
            blocks_arranged_in_reverse_order: false,
            contrast: Flag::DEFAULT_CONTRAST,
        }
    }
}

impl Max7219Config {
    /// A single row of `n` modules
    pub fn cascaded(n: usize) -> Self {
        Self {
            cascaded: Some(n),
            ..Self::default()
        }
    }

    /// A `width` x `height` panel of modules
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

    /// Set the per-tile correction
    pub fn with_block_orientation(mut self, orientation: BlockOrientation) -> Self {
        self.block_orientation = orientation;
        self
    }

    /// Set whether the chain runs against the panel layout
    pub fn with_reverse_order(mut self, reverse: bool) -> Self {
        self.blocks_arranged_in_reverse_order = reverse;
        self
    }

    /// Set the start-up brightness
    pub fn with_contrast(mut self, contrast: u8) -> Self {
        self.contrast = contrast;
        self
    }

    /// Physical size and chip count, checked
    fn resolve(&self) -> Result<(u32, u32, usize)> {
        let (width, height) = match self.cascaded {
            Some(n) => (n as u32 * TILE, TILE),
            None => (self.width, self.height),
        };
        if width == 0 || height == 0 || width % TILE != 0 || height % TILE != 0 {
            return Err(Error::UnsupportedMode { width, height });
        }
        let cascaded = (width * height / (TILE * TILE)) as usize;
        Ok((width, height, cascaded))
    }
}

/// Cascaded MAX7219 matrix modules behind one SPI device
pub struct Max7219<SPI: SpiDevice> {
    interface: SerialInterface<SPI>,
    geometry: Geometry,
    cascaded: usize,
    block_orientation: BlockOrientation,
    reverse_order: bool,
    /// Start of every chip's tile in the physical image, in chain order
    offsets: Vec<usize>,
    persist: bool,
    cleaned_up: bool,
}

impl<SPI> Max7219<SPI>
where
    SPI: SpiDevice,
{
    /// Create and initialize the chain
    ///
    /// Sends scan limit, decode mode and display test setup, then the configured
    /// contrast, a blank frame and switches the display on.
    pub fn new(spi: SPI, config: Max7219Config) -> Result<Self> {
        let (width, height, cascaded) = config.resolve()?;
        log::info!(
            "Initializing MAX7219 chain: {}x{} ({} chips), rotate {:?}, block orientation {:?}, reverse order {}",
            width,
            height,
            cascaded,
            config.rotate,
            config.block_orientation,
            config.blocks_arranged_in_reverse_order
        );

        let mut device = Max7219 {
            interface: SerialInterface::new(spi),
            geometry: Geometry::new(width, height, config.rotate),
            cascaded,
            block_orientation: config.block_orientation,
            reverse_order: config.blocks_arranged_in_reverse_order,
            offsets: tile_offsets(width, height),
            persist: false,
            cleaned_up: false,
        };

        device.command(Cmd::SCAN_LIMIT, Flag::SCAN_ALL_DIGITS)?;
        device.command(Cmd::DECODE_MODE, Flag::NO_DECODE)?;
        device.command(Cmd::DISPLAY_TEST, Flag::DISPLAY_TEST_OFF)?;
        device.contrast(config.contrast)?;
        device.clear()?;
        device.show()?;
        Ok(device)
    }

    /// Number of chips in the chain
    pub fn cascaded(&self) -> usize {
        self.cascaded
    }

    /// Write the same register on every chip
    pub fn command(&mut self, register: u8, value: u8) -> Result<()> {
        self.interface.command(register, value, self.cascaded)
    }

    /// The 8 transfers `display` would send for `image`
    pub fn frames(&self, image: &Bitmap<BinaryColor>) -> Vec<Vec<u8>> {
        let image = self.geometry.preprocess(image);
        let Size { width, height } = self.geometry.physical_size();
        let mut pixels: Vec<bool> = image.pixels().iter().map(|p| p.is_on()).collect();

        if self.block_orientation != BlockOrientation::Deg0 {
            orient_blocks(&mut pixels, width, height, self.block_orientation);
        }
        if self.reverse_order {
            reverse_blocks(&mut pixels, width, height);
        }

        let w = width as usize;
        (0..Flag::DIGITS)
            .map(|digit| {
                let register = Cmd::digit(digit as u8);
                self.offsets
                    .iter()
                    .flat_map(|&offset| {
                        let byte = (0..TILE as usize).fold(0u8, |acc, y| {
                            acc | (u8::from(pixels[offset + digit + y * w]) << y)
                        });
                        [register, byte]
                    })
                    .collect()
            })
            .collect()
    }
}

impl<SPI> Device for Max7219<SPI>
where
    SPI: SpiDevice,
{
    type Color = BinaryColor;

    fn size(&self) -> Size {
        self.geometry.size()
    }

    fn display(&mut self, image: &Bitmap<BinaryColor>) -> Result<()> {
        let frames = self.frames(image);
        log::debug!("MAX7219 frame: {} transfers of {} bytes", frames.len(), self.cascaded * 2);
        for frame in frames {
            self.interface.data(&frame)?;
        }
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        self.command(Cmd::SHUTDOWN, Flag::NORMAL_OPERATION)
    }

    fn hide(&mut self) -> Result<()> {
        self.command(Cmd::SHUTDOWN, Flag::SHUTDOWN_MODE)
    }

    fn contrast(&mut self, level: u8) -> Result<()> {
        self.command(Cmd::INTENSITY, level >> 4)
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        log::info!("Cleaning up MAX7219 chain");
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

impl<SPI: SpiDevice> Drop for Max7219<SPI> {
    fn drop(&mut self) {
        if self.persist {
            return;
        }
        if let Err(e) = self.cleanup() {
            log::warn!("MAX7219 cleanup failed: {}", e);
        }
    }
}

// ==================== Helper Functions ====================

/// Top-left pixel index of every tile, in chain order
fn tile_offsets(width: u32, height: u32) -> Vec<usize> {
    let w = width as usize;
    let mut offsets = Vec::with_capacity((width * height / (TILE * TILE)) as usize);
    for y in (0..height as usize).step_by(TILE as usize).rev() {
        for x in (0..w).step_by(TILE as usize).rev() {
            offsets.push(y * w + x);
        }
    }
    offsets
}

/// Turn every tile in place
fn orient_blocks(pixels: &mut [bool], width: u32, height: u32, orientation: BlockOrientation) {
    let w = width as usize;
    let n = TILE as usize;
    for ty in (0..height as usize).step_by(n) {
        for tx in (0..w).step_by(n) {
            let mut old = [[false; 8]; 8];
            for (y, row) in old.iter_mut().enumerate() {
                for (x, cell) in row.iter_mut().enumerate() {
                    *cell = pixels[(ty + y) * w + tx + x];
                }
            }
            for y in 0..n {
                for x in 0..n {
                    let (sx, sy) = match orientation {
                        BlockOrientation::Deg0 => (x, y),
                        BlockOrientation::Deg90 => (n - 1 - y, x),
                        BlockOrientation::DegMinus90 => (y, n - 1 - x),
                        BlockOrientation::Deg180 => (n - 1 - x, n - 1 - y),
                    };
                    pixels[(ty + y) * w + tx + x] = old[sy][sx];
                }
            }
        }
    }
}

/// Swap tile `i` with tile `n - 1 - i`, tiles numbered row by row
fn reverse_blocks(pixels: &mut [bool], width: u32, height: u32) {
    let old = pixels.to_vec();
    let w = width as usize;
    let n = TILE as usize;
    let across = w / n;
    let tiles = across * (height as usize / n);
    for tile in 0..tiles {
        let from = tiles - 1 - tile;
        let (dx, dy) = ((tile % across) * n, (tile / across) * n);
        let (sx, sy) = ((from % across) * n, (from / across) * n);
        for y in 0..n {
            for x in 0..n {
                pixels[(dy + y) * w + dx + x] = old[(sy + y) * w + sx + x];
            }
        }
    }
}
