//! The display sink capability shared by every driver

use std::borrow::Cow;

use embedded_graphics::geometry::Size;

use crate::bitmap::{Bitmap, ColorMode, Rotation};
use crate::error::Result;

/// A device that accepts whole frames
///
/// Implementations own their transport for their whole lifetime. `cleanup` blanks the
/// display and puts the hardware in a low power state; it runs at most once, either
/// explicitly or from `Drop`, unless the device has been made persistent.
pub trait Device {
    /// Pixel format accepted by [`Device::display`]
    type Color: ColorMode;

    /// Logical size after rotation
    fn size(&self) -> Size;

    /// Push a frame; panics unless `image` is exactly [`Device::size`]
    fn display(&mut self, image: &Bitmap<Self::Color>) -> Result<()>;

    /// Switch the display on
    fn show(&mut self) -> Result<()>;

    /// Switch the display off, keeping its contents
    fn hide(&mut self) -> Result<()>;

    /// Set brightness, 0 to 255
    fn contrast(&mut self, level: u8) -> Result<()>;

    /// Blank the display
    fn clear(&mut self) -> Result<()> {
        let size = self.size();
        self.display(&Bitmap::blank(size.width, size.height))
    }

    /// Blank the display and release the hardware, once
    fn cleanup(&mut self) -> Result<()>;

    /// Whether the display keeps its contents when the device is dropped
    fn is_persistent(&self) -> bool;

    /// Skip cleanup on drop
    fn set_persist(&mut self, persist: bool);
}

/// Physical and logical dimensions of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    width: u32,
    height: u32,
    rotation: Rotation,
}

impl Geometry {
    /// `width` and `height` are the unrotated, physical dimensions
    pub const fn new(width: u32, height: u32, rotation: Rotation) -> Self {
        Self {
            width,
            height,
            rotation,
        }
    }

    /// Size callers draw at
    pub fn size(&self) -> Size {
        if self.rotation.swaps_axes() {
            Size::new(self.height, self.width)
        } else {
            Size::new(self.width, self.height)
        }
    }

    /// Size the hardware is addressed at
    pub fn physical_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Configured rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Check a caller frame and turn it into physical orientation
    pub fn preprocess<'a, C: ColorMode>(&self, image: &'a Bitmap<C>) -> Cow<'a, Bitmap<C>> {
        image.assert_size(self.size());
        match self.rotation {
            Rotation::Deg0 => Cow::Borrowed(image),
            rotation => Cow::Owned(image.rotated(rotation)),
        }
    }
}

/// In-memory device that keeps the last frame it was given
#[derive(Debug)]
pub struct Dummy<C: ColorMode> {
    geometry: Geometry,
    image: Bitmap<C>,
    visible: bool,
    level: u8,
    persist: bool,
    cleaned_up: bool,
}

impl<C: ColorMode> Dummy<C> {
    /// Create a blank dummy of the given physical size
    pub fn new(width: u32, height: u32, rotation: Rotation) -> Self {
        let geometry = Geometry::new(width, height, rotation);
        log::info!(
            "Dummy device {}x{} mode {} rotate {:?}",
            width,
            height,
            C::NAME,
            rotation
        );
        Self {
            geometry,
            image: Bitmap::blank(width, height),
            visible: true,
            level: 0x70,
            persist: false,
            cleaned_up: false,
        }
    }

    /// Last frame, in physical orientation
    pub fn image(&self) -> &Bitmap<C> {
        &self.image
    }

    /// Whether `show` was the last visibility call
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Last contrast level
    pub fn level(&self) -> u8 {
        self.level
    }
}

impl<C: ColorMode> Device for Dummy<C> {
    type Color = C;

    fn size(&self) -> Size {
        self.geometry.size()
    }

    fn display(&mut self, image: &Bitmap<C>) -> Result<()> {
        self.image = self.geometry.preprocess(image).into_owned();
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        self.visible = true;
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        self.visible = false;
        Ok(())
    }

    fn contrast(&mut self, level: u8) -> Result<()> {
        self.level = level;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;
        self.hide()?;
        self.clear()
    }

    fn is_persistent(&self) -> bool {
        self.persist
    }

    fn set_persist(&mut self, persist: bool) {
        self.persist = persist;
    }
}
