//! Seven-segment text on top of a monochrome device
//!
//! [`SevenSegment`] keeps a text buffer and re-renders the whole display after each
//! edit. Every pixel column of the backing device is one digit, row `y` lighting
//! segment bit `y`. Text is padded at the end and laid out from the last column
//! backwards, which puts the first character on the leftmost digit of a MAX7219
//! seven-segment module.

use core::ops::Range;

use embedded_graphics::pixelcolor::BinaryColor;

use crate::bitmap::Bitmap;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::segment_mapper::SegmentPolicy;

/// Text display made of seven-segment digits
pub struct SevenSegment<D: Device<Color = BinaryColor>> {
    device: D,
    undefined: Option<char>,
    policy: SegmentPolicy,
    text: String,
    capacity: usize,
}

impl<D> SevenSegment<D>
where
    D: Device<Color = BinaryColor>,
{
    /// Wrap `device` and blank it
    ///
    /// `undefined` replaces characters without a pattern, `None` drops them. It must
    /// itself have a pattern.
    pub fn new(device: D, undefined: Option<char>, policy: SegmentPolicy) -> Result<Self> {
        let size = device.size();
        let capacity = (size.width * size.height / 8) as usize;
        log::info!("Seven-segment display with {} digits, {:?}", capacity, policy);
        let mut display = SevenSegment {
            device,
            undefined,
            policy,
            text: String::new(),
            capacity,
        };
        display.render("")?;
        Ok(display)
    }

    /// Current text, which may hold characters the display cannot show
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of digits
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Backing device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Backing device, e.g. for `contrast`
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Replace the text
    ///
    /// On [`Error::Overflow`] neither the text nor the display change.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.render(&text)?;
        self.text = text;
        Ok(())
    }

    /// Replace the character at `index`
    pub fn set_char(&mut self, index: usize, ch: char) -> Result<()> {
        self.edit(|chars| chars[index] = ch)
    }

    /// Replace the characters in `range` with `with`
    pub fn replace_range(&mut self, range: Range<usize>, with: &str) -> Result<()> {
        self.edit(|chars| {
            chars.splice(range, with.chars());
        })
    }

    /// Remove the character at `index`
    pub fn remove(&mut self, index: usize) -> Result<()> {
        self.edit(|chars| {
            chars.remove(index);
        })
    }

    /// Render the current text again
    pub fn flush(&mut self) -> Result<()> {
        let text = self.text.clone();
        self.render(&text)
    }

    fn edit(&mut self, f: impl FnOnce(&mut Vec<char>)) -> Result<()> {
        let mut chars: Vec<char> = self.text.chars().collect();
        f(&mut chars);
        self.set_text(chars.into_iter().collect::<String>())
    }

    fn render(&mut self, text: &str) -> Result<()> {
        let mut data = self.policy.encode(text, self.undefined)?;
        if data.len() > self.capacity {
            return Err(Error::Overflow { text: text.to_owned() });
        }
        data.resize(self.capacity, 0);

        let size = self.device.size();
        let mut image = Bitmap::blank(size.width, size.height);
        for (x, byte) in data.iter().rev().enumerate() {
            for y in 0..8 {
                if byte >> y & 1 == 1 && (x as u32) < size.width && y < size.height {
                    image.set_pixel(x as u32, y, BinaryColor::On);
                }
            }
        }
        self.device.display(&image)
    }
}
