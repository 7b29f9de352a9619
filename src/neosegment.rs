//! Seven-segment digits built from addressable RGB LEDs
//!
//! A NeoSegment board has one column of 7 LEDs per digit, wired as a chain that
//! zigzags through the digits. Each character is drawn in the column's own colour.

use core::ops::Range;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::bitmap::Bitmap;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::segment_mapper::regular;
use crate::strip::StripConfig;

/// LEDs per digit
pub const NEOSEGMENT_HEIGHT: u32 = 7;

/// Chain position of every row-major pixel of a `width` digit board
pub fn mapping(width: usize) -> Vec<usize> {
    let height = NEOSEGMENT_HEIGHT as usize;
    (0..width * height)
        .map(|i| (i % width) * height + i / width)
        .collect()
}

/// [`StripConfig`] for a WS2812 chain driving a `width` digit board
pub fn strip_config(width: usize) -> Result<StripConfig> {
    check_width(width)?;
    Ok(StripConfig::size(width as u32, NEOSEGMENT_HEIGHT).with_mapping(mapping(width)))
}

/// Reorder a regular segment pattern (`a` in bit 6 down to `g` in bit 0) into the
/// LED order of a NeoSegment column; the decimal point is dropped
pub fn neosegment_bits(pattern: u8) -> u8 {
    let bit = |n: u8| (pattern >> n) & 1;
    let (a, b, c, d, e, f, g) = (bit(6), bit(5), bit(4), bit(3), bit(2), bit(1), bit(0));
    b << 6 | a << 5 | f << 4 | g << 3 | c << 2 | d << 1 | e
}

fn check_width(width: usize) -> Result<()> {
    // boards come in pairs of digits
    if width == 0 || width % 2 != 0 {
        return Err(Error::UnsupportedWidth { width: width as u32 });
    }
    Ok(())
}

/// Coloured seven-segment text on an RGB device of `width` x 7 pixels
pub struct NeoSegment<D: Device<Color = Rgb888>> {
    device: D,
    width: usize,
    undefined: Option<char>,
    text: String,
    colors: Vec<Rgb888>,
}

impl<D> NeoSegment<D>
where
    D: Device<Color = Rgb888>,
{
    /// Wrap `device` and blank it, with every digit white
    pub fn new(device: D, width: usize, undefined: Option<char>) -> Result<Self> {
        check_width(width)?;
        let size = device.size();
        assert!(
            size.width as usize == width && size.height == NEOSEGMENT_HEIGHT,
            "Device is {}x{}, expected {}x{}",
            size.width,
            size.height,
            width,
            NEOSEGMENT_HEIGHT
        );
        log::info!("NeoSegment display with {} digits", width);
        let mut display = NeoSegment {
            device,
            width,
            undefined,
            text: String::new(),
            colors: vec![Rgb888::WHITE; width],
        };
        display.render("")?;
        Ok(display)
    }

    /// Current text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Colour of each digit
    pub fn colors(&self) -> &[Rgb888] {
        &self.colors
    }

    /// Number of digits
    pub fn capacity(&self) -> usize {
        self.width
    }

    /// Backing device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Backing device, e.g. for `contrast`
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Replace the text; on [`Error::Overflow`] nothing changes
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

    /// Paint every digit `color`
    pub fn set_color(&mut self, color: Rgb888) -> Result<()> {
        self.colors.fill(color);
        self.flush()
    }

    /// Paint digit `index`
    pub fn set_char_color(&mut self, index: usize, color: Rgb888) -> Result<()> {
        self.colors[index] = color;
        self.flush()
    }

    /// Paint the digits in `range`, one colour each
    pub fn set_colors(&mut self, range: Range<usize>, colors: &[Rgb888]) -> Result<()> {
        assert_eq!(range.len(), colors.len(), "One colour per digit expected");
        self.colors[range].copy_from_slice(colors);
        self.flush()
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
        let data: Vec<u8> = regular(text, self.undefined)?.map(neosegment_bits).collect();
        if data.len() > self.width {
            return Err(Error::Overflow { text: text.to_owned() });
        }

        let mut image = Bitmap::blank(self.width as u32, NEOSEGMENT_HEIGHT);
        for (x, byte) in data.iter().enumerate() {
            for y in 0..NEOSEGMENT_HEIGHT {
                if byte >> y & 1 == 1 {
                    image.set_pixel(x as u32, y, self.colors[x]);
                }
            }
        }
        self.device.display(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Rotation;
    use crate::device::Dummy;

    fn display() -> NeoSegment<Dummy<Rgb888>> {
        NeoSegment::new(Dummy::new(6, 7, Rotation::Deg0), 6, Some('_')).unwrap()
    }

    #[test]
    fn odd_width_is_rejected() {
        let err = NeoSegment::new(Dummy::<Rgb888>::new(6, 7, Rotation::Deg0), 3, None)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Unsupported display mode: width=3");
        assert!(strip_config(0).is_err());
    }

    #[test]
    fn chain_zigzags_through_columns() {
        let m = mapping(2);
        assert_eq!(m.len(), 14);
        assert_eq!(m[..4], [0, 7, 1, 8]);
        let config = strip_config(2).unwrap();
        assert_eq!(config.mapping, Some(m));
        assert_eq!((config.width, config.height), (2, 7));
    }

    #[test]
    fn bit_permutation() {
        assert_eq!(neosegment_bits(0x7f), 0x7f);
        assert_eq!(neosegment_bits(0x80), 0);
        // a, d and g
        assert_eq!(neosegment_bits(0x49), 0x2a);
        assert_eq!(neosegment_bits(0x08), 0x02);
    }

    #[test]
    fn eights_light_everything() {
        let mut neo = display();
        neo.set_text("888888").unwrap();
        assert_eq!(neo.device().image(), &Bitmap::filled(6, 7, Rgb888::WHITE));
    }

    #[test]
    fn overflow_is_reported() {
        let mut neo = display();
        let err = neo.set_text("TooBig!").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Device's capabilities insufficient for value 'TooBig!'"
        );
        assert_eq!(neo.text(), "");
    }

    #[test]
    fn blanking_a_range() {
        let mut neo = display();
        neo.set_text("888888").unwrap();
        neo.replace_range(2..4, "  ").unwrap();
        let image = neo.device().image();
        for y in 0..7 {
            assert_eq!(image.pixel(1, y), Rgb888::WHITE);
            assert_eq!(image.pixel(2, y), Rgb888::BLACK);
            assert_eq!(image.pixel(3, y), Rgb888::BLACK);
            assert_eq!(image.pixel(4, y), Rgb888::WHITE);
        }
    }

    #[test]
    fn unknown_characters_are_drawn_in_colour() {
        let mut neo = display();
        neo.set_colors(0..2, &[Rgb888::RED, Rgb888::BLUE]).unwrap();
        neo.set_text("&\x7f").unwrap();
        let image = neo.device().image();
        assert_eq!(image.pixel(0, 1), Rgb888::RED);
        assert_eq!(image.pixel(1, 1), Rgb888::BLUE);
        assert_eq!(image.pixel(0, 0), Rgb888::BLACK);
        assert_eq!(image.pixel(2, 1), Rgb888::BLACK);
    }

    #[test]
    fn recolouring_re_renders() {
        let mut neo = display();
        neo.set_text("8").unwrap();
        neo.set_char_color(0, Rgb888::GREEN).unwrap();
        assert_eq!(neo.device().image().pixel(0, 6), Rgb888::GREEN);
        neo.set_color(Rgb888::RED).unwrap();
        assert!(neo.colors().iter().all(|c| *c == Rgb888::RED));
        assert_eq!(neo.device().image().pixel(0, 0), Rgb888::RED);
    }
}
