//! Buffer based MAX7219 devices
//!
//! These drive a chain through a [`CascadeBuffer`] instead of a bitmap: callers poke
//! column/digit bytes and flush. Every mutating call takes a `redraw` flag; pass
//! `false` to batch several changes and call [`Cascade::flush`] once.

use embedded_hal::spi::SpiDevice;

use crate::error::{Error, Result};
use crate::interface::SerialInterface;
use crate::max7219::cascade::{frames, rotate8x8, transpose_tiles, CascadeBuffer};
use crate::max7219::{cmd::Cmd, flag::Flag};

/// A chain of MAX7219 chips driven from a byte buffer
pub struct Cascade<SPI: SpiDevice> {
    interface: SerialInterface<SPI>,
    buffer: CascadeBuffer,
    invert: bool,
    quarter_turns: u8,
    persist: bool,
    cleaned_up: bool,
}

impl<SPI> Cascade<SPI>
where
    SPI: SpiDevice,
{
    /// Create and initialize `cascaded` chips
    ///
    /// `vertical` turns each tile so text runs from the header pins instead of across.
    pub fn new(spi: SPI, cascaded: usize, vertical: bool) -> Result<Self> {
        if cascaded == 0 {
            return Err(Error::UnsupportedMode {
                width: 0,
                height: Flag::DIGITS as u32,
            });
        }
        log::info!("Initializing MAX7219 cascade of {} (vertical {})", cascaded, vertical);
        let mut cascade = Cascade {
            interface: SerialInterface::new(spi),
            buffer: CascadeBuffer::new(cascaded, vertical),
            invert: false,
            quarter_turns: 0,
            persist: false,
            cleaned_up: false,
        };
        cascade.command(Cmd::SCAN_LIMIT, Flag::SCAN_ALL_DIGITS)?;
        cascade.command(Cmd::DECODE_MODE, Flag::NO_DECODE)?;
        cascade.command(Cmd::DISPLAY_TEST, Flag::DISPLAY_TEST_OFF)?;
        cascade.command(Cmd::SHUTDOWN, Flag::NORMAL_OPERATION)?;
        cascade.brightness(7)?;
        cascade.clear(None)?;
        Ok(cascade)
    }

    /// Current buffer
    pub fn buffer(&self) -> &CascadeBuffer {
        &self.buffer
    }

    /// Send a control register value to every chip
    pub fn command(&mut self, register: u8, data: u8) -> Result<()> {
        assert!(
            (Cmd::DECODE_MODE..=Cmd::DISPLAY_TEST).contains(&register),
            "Invalid register: {register:#04x}"
        );
        self.interface.command(register, data, self.buffer.devices())
    }

    /// Hardware intensity, 0 to 15, on every chip
    pub fn brightness(&mut self, intensity: u8) -> Result<()> {
        assert!(intensity <= Flag::INTENSITY_MAX, "Invalid brightness: {intensity}");
        self.command(Cmd::INTENSITY, intensity)
    }

    /// Brightness on the 0 to 255 scale
    pub fn contrast(&mut self, level: u8) -> Result<()> {
        self.brightness(level >> 4)
    }

    /// Blank one chip, or all of them, and flush
    pub fn clear(&mut self, device: Option<usize>) -> Result<()> {
        self.buffer.clear(device);
        self.flush()
    }

    /// Store one column/digit byte; `position` is 0 to 7
    pub fn set_byte(
        &mut self,
        device: usize,
        position: usize,
        value: u8,
        redraw: bool,
    ) -> Result<()> {
        self.buffer.set_byte(device, position, value);
        self.redraw(redraw)
    }

    /// Shift everything one column left, dropping the leftmost column
    pub fn scroll_left(&mut self, redraw: bool) -> Result<()> {
        self.buffer.scroll_left();
        self.redraw(redraw)
    }

    /// Shift everything one column right, dropping the rightmost column
    pub fn scroll_right(&mut self, redraw: bool) -> Result<()> {
        self.buffer.scroll_right();
        self.redraw(redraw)
    }

    /// Shift everything one column left, wrapping around
    pub fn rotate_left(&mut self, redraw: bool) -> Result<()> {
        self.buffer.rotate_left();
        self.redraw(redraw)
    }

    /// Shift everything one column right, wrapping around
    pub fn rotate_right(&mut self, redraw: bool) -> Result<()> {
        self.buffer.rotate_right();
        self.redraw(redraw)
    }

    /// Send the whole buffer, one transfer per digit position
    pub fn flush(&mut self) -> Result<()> {
        let mut buf = self.buffer.as_slice().to_vec();
        if self.invert {
            buf.iter_mut().for_each(|b| *b = !*b);
        }
        if self.quarter_turns > 0 {
            buf = buf
                .chunks(Flag::DIGITS)
                .flat_map(|tile| {
                    let mut tile = rotate8x8(tile);
                    for _ in 1..self.quarter_turns {
                        tile = rotate8x8(&tile);
                    }
                    tile
                })
                .collect();
        }
        if self.buffer.is_vertical() {
            buf = transpose_tiles(&buf);
        }
        for frame in frames(&buf, self.buffer.devices()) {
            self.interface.data(&frame)?;
        }
        Ok(())
    }

    /// Blank and shut down every chip, once
    pub fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        log::info!("Cleaning up MAX7219 cascade");
        let cleared = self.clear(None);
        let shut_down = self.command(Cmd::SHUTDOWN, Flag::SHUTDOWN_MODE);
        cleared.and(shut_down)?;
        self.cleaned_up = true;
        Ok(())
    }

    /// Keep the display lit when dropped
    pub fn set_persist(&mut self, persist: bool) {
        self.persist = persist;
    }

    fn redraw(&mut self, redraw: bool) -> Result<()> {
        if redraw {
            self.flush()
        } else {
            Ok(())
        }
    }
}

impl<SPI: SpiDevice> Drop for Cascade<SPI> {
    fn drop(&mut self) {
        if self.persist {
            return;
        }
        if let Err(e) = self.cleanup() {
            log::warn!("MAX7219 cascade cleanup failed: {}", e);
        }
    }
}

/// Number base for [`SegmentDisplay::write_number`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Radix {
    /// Base 8
    Octal,
    /// Base 10, fractional values allowed
    #[default]
    Decimal,
    /// Base 16, lower case
    Hex,
}

/// Hex digit patterns used by [`SegmentDisplay::letter`]
pub const fn hex_digit(ch: char) -> Option<u8> {
    let pattern = match ch {
        ' ' => 0x00,
        '-' => 0x01,
        '0' => 0x7e,
        '1' => 0x30,
        '2' => 0x6d,
        '3' => 0x79,
        '4' => 0x33,
        '5' => 0x5b,
        '6' => 0x5f,
        '7' => 0x70,
        '8' => 0x7f,
        '9' => 0x7b,
        'a' => 0x77,
        'b' => 0x1f,
        'c' => 0x4e,
        'd' => 0x3d,
        'e' => 0x4f,
        'f' => 0x47,
        _ => return None,
    };
    Some(pattern)
}

/// Seven-segment modules on a MAX7219 cascade
///
/// Digit position 7 is the leftmost digit of a module.
pub struct SegmentDisplay<SPI: SpiDevice> {
    cascade: Cascade<SPI>,
}

impl<SPI> SegmentDisplay<SPI>
where
    SPI: SpiDevice,
{
    /// Create and initialize `cascaded` modules
    pub fn new(spi: SPI, cascaded: usize) -> Result<Self> {
        Ok(SegmentDisplay {
            cascade: Cascade::new(spi, cascaded, false)?,
        })
    }

    /// The underlying cascade
    pub fn cascade(&mut self) -> &mut Cascade<SPI> {
        &mut self.cascade
    }

    /// Show `ch` at `position` of module `device`; panics on a character without a pattern
    pub fn letter(
        &mut self,
        device: usize,
        position: usize,
        ch: char,
        dot: bool,
        redraw: bool,
    ) -> Result<()> {
        let Some(pattern) = hex_digit(ch) else {
            panic!("No segment pattern for {ch:?}");
        };
        let value = pattern | (u8::from(dot) << 7);
        self.cascade.set_byte(device, position, value, redraw)
    }

    /// Format `value` printf style and show it on module `device`
    ///
    /// The field is 8 characters wide, 9 with decimal places since the point shares a
    /// digit. Octal and hex print the integer part. When the text does not fit the
    /// module is blanked and [`Error::Overflow`] is returned.
    pub fn write_number(
        &mut self,
        device: usize,
        value: f64,
        radix: Radix,
        decimal_places: usize,
        zero_pad: bool,
        left_justify: bool,
    ) -> Result<()> {
        assert!(device < self.cascade.buffer().devices(), "Invalid deviceId: {device}");
        let text = format_number(value, radix, decimal_places, zero_pad, left_justify);

        let mut position = Flag::DIGITS as isize - 1;
        for ch in text.chars() {
            if position < 0 {
                self.cascade.clear(Some(device))?;
                return Err(Error::Overflow { text });
            }
            if ch == '.' {
                continue;
            }
            let dot = decimal_places > 0 && position == decimal_places as isize;
            self.letter(device, position as usize, ch, dot, false)?;
            position -= 1;
        }
        self.cascade.flush()
    }
}

fn format_number(
    value: f64,
    radix: Radix,
    decimal_places: usize,
    zero_pad: bool,
    left_justify: bool,
) -> String {
    let width = if decimal_places > 0 { Flag::DIGITS + 1 } else { Flag::DIGITS };
    let negative = value.is_sign_negative() && value != 0.0;
    let body = match radix {
        Radix::Decimal => format!("{:.*}", decimal_places, value.abs()),
        Radix::Octal => format!("{:0>1$o}", value.abs() as u64, decimal_places),
        Radix::Hex => format!("{:0>1$x}", value.abs() as u64, decimal_places),
    };
    let sign = if negative { "-" } else { "" };
    let len = sign.len() + body.len();
    let fill = width.saturating_sub(len);
    if left_justify {
        format!("{sign}{body}{}", " ".repeat(fill))
    } else if zero_pad {
        format!("{sign}{}{body}", "0".repeat(fill))
    } else {
        format!("{}{sign}{body}", " ".repeat(fill))
    }
}

/// 8x8 matrix modules on a MAX7219 cascade
///
/// Column `x` of the whole chain is buffer byte `x`, row `y` is bit `y`.
pub struct MatrixDisplay<SPI: SpiDevice> {
    cascade: Cascade<SPI>,
}

impl<SPI> MatrixDisplay<SPI>
where
    SPI: SpiDevice,
{
    /// Create and initialize `cascaded` modules
    pub fn new(spi: SPI, cascaded: usize, vertical: bool) -> Result<Self> {
        Ok(MatrixDisplay {
            cascade: Cascade::new(spi, cascaded, vertical)?,
        })
    }

    /// The underlying cascade
    pub fn cascade(&mut self) -> &mut Cascade<SPI> {
        &mut self.cascade
    }

    /// Light or clear one pixel
    pub fn pixel(&mut self, x: usize, y: usize, on: bool, redraw: bool) -> Result<()> {
        assert!(x < self.cascade.buffer.len(), "Invalid column: {x}");
        assert!(y < Flag::DIGITS, "Invalid row: {y}");
        let column = &mut self.cascade.buffer.as_mut_slice()[x];
        if on {
            *column |= 1 << y;
        } else {
            *column &= !(1 << y);
        }
        self.cascade.redraw(redraw)
    }

    /// Move every column up one pixel
    pub fn scroll_up(&mut self, redraw: bool) -> Result<()> {
        self.cascade.buffer.as_mut_slice().iter_mut().for_each(|b| *b >>= 1);
        self.cascade.redraw(redraw)
    }

    /// Move every column down one pixel
    pub fn scroll_down(&mut self, redraw: bool) -> Result<()> {
        self.cascade.buffer.as_mut_slice().iter_mut().for_each(|b| *b <<= 1);
        self.cascade.redraw(redraw)
    }

    /// Show lit pixels dark and dark pixels lit
    pub fn invert(&mut self, invert: bool, redraw: bool) -> Result<()> {
        self.cascade.invert = invert;
        self.cascade.redraw(redraw)
    }

    /// Turn every tile counter-clockwise by `angle` (0, 90, 180 or 270) on output
    pub fn orientation(&mut self, angle: u16, redraw: bool) -> Result<()> {
        assert!(matches!(angle, 0 | 90 | 180 | 270), "Invalid orientation: {angle}");
        self.cascade.quarter_turns = (angle / 90) as u8;
        self.cascade.redraw(redraw)
    }
}
