//! HUB08 single colour LED panels
//!
//! 64x16 and 64x32 panels built from shift registers and a row decoder, driven
//! directly from GPIO: two data lines, clock, latch, four row address lines and an
//! output enable used as PWM brightness control.

mod brightness;
mod driver;
mod pins;

pub use brightness::{duty_cycle, BRIGHTNESS_TABLE};
pub use driver::{scan_row, Frame, Hub08, Hub08Config, BYTES_PER_ROW};
pub use pins::{Hub08Pins, Pins};
