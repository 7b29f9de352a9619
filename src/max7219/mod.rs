//! MAX7219 LED driver chips
//!
//! A MAX7219 drives 64 LEDs as 8 digits of 8 segments: an 8x8 matrix module uses
//! each digit register as one column, a seven-segment module as one character.
//! Chips are daisy chained, sharing clock and chip select, so every transfer carries
//! one `[register, value]` pair per chip.
//!
//! - [`Max7219`] takes whole monochrome bitmaps
//! - [`Cascade`], [`SegmentDisplay`] and [`MatrixDisplay`] work on a byte buffer

mod cascade;
mod cmd;
mod driver;
mod flag;
mod legacy;

pub use cascade::{frames, rotate8x8, transpose_tiles, CascadeBuffer};
pub use cmd::Cmd;
pub use driver::{BlockOrientation, Max7219, Max7219Config};
pub use flag::Flag;
pub use legacy::{hex_digit, Cascade, MatrixDisplay, Radix, SegmentDisplay};
