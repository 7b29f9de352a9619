//! LED matrix and segment display drivers
//!
//! Drives daisy-chained MAX7219 matrices and seven-segment modules, WS2812 and APA102
//! addressable strips, the Unicorn HAT HD and HUB08 scan-driven panels from a
//! single-board computer.
//!
//! Every driver translates a logical [`Bitmap`] (or a text buffer for the segment
//! devices) into the byte sequences its chip expects and pushes them through an
//! [`embedded_hal`] transport: [`embedded_hal::spi::SpiDevice`] for the serial chips,
//! [`embedded_hal::digital::OutputPin`] and [`embedded_hal::pwm::SetDutyCycle`] for the
//! HUB08 panel.
//!
//! ### Usage
//! 1. create the device with its SPI handle (or pins) and a config struct
//! 1. draw onto a [`Bitmap`] of the device's size, preferably with
//!    [`embedded_graphics`](https://github.com/embedded-graphics/embedded-graphics)
//! 1. push the frame with [`Device::display`]
//!
//! ```no_run
//! use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, primitives::*};
//! use ledmatrix_hal::{max7219::{Max7219, Max7219Config}, Bitmap, Device};
//!
//! fn demo<SPI: embedded_hal::spi::SpiDevice>(spi: SPI) -> ledmatrix_hal::Result<()> {
//!     let mut device = Max7219::new(spi, Max7219Config::cascaded(4))?;
//!     let size = device.size();
//!     let mut frame = Bitmap::<BinaryColor>::blank(size.width, size.height);
//!     Rectangle::new(Point::zero(), size)
//!         .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
//!         .draw(&mut frame)
//!         .ok();
//!     device.display(&frame)
//! }
//! ```
#![deny(missing_docs)]
#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod bitmap;
pub mod device;
pub mod error;
pub mod hub08;
pub mod interface;
pub mod max7219;
pub mod neosegment;
pub mod segment_mapper;
pub mod sevensegment;
pub mod strip;

pub use bitmap::{Bitmap, ColorMode, Rgba8888, Rotation};
pub use device::{Device, Dummy};
pub use error::{Error, Result};
pub use interface::SerialInterface;
pub use segment_mapper::{dot_muncher, regular, SegmentPolicy};
