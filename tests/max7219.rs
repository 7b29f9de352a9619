//! MAX7219 chain: wire traffic for init, power, contrast and frames
//!
//! Run with: cargo test --test max7219

mod common;

use common::{every_chip, spi_device_writes, Recorder};
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use embedded_hal_mock::eh1::spi::Mock as SpiMock;
use ledmatrix_hal::max7219::{BlockOrientation, Max7219, Max7219Config};
use ledmatrix_hal::{Bitmap, Device, Error, Rotation};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_writes(chips: usize) -> Vec<Vec<u8>> {
    let mut writes = vec![
        every_chip(11, 7, chips),
        every_chip(9, 0, chips),
        every_chip(15, 0, chips),
        every_chip(10, 7, chips),
    ];
    writes.extend((1..=8).map(|digit| every_chip(digit, 0, chips)));
    writes.push(every_chip(12, 1, chips));
    writes
}

fn outline(
    size: Size,
    top_left: Point,
    bottom_right: Point,
) -> anyhow::Result<Bitmap<BinaryColor>> {
    let mut frame = Bitmap::blank(size.width, size.height);
    Rectangle::with_corners(top_left, bottom_right)
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(&mut frame)?;
    Ok(frame)
}

fn swap_chips(frames: &[Vec<u8>]) -> Vec<Vec<u8>> {
    frames
        .iter()
        .map(|frame| frame.chunks(2).rev().flatten().copied().collect())
        .collect()
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn init_8x8() {
    let mut spi = SpiMock::new(&spi_device_writes(init_writes(1)));
    let mut device = Max7219::new(spi.clone(), Max7219Config::default()).unwrap();
    assert_eq!(device.cascaded(), 1);
    assert_eq!(device.size(), Size::new(8, 8));
    device.set_persist(true);
    spi.done();
}

#[test]
fn init_16x8() {
    let mut spi = SpiMock::new(&spi_device_writes(init_writes(2)));
    let mut device = Max7219::new(spi.clone(), Max7219Config::size(16, 8)).unwrap();
    assert_eq!(device.cascaded(), 2);
    device.set_persist(true);
    spi.done();
}

#[test]
fn init_cascaded() {
    let device = Max7219::new(Recorder::new(), Max7219Config::cascaded(4)).unwrap();
    assert_eq!(device.size(), Size::new(32, 8));
}

#[test]
fn rotated_chain_swaps_axes() {
    let config = Max7219Config::cascaded(4).with_rotate(Rotation::Deg90);
    let device = Max7219::new(Recorder::new(), config).unwrap();
    assert_eq!(device.size(), Size::new(8, 32));
}

#[test]
fn init_invalid_dimensions() {
    let err = Max7219::new(Recorder::new(), Max7219Config::size(59, 22))
        .err()
        .unwrap();
    assert!(matches!(err, Error::UnsupportedMode { width: 59, height: 22 }));
    assert_eq!(err.to_string(), "Unsupported display mode: 59 x 22");
}

#[test]
fn drop_blanks_and_shuts_down() {
    let mut writes = init_writes(1);
    writes.push(every_chip(12, 0, 1));
    writes.extend((1..=8).map(|digit| every_chip(digit, 0, 1)));
    let mut spi = SpiMock::new(&spi_device_writes(writes));
    let device = Max7219::new(spi.clone(), Max7219Config::default()).unwrap();
    drop(device);
    spi.done();
}

#[test]
fn failed_shutdown_still_blanks_and_can_retry() {
    let spi = Recorder::new();
    let mut device = Max7219::new(spi.clone(), Max7219Config::cascaded(2)).unwrap();
    spi.take();

    spi.fail_on(Some(12));
    assert!(matches!(device.cleanup(), Err(Error::Transport(_))));
    let blank: Vec<Vec<u8>> = (1..=8).map(|digit| every_chip(digit, 0, 2)).collect();
    assert_eq!(spi.take(), blank);

    spi.fail_on(None);
    device.cleanup().unwrap();
    let mut expected = vec![every_chip(12, 0, 2)];
    expected.extend(blank);
    assert_eq!(spi.take(), expected);

    drop(device);
    assert!(spi.take().is_empty());
}

// ---------------------------------------------------------------------------
// Power and contrast
// ---------------------------------------------------------------------------

#[test]
fn hide() {
    let mut writes = init_writes(5);
    writes.push(every_chip(12, 0, 5));
    let mut spi = SpiMock::new(&spi_device_writes(writes));
    let mut device = Max7219::new(spi.clone(), Max7219Config::cascaded(5)).unwrap();
    device.hide().unwrap();
    device.set_persist(true);
    spi.done();
}

#[test]
fn show() {
    let mut writes = init_writes(3);
    writes.push(every_chip(12, 1, 3));
    let mut spi = SpiMock::new(&spi_device_writes(writes));
    let mut device = Max7219::new(spi.clone(), Max7219Config::cascaded(3)).unwrap();
    device.show().unwrap();
    device.set_persist(true);
    spi.done();
}

#[test]
fn contrast() {
    let mut writes = init_writes(6);
    writes.push(every_chip(10, 6, 6));
    let mut spi = SpiMock::new(&spi_device_writes(writes));
    let mut device = Max7219::new(spi.clone(), Max7219Config::cascaded(6)).unwrap();
    device.contrast(0x6B).unwrap();
    device.set_persist(true);
    spi.done();
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

#[test]
fn display_outline() -> anyhow::Result<()> {
    let spi = Recorder::new();
    let mut device = Max7219::new(spi.clone(), Max7219Config::cascaded(2))?;
    spi.take();

    let frame = outline(device.size(), Point::zero(), Point::new(15, 7))?;
    device.display(&frame)?;

    let mut expected = vec![vec![1, 0x81, 1, 0xFF]];
    expected.extend((2..=7).map(|d| vec![d, 0x81, d, 0x81]));
    expected.push(vec![8, 0xFF, 8, 0x81]);
    assert_eq!(spi.take(), expected);
    Ok(())
}

#[test]
fn normal_alignment() -> anyhow::Result<()> {
    let spi = Recorder::new();
    let mut device = Max7219::new(spi.clone(), Max7219Config::cascaded(2))?;
    spi.take();

    device.display(&outline(device.size(), Point::zero(), Point::new(15, 3))?)?;

    let mut expected = vec![vec![1, 0x09, 1, 0x0F]];
    expected.extend((2..=7).map(|d| vec![d, 0x09, d, 0x09]));
    expected.push(vec![8, 0x0F, 8, 0x09]);
    assert_eq!(spi.take(), expected);
    Ok(())
}

#[test]
fn block_realignment() -> anyhow::Result<()> {
    let spi = Recorder::new();
    let config = Max7219Config::cascaded(2).with_block_orientation(BlockOrientation::DegMinus90);
    let mut device = Max7219::new(spi.clone(), config)?;
    spi.take();

    device.display(&outline(device.size(), Point::zero(), Point::new(15, 3))?)?;

    let mut expected: Vec<Vec<u8>> = (1..=4).map(|d| vec![d, 0x00, d, 0x00]).collect();
    expected.push(vec![5, 0xFF, 5, 0xFF]);
    expected.push(vec![6, 0x80, 6, 0x01]);
    expected.push(vec![7, 0x80, 7, 0x01]);
    expected.push(vec![8, 0xFF, 8, 0xFF]);
    assert_eq!(spi.take(), expected);
    Ok(())
}

#[test]
fn rectangle_per_orientation() -> anyhow::Result<()> {
    let frame = outline(Size::new(16, 8), Point::zero(), Point::new(15, 3))?;
    let frames = |orientation, reverse| -> anyhow::Result<Vec<Vec<u8>>> {
        let config = Max7219Config::cascaded(2)
            .with_block_orientation(orientation)
            .with_reverse_order(reverse);
        Ok(Max7219::new(Recorder::new(), config)?.frames(&frame))
    };
    let literal = |pairs: [(u8, u8); 8]| -> Vec<Vec<u8>> {
        pairs
            .iter()
            .zip(1u8..)
            .map(|(&(first, second), digit)| vec![digit, first, digit, second])
            .collect()
    };

    assert_eq!(
        frames(BlockOrientation::Deg0, false)?,
        literal([
            (0x09, 0x0F),
            (0x09, 0x09),
            (0x09, 0x09),
            (0x09, 0x09),
            (0x09, 0x09),
            (0x09, 0x09),
            (0x09, 0x09),
            (0x0F, 0x09),
        ])
    );
    assert_eq!(
        frames(BlockOrientation::Deg90, false)?,
        literal([
            (0xFF, 0xFF),
            (0x01, 0x80),
            (0x01, 0x80),
            (0xFF, 0xFF),
            (0, 0),
            (0, 0),
            (0, 0),
            (0, 0),
        ])
    );
    assert_eq!(
        frames(BlockOrientation::DegMinus90, false)?,
        literal([
            (0, 0),
            (0, 0),
            (0, 0),
            (0, 0),
            (0xFF, 0xFF),
            (0x80, 0x01),
            (0x80, 0x01),
            (0xFF, 0xFF),
        ])
    );
    assert_eq!(
        frames(BlockOrientation::Deg180, false)?,
        literal([
            (0xF0, 0x90),
            (0x90, 0x90),
            (0x90, 0x90),
            (0x90, 0x90),
            (0x90, 0x90),
            (0x90, 0x90),
            (0x90, 0x90),
            (0x90, 0xF0),
        ])
    );
    assert_eq!(
        frames(BlockOrientation::Deg0, true)?,
        literal([
            (0x0F, 0x09),
            (0x09, 0x09),
            (0x09, 0x09),
            (0x09, 0x09),
            (0x09, 0x09),
            (0x09, 0x09),
            (0x09, 0x09),
            (0x09, 0x0F),
        ])
    );
    assert_eq!(
        frames(BlockOrientation::Deg90, true)?,
        literal([
            (0xFF, 0xFF),
            (0x80, 0x01),
            (0x80, 0x01),
            (0xFF, 0xFF),
            (0, 0),
            (0, 0),
            (0, 0),
            (0, 0),
        ])
    );
    Ok(())
}

fn pixels_strategy() -> impl Strategy<Value = Bitmap<BinaryColor>> {
    proptest::collection::vec(any::<bool>(), 16 * 8).prop_map(|bits| {
        let pixels = bits.into_iter().map(BinaryColor::from).collect();
        Bitmap::from_pixels(16, 8, pixels)
    })
}

proptest! {
    #[test]
    fn contrast_maps_to_intensity(level in any::<u8>()) {
        let spi = Recorder::new();
        let mut device = Max7219::new(spi.clone(), Max7219Config::cascaded(2)).unwrap();
        device.contrast(level).unwrap();
        prop_assert_eq!(spi.last().unwrap(), every_chip(10, level >> 4, 2));
    }

    #[test]
    fn contrast_is_monotonic(a in any::<u8>(), b in any::<u8>()) {
        let (low, high) = (a.min(b), a.max(b));
        let spi = Recorder::new();
        let mut device = Max7219::new(spi.clone(), Max7219Config::default()).unwrap();
        device.contrast(low).unwrap();
        let low = spi.last().unwrap()[1];
        device.contrast(high).unwrap();
        let high = spi.last().unwrap()[1];
        prop_assert!(low <= high);
    }

    #[test]
    fn reverse_order_swaps_chips(frame in pixels_strategy(), turned in any::<bool>()) {
        let orientation = if turned {
            BlockOrientation::DegMinus90
        } else {
            BlockOrientation::Deg0
        };
        let config = Max7219Config::cascaded(2).with_block_orientation(orientation);
        let normal = Max7219::new(Recorder::new(), config.clone()).unwrap();
        let reversed = Max7219::new(Recorder::new(), config.with_reverse_order(true)).unwrap();
        prop_assert_eq!(reversed.frames(&frame), swap_chips(&normal.frames(&frame)));
    }
}
