//! Column/digit buffer for a chain of MAX7219 chips
//!
//! The buffer holds 8 bytes per chip. Byte `device * 8 + position` is what digit
//! register `position` of chip `device` shows: one column of an 8x8 matrix, or one
//! digit of a seven-segment module.

use crate::max7219::{cmd::Cmd, flag::Flag};

const DIGITS: usize = Flag::DIGITS;

/// Flat byte buffer for `devices` cascaded chips
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeBuffer {
    devices: usize,
    buffer: Vec<u8>,
    vertical: bool,
}

impl CascadeBuffer {
    /// Zeroed buffer; `vertical` turns every tile 90 degrees counter-clockwise on output
    pub fn new(devices: usize, vertical: bool) -> Self {
        assert!(devices > 0, "Must have at least one device!");
        Self {
            devices,
            buffer: vec![0; devices * DIGITS],
            vertical,
        }
    }

    /// Number of cascaded chips
    pub fn devices(&self) -> usize {
        self.devices
    }

    /// Number of bytes, always `devices * 8`
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Never true: a chain has at least one chip
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Raw buffer contents
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Mutable raw buffer; the length cannot change
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Whether tiles are transposed on output
    pub fn is_vertical(&self) -> bool {
        self.vertical
    }

    fn offset(&self, device: usize, position: usize) -> usize {
        assert!(device < self.devices, "Invalid deviceId: {device}");
        assert!(position < DIGITS, "Invalid digit/column: {position}");
        device * DIGITS + position
    }

    /// Store `value` for digit/column `position` (0 to 7) of chip `device`
    pub fn set_byte(&mut self, device: usize, position: usize, value: u8) {
        let offset = self.offset(device, position);
        self.buffer[offset] = value;
    }

    /// Value stored for digit/column `position` of chip `device`
    pub fn byte(&self, device: usize, position: usize) -> u8 {
        self.buffer[self.offset(device, position)]
    }

    /// Zero one chip, or all of them
    pub fn clear(&mut self, device: Option<usize>) {
        match device {
            Some(device) => {
                let start = self.offset(device, 0);
                self.buffer[start..start + DIGITS].fill(0);
            }
            None => self.buffer.fill(0),
        }
    }

    /// Shift one column left, the right edge becomes blank
    pub fn scroll_left(&mut self) {
        self.buffer.remove(0);
        self.buffer.push(0);
    }

    /// Shift one column right, the left edge becomes blank
    pub fn scroll_right(&mut self) {
        self.buffer.pop();
        self.buffer.insert(0, 0);
    }

    /// Shift one column left, wrapping the left edge around
    pub fn rotate_left(&mut self) {
        self.buffer.rotate_left(1);
    }

    /// Shift one column right, wrapping the right edge around
    pub fn rotate_right(&mut self) {
        self.buffer.rotate_right(1);
    }

    /// The 8 wire frames for the current contents
    pub fn frames(&self) -> Vec<Vec<u8>> {
        if self.vertical {
            frames(&transpose_tiles(&self.buffer), self.devices)
        } else {
            frames(&self.buffer, self.devices)
        }
    }
}

/// Group a buffer by digit position
///
/// Frame `p` holds the `[digit register, value]` pair of position `p` for every
/// chip in chain order, so one transfer updates that digit on all of them.
pub fn frames(buf: &[u8], devices: usize) -> Vec<Vec<u8>> {
    assert_eq!(buf.len(), devices * DIGITS, "Preprocessed buffer is wrong size");
    (0..DIGITS)
        .map(|position| {
            (0..devices)
                .flat_map(|device| [Cmd::digit(position as u8), buf[device * DIGITS + position]])
                .collect()
        })
        .collect()
}

/// Turn an 8x8 tile 90 degrees counter-clockwise
///
/// Bit `b` of `tile[i]` ends up as bit `7 - i` of the result's byte `b`.
pub fn rotate8x8(tile: &[u8]) -> [u8; 8] {
    assert_eq!(tile.len(), DIGITS);
    let mut out = [0u8; 8];
    for (i, value) in tile.iter().enumerate() {
        for (bit, slot) in out.iter_mut().enumerate() {
            *slot |= ((value >> bit) & 1) << (7 - i);
        }
    }
    out
}

/// Apply [`rotate8x8`] to every tile of a buffer
pub fn transpose_tiles(buf: &[u8]) -> Vec<u8> {
    buf.chunks(DIGITS).flat_map(rotate8x8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_group_by_position() {
        let mut buf = CascadeBuffer::new(2, false);
        buf.set_byte(0, 0, 0xAA);
        buf.set_byte(1, 7, 0x55);
        let frames = buf.frames();
        assert_eq!(frames.len(), 8);
        assert_eq!(frames[0], [1, 0xAA, 1, 0x00]);
        assert_eq!(frames[7], [8, 0x00, 8, 0x55]);
    }

    #[test]
    fn scroll_is_not_circular() {
        let mut buf = CascadeBuffer::new(1, false);
        buf.as_mut_slice().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        buf.scroll_left();
        assert_eq!(buf.as_slice(), [2, 3, 4, 5, 6, 7, 8, 0]);
        buf.scroll_right();
        buf.scroll_right();
        assert_eq!(buf.as_slice(), [0, 0, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn rotate_wraps() {
        let mut buf = CascadeBuffer::new(1, false);
        buf.as_mut_slice().copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        buf.rotate_left();
        assert_eq!(buf.as_slice(), [2, 3, 4, 5, 6, 7, 8, 1]);
        buf.rotate_right();
        buf.rotate_right();
        assert_eq!(buf.as_slice(), [8, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn clear_one_device() {
        let mut buf = CascadeBuffer::new(2, false);
        buf.as_mut_slice().fill(0xFF);
        buf.clear(Some(1));
        assert_eq!(&buf.as_slice()[..8], [0xFF; 8]);
        assert_eq!(&buf.as_slice()[8..], [0x00; 8]);
    }

    #[test]
    fn rotate8x8_quarter_turn() {
        // bottom row lit becomes the left column after a counter-clockwise turn
        let tile = [0x80; 8];
        assert_eq!(rotate8x8(&tile), [0, 0, 0, 0, 0, 0, 0, 0xFF]);
        let tile = [0x01, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(rotate8x8(&tile), [0x80, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn four_turns_are_identity() {
        let tile = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        let mut out = tile;
        for _ in 0..4 {
            out = rotate8x8(&out);
        }
        assert_eq!(out, tile);
    }

    #[test]
    fn vertical_buffer_transposes_on_output() {
        let mut buf = CascadeBuffer::new(1, true);
        buf.set_byte(0, 0, 0x01);
        let frames = buf.frames();
        assert_eq!(frames[0], [1, 0x80]);
    }

    #[test]
    #[should_panic(expected = "Invalid deviceId")]
    fn set_byte_checks_device() {
        CascadeBuffer::new(2, false).set_byte(2, 0, 0);
    }

    #[test]
    #[should_panic(expected = "Invalid digit/column")]
    fn set_byte_checks_position() {
        CascadeBuffer::new(2, false).set_byte(0, 8, 0);
    }
}
