/// Register values used by the MAX7219 drivers.
pub struct Flag;
#[allow(missing_docs)]
impl Flag {
    // Shutdown (0x0C)
    pub const SHUTDOWN_MODE: u8 = 0x00;
    pub const NORMAL_OPERATION: u8 = 0x01;

    // Decode Mode (0x09), raw segment/column bits on every digit
    pub const NO_DECODE: u8 = 0x00;

    // Scan Limit (0x0B), scan all 8 digits
    pub const SCAN_ALL_DIGITS: u8 = 0x07;

    // Display Test (0x0F)
    pub const DISPLAY_TEST_OFF: u8 = 0x00;
    pub const DISPLAY_TEST_ON: u8 = 0x01;

    // Intensity (0x0A)
    pub const INTENSITY_MAX: u8 = 0x0F;

    /// Digits (or columns) per chip
    pub const DIGITS: usize = 8;

    /// Contrast applied at start-up, 0 to 255
    pub const DEFAULT_CONTRAST: u8 = 0x70;
}
