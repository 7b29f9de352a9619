/// MAX7219 register addresses
///
/// Every frame on the wire is a `[register, value]` pair per cascaded chip.
pub struct Cmd;
#[allow(missing_docs)]
impl Cmd {
    pub const NOOP: u8 = 0x00;

    // Digit/column registers, DIGIT_0 drives the first output line
    pub const DIGIT_0: u8 = 0x01;
    pub const DIGIT_1: u8 = 0x02;
    pub const DIGIT_2: u8 = 0x03;
    pub const DIGIT_3: u8 = 0x04;
    pub const DIGIT_4: u8 = 0x05;
    pub const DIGIT_5: u8 = 0x06;
    pub const DIGIT_6: u8 = 0x07;
    pub const DIGIT_7: u8 = 0x08;

    // Control
    pub const DECODE_MODE: u8 = 0x09;
    pub const INTENSITY: u8 = 0x0A;
    pub const SCAN_LIMIT: u8 = 0x0B;
    pub const SHUTDOWN: u8 = 0x0C;
    pub const DISPLAY_TEST: u8 = 0x0F;
}

impl Cmd {
    /// Register of digit/column `position` (0 to 7)
    pub const fn digit(position: u8) -> u8 {
        Self::DIGIT_0 + position
    }
}
