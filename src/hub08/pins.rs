//! Pin definitions for the HUB08 panel
//!
//! HUB08 connector pinout:
//!
//! ```text
//! GND *  * A
//! GND *  * B
//! GND *  * C
//!  EN *  * D
//!  R1 *  * G1
//!  R2 *  * G2
//! GND *  * LAT
//! GND *  * CLK
//! ```

use embedded_hal::{digital::OutputPin, pwm::SetDutyCycle};

/// Reference wiring on a Raspberry Pi header, physical board numbering
pub struct Pins;

#[allow(dead_code)]
impl Pins {
    // Shift register
    /// Shift clock (GPIO 11)
    pub const CLK: u8 = 23;
    /// Upper half red data (GPIO 10)
    pub const R1: u8 = 19;
    /// Lower half red data (GPIO 7)
    pub const R2: u8 = 7;

    // Row addressing and output control
    /// Latch, active low pulse (GPIO 25)
    pub const LAT: u8 = 22;
    /// Output enable, active low, driven as PWM (GPIO 24)
    pub const EN: u8 = 18;
    /// Row address bit 0 (GPIO 23)
    pub const A: u8 = 16;
    /// Row address bit 1 (GPIO 17)
    pub const B: u8 = 11;
    /// Row address bit 2 (GPIO 27)
    pub const C: u8 = 13;
    /// Row address bit 3 (GPIO 22)
    pub const D: u8 = 15;
}

/// The lines a HUB08 panel is driven through
///
/// A tuple `(r1, r2, clk, lat, a, b, c, d, en)` implements this when every member
/// is an [`OutputPin`] and `en` a [`SetDutyCycle`].
pub trait Hub08Pins {
    /// Upper half data
    type R1: OutputPin;
    /// Lower half data
    type R2: OutputPin;
    /// Shift clock
    type CLK: OutputPin;
    /// Latch
    type LAT: OutputPin;
    /// Row address bit 0
    type A: OutputPin;
    /// Row address bit 1
    type B: OutputPin;
    /// Row address bit 2
    type C: OutputPin;
    /// Row address bit 3
    type D: OutputPin;
    /// Output enable, active low
    type EN: SetDutyCycle;
    /// Upper half data
    fn r1(&mut self) -> &mut Self::R1;
    /// Lower half data
    fn r2(&mut self) -> &mut Self::R2;
    /// Shift clock
    fn clk(&mut self) -> &mut Self::CLK;
    /// Latch
    fn lat(&mut self) -> &mut Self::LAT;
    /// Row address bit 0
    fn a(&mut self) -> &mut Self::A;
    /// Row address bit 1
    fn b(&mut self) -> &mut Self::B;
    /// Row address bit 2
    fn c(&mut self) -> &mut Self::C;
    /// Row address bit 3
    fn d(&mut self) -> &mut Self::D;
    /// Output enable
    fn en(&mut self) -> &mut Self::EN;
}

impl<R1, R2, CLK, LAT, A, B, C, D, EN> Hub08Pins for (R1, R2, CLK, LAT, A, B, C, D, EN)
where
    R1: OutputPin,
    R2: OutputPin,
    CLK: OutputPin,
    LAT: OutputPin,
    A: OutputPin,
    B: OutputPin,
    C: OutputPin,
    D: OutputPin,
    EN: SetDutyCycle,
{
    type R1 = R1;
    type R2 = R2;
    type CLK = CLK;
    type LAT = LAT;
    type A = A;
    type B = B;
    type C = C;
    type D = D;
    type EN = EN;
    fn r1(&mut self) -> &mut R1 {
        &mut self.0
    }
    fn r2(&mut self) -> &mut R2 {
        &mut self.1
    }
    fn clk(&mut self) -> &mut CLK {
        &mut self.2
    }
    fn lat(&mut self) -> &mut LAT {
        &mut self.3
    }
    fn a(&mut self) -> &mut A {
        &mut self.4
    }
    fn b(&mut self) -> &mut B {
        &mut self.5
    }
    fn c(&mut self) -> &mut C {
        &mut self.6
    }
    fn d(&mut self) -> &mut D {
        &mut self.7
    }
    fn en(&mut self) -> &mut EN {
        &mut self.8
    }
}
