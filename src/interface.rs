//! Serial interface using SPI
//!
//! Every serial chip in this crate only ever writes: the interface owns the
//! [`SpiDevice`] and turns a failed transfer into [`Error::Transport`].
use display_interface::DisplayError;
use embedded_hal::spi::SpiDevice;

use crate::error::{Error, Result};

/// Owned byte sink in front of an SPI device
pub struct SerialInterface<SPI> {
    /// SPI device, chip select handled by the implementation
    spi: SPI,
}

impl<SPI> SerialInterface<SPI> {
    /// Wrap an SPI device
    pub fn new(spi: SPI) -> Self {
        SerialInterface { spi }
    }
}

impl<SPI> SerialInterface<SPI>
where
    SPI: SpiDevice,
{
    /// Send one transfer
    pub fn data(&mut self, data: &[u8]) -> Result<()> {
        match self.spi.write(data) {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("SPI write error for {} byte frame: {:?}", data.len(), e);
                Err(Error::Transport(DisplayError::BusWriteError))
            }
        }
    }

    /// Send the same `[register, value]` pair once per cascaded chip, in one transfer
    pub fn command(&mut self, register: u8, value: u8, repetitions: usize) -> Result<()> {
        let frame = [register, value].repeat(repetitions);
        self.data(&frame)
    }

    /// Send `value` repeated `repetitions` times in one transfer
    pub fn data_x_times(&mut self, value: u8, repetitions: usize) -> Result<()> {
        let frame = vec![value; repetitions];
        self.data(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use embedded_hal::spi::ErrorKind;

    #[test]
    fn command_is_replicated_in_one_transfer() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x0C, 1, 0x0C, 1, 0x0C, 1]),
            SpiTransaction::transaction_end(),
        ];
        let mut spi = SpiMock::new(&expectations);
        let mut interface = SerialInterface::new(spi.clone());
        interface.command(0x0C, 1, 3).unwrap();
        spi.done();
    }

    struct Broken;

    impl embedded_hal::spi::ErrorType for Broken {
        type Error = ErrorKind;
    }

    impl SpiDevice for Broken {
        fn transaction(
            &mut self,
            _operations: &mut [embedded_hal::spi::Operation<'_, u8>],
        ) -> core::result::Result<(), ErrorKind> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn failed_write_maps_to_transport_error() {
        let mut interface = SerialInterface::new(Broken);
        let err = interface.data_x_times(0, 2).unwrap_err();
        assert!(matches!(err, Error::Transport(DisplayError::BusWriteError)));
    }
}
