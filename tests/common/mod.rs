//! Test doubles shared by the integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use embedded_hal::spi::{ErrorKind, ErrorType, Operation, SpiDevice};
use embedded_hal_mock::eh1::spi::Transaction as SpiTransaction;

/// The three SPI expectations of one `SpiDevice::write`
pub fn spi_device_write(data: &[u8]) -> [SpiTransaction<u8>; 3] {
    [
        SpiTransaction::transaction_start(),
        SpiTransaction::write_vec(data.to_vec()),
        SpiTransaction::transaction_end(),
    ]
}

/// Expectations for a list of writes, in order
pub fn spi_device_writes<I, B>(writes: I) -> Vec<SpiTransaction<u8>>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    writes
        .into_iter()
        .flat_map(|data| spi_device_write(data.as_ref()))
        .collect()
}

/// `[register, value]` repeated for every chip
pub fn every_chip(register: u8, value: u8, chips: usize) -> Vec<u8> {
    [register, value].repeat(chips)
}

/// SPI device that keeps every write, shared between clones
#[derive(Clone, Default)]
pub struct Recorder {
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
    failing: Arc<Mutex<Option<u8>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded writes
    pub fn take(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.writes.lock().unwrap())
    }

    pub fn last(&self) -> Option<Vec<u8>> {
        self.writes.lock().unwrap().last().cloned()
    }

    /// Reject writes starting with `first`, or accept everything again with `None`
    pub fn fail_on(&self, first: Option<u8>) {
        *self.failing.lock().unwrap() = first;
    }
}

impl ErrorType for Recorder {
    type Error = ErrorKind;
}

impl SpiDevice for Recorder {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), ErrorKind> {
        let failing = *self.failing.lock().unwrap();
        let mut writes = self.writes.lock().unwrap();
        for op in operations {
            if let Operation::Write(data) = op {
                if failing.is_some() && data.first() == failing.as_ref() {
                    return Err(ErrorKind::Other);
                }
                writes.push(data.to_vec());
            }
        }
        Ok(())
    }
}
