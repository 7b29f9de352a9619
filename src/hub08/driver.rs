//! HUB08 scan engine
//!
//! A HUB08 panel has no frame memory: it shows one row (or one pair of rows on 32 row
//! panels) at a time, so a background thread has to keep shifting rows out.
//!
//! ## Buffers
//!
//! Two frames of `rows x 8` bytes, one bit per column, bit clear = lit. The refresh
//! thread only reads the frame named by the `active` index; [`Device::display`]
//! fills the other one and then publishes it with a single store to `active`. Each
//! frame sits behind its own `RwLock`, which the writer only ever takes for the
//! inactive frame, so the two sides never wait on each other in normal operation.
//!
//! ## Row refresh
//!
//! 1. output enable to 100 % duty (panel dark, the line is active low)
//! 1. 64 bits shifted out LSB first on R1 (row `r`) and R2 (row `r + 16`)
//! 1. latch pulse
//! 1. row address on A to D
//! 1. output enable back to the brightness duty cycle
//!
//! then `r` advances modulo 16 and the thread sleeps for the refresh period.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use display_interface::DisplayError;
use embedded_graphics::{geometry::Size, pixelcolor::BinaryColor};
use embedded_hal::{
    digital::{OutputPin, PinState},
    pwm::SetDutyCycle,
};

use crate::bitmap::{Bitmap, Rotation};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::hub08::brightness::duty_cycle;
use crate::hub08::pins::Hub08Pins;

/// Bytes per row, 64 columns
pub const BYTES_PER_ROW: usize = 8;

/// Rows addressed by A to D
const SCAN_ROWS: usize = 16;

/// Panel width in pixels
const WIDTH: u32 = 64;

/// Duty cycle applied while the panel is set up
const INITIAL_DUTY: u8 = 50;

/// Bit pattern of a dark row
const DARK_ROW: [u8; BYTES_PER_ROW] = [0xFF; BYTES_PER_ROW];

/// One frame, row by row
pub type Frame = Vec<[u8; BYTES_PER_ROW]>;

/// Construction options for [`Hub08`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hub08Config {
    /// Panel width, 64 only
    pub width: u32,
    /// Panel height, 16 or 32
    pub height: u32,
    /// No rotation is supported
    pub rotate: Rotation,
    /// Pause between two row refreshes
    pub refresh_period: Duration,
    /// Brightness applied at start-up
    pub contrast: u8,
}

impl Default for Hub08Config {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: 16,
            rotate: Rotation::Deg0,
            refresh_period: Duration::from_micros(100),
            contrast: 0xFF,
        }
    }
}

impl Hub08Config {
    /// A 64x32 panel
    pub fn tall() -> Self {
        Self {
            height: 32,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.width != WIDTH || !matches!(self.height, 16 | 32) || self.rotate != Rotation::Deg0 {
            return Err(Error::UnsupportedMode {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// State shared with the refresh thread
struct Shared {
    buffers: [RwLock<Frame>; 2],
    active: AtomicUsize,
    state: AtomicBool,
    /// Microseconds between rows; negative tells the thread to exit
    period_us: AtomicI64,
    duty: AtomicU8,
}

impl Shared {
    fn frame(&self, index: usize) -> std::sync::RwLockReadGuard<'_, Frame> {
        self.buffers[index].read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// HUB08 single colour panel, refreshed by a background thread
///
/// The panel starts inactive: frames passed to `display` are dropped until `show`.
pub struct Hub08<P>
where
    P: Hub08Pins + Send + 'static,
{
    shared: Arc<Shared>,
    pins: Arc<Mutex<P>>,
    worker: Option<JoinHandle<Result<()>>>,
    height: u32,
    /// Lines were left idle by `stop`
    idle: bool,
    persist: bool,
    cleaned_up: bool,
}

impl<P> Hub08<P>
where
    P: Hub08Pins + Send + 'static,
{
    /// Set up the lines and start the refresh thread
    pub fn new(mut pins: P, config: Hub08Config) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Initializing HUB08 panel {}x{}, row period {:?}",
            config.width,
            config.height,
            config.refresh_period
        );

        set(pins.clk(), PinState::High)?;
        set(pins.r1(), PinState::High)?;
        set(pins.r2(), PinState::High)?;
        pwm(pins.en().set_duty_cycle_percent(INITIAL_DUTY))?;
        set(pins.lat(), PinState::High)?;
        set_address(&mut pins, 0)?;

        let rows = config.height as usize;
        let shared = Arc::new(Shared {
            buffers: [RwLock::new(vec![DARK_ROW; rows]), RwLock::new(vec![DARK_ROW; rows])],
            active: AtomicUsize::new(0),
            state: AtomicBool::new(false),
            period_us: AtomicI64::new(micros(config.refresh_period)),
            duty: AtomicU8::new(duty_cycle(config.contrast)),
        });
        let pins = Arc::new(Mutex::new(pins));

        let worker = {
            let shared = Arc::clone(&shared);
            let pins = Arc::clone(&pins);
            thread::Builder::new()
                .name("hub08-refresh".into())
                .spawn(move || refresh(&shared, &pins))?
        };

        Ok(Hub08 {
            shared,
            pins,
            worker: Some(worker),
            height: config.height,
            idle: false,
            persist: false,
            cleaned_up: false,
        })
    }

    /// Whether frames are being shown
    pub fn is_active(&self) -> bool {
        self.shared.state.load(Ordering::Acquire)
    }

    /// Current output enable duty cycle while lit
    pub fn duty(&self) -> u8 {
        self.shared.duty.load(Ordering::Relaxed)
    }

    /// Pause between two row refreshes
    pub fn refresh_period(&self) -> Option<Duration> {
        let us = self.shared.period_us.load(Ordering::Acquire);
        u64::try_from(us).ok().map(Duration::from_micros)
    }

    /// Change the pause between two row refreshes; ignored once stopped
    pub fn set_refresh_period(&mut self, period: Duration) {
        if self.worker.is_some() {
            self.shared.period_us.store(micros(period), Ordering::Release);
        }
    }

    /// Copy of the frame the refresh thread is reading
    pub fn active_snapshot(&self) -> Frame {
        let active = self.shared.active.load(Ordering::Acquire);
        self.shared.frame(active).clone()
    }

    /// Run `f` with the pins, e.g. to inspect a test double
    pub fn with_pins<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut lock(&self.pins))
    }

    /// Stop the refresh thread and leave the lines idle
    ///
    /// The thread finishes its current row first. Idle means output enable fully
    /// off, latch high and row address 0.
    pub fn stop(&mut self) -> Result<()> {
        self.shared.period_us.store(-1, Ordering::Release);
        let outcome = match self.worker.take() {
            Some(worker) => {
                log::debug!("Stopping HUB08 refresh thread");
                match worker.join() {
                    Ok(outcome) => outcome,
                    Err(_) => Err(Error::RefreshThreadPanicked),
                }
            }
            None if self.idle => return Ok(()),
            None => Ok(()),
        };
        let idle = self.idle_lines();
        outcome.and(idle)
    }

    fn idle_lines(&mut self) -> Result<()> {
        let mut pins = lock(&self.pins);
        pwm(pins.en().set_duty_cycle_fully_on())?;
        set(pins.lat(), PinState::High)?;
        set_address(&mut *pins, 0)?;
        self.idle = true;
        Ok(())
    }
}

impl<P> Device for Hub08<P>
where
    P: Hub08Pins + Send + 'static,
{
    type Color = BinaryColor;

    fn size(&self) -> Size {
        Size::new(WIDTH, self.height)
    }

    /// Fill the inactive frame and make it the active one; dropped while inactive
    fn display(&mut self, image: &Bitmap<BinaryColor>) -> Result<()> {
        image.assert_size(self.size());
        if !self.is_active() {
            log::debug!("HUB08 hidden, frame dropped");
            return Ok(());
        }

        let target = self.shared.active.load(Ordering::Acquire) ^ 1;
        {
            let mut frame = self.shared.buffers[target]
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for (row, bytes) in frame.iter_mut().enumerate() {
                for column in 0..WIDTH {
                    let mask = 1u8 << (column & 0x07);
                    let byte = &mut bytes[(column >> 3) as usize];
                    if image.pixel(column, row as u32).is_on() {
                        *byte &= !mask;
                    } else {
                        *byte |= mask;
                    }
                }
            }
        }
        self.shared.active.store(target, Ordering::Release);
        log::debug!("HUB08 flipped to frame {}", target);
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        pwm(lock(&self.pins).en().set_duty_cycle_percent(self.duty()))?;
        self.shared.state.store(true, Ordering::Release);
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        pwm(lock(&self.pins).en().set_duty_cycle_fully_on())?;
        self.shared.state.store(false, Ordering::Release);
        Ok(())
    }

    /// Takes effect from the next row refresh
    fn contrast(&mut self, level: u8) -> Result<()> {
        self.shared.duty.store(duty_cycle(level), Ordering::Relaxed);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        log::info!("Cleaning up HUB08 panel");
        // the thread is stopped whatever happened before
        let cleared = self.clear();
        let hidden = self.hide();
        let stopped = self.stop();
        cleared.and(hidden).and(stopped)?;
        self.cleaned_up = true;
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        self.persist
    }

    /// A persistent panel keeps its refresh thread running after drop
    fn set_persist(&mut self, persist: bool) {
        self.persist = persist;
    }
}

impl<P> Drop for Hub08<P>
where
    P: Hub08Pins + Send + 'static,
{
    fn drop(&mut self) {
        if self.persist {
            return;
        }
        if let Err(e) = self.cleanup() {
            log::warn!("HUB08 cleanup failed: {}", e);
        }
    }
}

// ==================== Refresh Thread ====================

fn refresh<P: Hub08Pins>(shared: &Shared, pins: &Mutex<P>) -> Result<()> {
    log::debug!("HUB08 refresh thread started");
    let mut row = 0usize;
    loop {
        let period = shared.period_us.load(Ordering::Acquire);
        if period < 0 {
            break;
        }
        if shared.state.load(Ordering::Acquire) {
            let (upper, lower) = {
                let frame = shared.frame(shared.active.load(Ordering::Acquire));
                (frame[row], frame.get(row + SCAN_ROWS).copied().unwrap_or(DARK_ROW))
            };
            let duty = shared.duty.load(Ordering::Relaxed);
            if let Err(e) = scan_row(&mut *lock(pins), &upper, &lower, row, duty) {
                log::error!("HUB08 refresh stopped on row {}: {}", row, e);
                return Err(e);
            }
            row = (row + 1) % SCAN_ROWS;
        }
        thread::sleep(Duration::from_micros(period as u64));
    }
    log::debug!("HUB08 refresh thread exiting");
    Ok(())
}

/// Shift out one row pair and light it
pub fn scan_row<P: Hub08Pins + ?Sized>(
    pins: &mut P,
    upper: &[u8; BYTES_PER_ROW],
    lower: &[u8; BYTES_PER_ROW],
    row: usize,
    duty: u8,
) -> Result<()> {
    pwm(pins.en().set_duty_cycle_fully_on())?;
    for (byte, byte2) in upper.iter().zip(lower) {
        for bit in 0..8 {
            set(pins.r1(), PinState::from(byte & (1 << bit) != 0))?;
            set(pins.r2(), PinState::from(byte2 & (1 << bit) != 0))?;
            set(pins.clk(), PinState::Low)?;
            set(pins.clk(), PinState::High)?;
        }
    }
    set(pins.lat(), PinState::Low)?;
    set(pins.lat(), PinState::High)?;
    set_address(pins, row)?;
    pwm(pins.en().set_duty_cycle_percent(duty))
}

// ==================== Helper Functions ====================

fn lock<P>(pins: &Mutex<P>) -> MutexGuard<'_, P> {
    pins.lock().unwrap_or_else(PoisonError::into_inner)
}

fn micros(period: Duration) -> i64 {
    i64::try_from(period.as_micros()).unwrap_or(i64::MAX)
}

fn set_address<P: Hub08Pins + ?Sized>(pins: &mut P, row: usize) -> Result<()> {
    set(pins.a(), PinState::from(row & 0x01 != 0))?;
    set(pins.b(), PinState::from(row & 0x02 != 0))?;
    set(pins.c(), PinState::from(row & 0x04 != 0))?;
    set(pins.d(), PinState::from(row & 0x08 != 0))
}

fn set<PIN: OutputPin>(pin: &mut PIN, state: PinState) -> Result<()> {
    pin.set_state(state).map_err(|e| {
        log::error!("GPIO write error: {:?}", e);
        Error::Transport(DisplayError::BusWriteError)
    })
}

fn pwm<E: core::fmt::Debug>(outcome: core::result::Result<(), E>) -> Result<()> {
    outcome.map_err(|e| {
        log::error!("PWM error on output enable: {:?}", e);
        Error::Transport(DisplayError::BusWriteError)
    })
}

