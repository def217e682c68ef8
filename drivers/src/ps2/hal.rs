//! Platform seam for the PS/2 engine.
//!
//! The engine never touches registers. Everything it needs from the board
//! (pin ownership, open-drain line control, the falling-edge interrupt, a
//! microsecond clock) comes through [`Ps2Hal`].

use ps2io_abi::{PinError, PinId};

use super::link::Ps2Link;

/// What the edge glue must do to the Data pin after an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLine {
    /// Leave Data as it is.
    Hold,
    /// Pull Data low.
    DriveLow,
    /// Float Data (the pull-up makes it read high).
    Release,
}

impl DataLine {
    /// Action that puts `level` on an open-drain line.
    #[inline]
    pub const fn for_level(level: bool) -> Self {
        if level { Self::Release } else { Self::DriveLow }
    }
}

/// The data/clock pin pair bound to one driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ps2Pins {
    pub data: PinId,
    pub clock: PinId,
}

/// Board services consumed by the PS/2 engine.
///
/// Lines are open-drain: `drive_low` sinks the line, `release` floats it and
/// the bus pull-up (or the device) decides the level that `is_high` reads.
pub trait Ps2Hal {
    /// Validate a pin before anything is claimed. `needs_irq` is set for the
    /// clock pin, which must be able to raise falling-edge interrupts.
    fn check_pin(&self, pin: PinId, needs_irq: bool) -> Result<(), PinError>;

    /// Take exclusive ownership of a pin.
    fn claim_pin(&mut self, pin: PinId) -> Result<(), PinError>;

    fn release_pin(&mut self, pin: PinId);

    /// Route falling edges on `clock` to [`Ps2Link::on_clock_falling_edge`],
    /// sampling `data` at each edge and applying the returned [`DataLine`].
    fn attach_clock_irq(
        &mut self,
        clock: PinId,
        data: PinId,
        link: &'static Ps2Link,
    ) -> Result<(), PinError>;

    fn detach_clock_irq(&mut self, clock: PinId);

    fn drive_low(&mut self, pin: PinId);

    fn release(&mut self, pin: PinId);

    fn is_high(&self, pin: PinId) -> bool;

    /// Monotonic microsecond counter.
    fn now_us(&self) -> u64;

    /// Busy-wait. Interrupts stay enabled throughout.
    fn delay_us(&mut self, us: u32);

    /// Apply an interrupt's verdict to the Data pin.
    #[inline]
    fn apply_data_line(&mut self, data: PinId, action: DataLine) {
        match action {
            DataLine::Hold => {}
            DataLine::DriveLow => self.drive_low(data),
            DataLine::Release => self.release(data),
        }
    }
}
