//! Caller-facing PS/2 port.

use ps2io_abi::{PinId, Ps2Error, Ps2ErrorFlags, Ps2Result};
use ps2io_lib::{klog_debug, klog_info};

use super::config::Ps2Config;
use super::hal::{Ps2Hal, Ps2Pins};
use super::link::Ps2Link;
use super::transmit;

/// One PS/2 device on a data/clock pin pair.
///
/// Bytes the device sends arrive through the clock interrupt and queue up in
/// the link until [`Ps2::get_byte`] takes them. Dropping the driver releases
/// the pins and the link.
pub struct Ps2<H: Ps2Hal> {
    hal: H,
    link: &'static Ps2Link,
    pins: Ps2Pins,
    config: Ps2Config,
    deinited: bool,
}

impl<H: Ps2Hal> Ps2<H> {
    pub fn new(
        mut hal: H,
        link: &'static Ps2Link,
        data: PinId,
        clock: PinId,
        config: Ps2Config,
    ) -> Ps2Result<Self> {
        config.validate()?;
        if data == clock {
            return Err(Ps2Error::SamePin(data));
        }
        hal.check_pin(clock, true)
            .map_err(|error| Ps2Error::Pin { pin: clock, error })?;
        hal.check_pin(data, false)
            .map_err(|error| Ps2Error::Pin { pin: data, error })?;

        if !link.acquire() {
            return Err(Ps2Error::LinkBusy);
        }

        if let Err(error) = hal.claim_pin(clock) {
            link.release();
            return Err(Ps2Error::Pin { pin: clock, error });
        }
        if let Err(error) = hal.claim_pin(data) {
            hal.release_pin(clock);
            link.release();
            return Err(Ps2Error::Pin { pin: data, error });
        }

        hal.release(clock);
        hal.release(data);
        link.reset(&config);

        if let Err(error) = hal.attach_clock_irq(clock, data, link) {
            hal.release_pin(data);
            hal.release_pin(clock);
            link.release();
            return Err(Ps2Error::Pin { pin: clock, error });
        }

        klog_info!("ps2: bound data={} clock={}", data, clock);
        klog_debug!(
            "ps2: inhibit={}us request={}us response={}us overflow={}",
            config.inhibit_us,
            config.request_timeout_us,
            config.response_timeout_us,
            config.overflow
        );

        Ok(Self {
            hal,
            link,
            pins: Ps2Pins { data, clock },
            config,
            deinited: false,
        })
    }

    /// Release the pins and the link. Safe to call more than once.
    pub fn deinit(&mut self) {
        if self.deinited {
            return;
        }
        self.hal.detach_clock_irq(self.pins.clock);
        self.hal.release(self.pins.data);
        self.hal.release(self.pins.clock);
        self.hal.release_pin(self.pins.data);
        self.hal.release_pin(self.pins.clock);
        self.link.reset(&self.config);
        self.link.release();
        self.deinited = true;
        klog_info!("ps2: released data={} clock={}", self.pins.data, self.pins.clock);
    }

    #[inline]
    pub fn is_deinited(&self) -> bool {
        self.deinited
    }

    #[inline]
    fn check_live(&self) -> Ps2Result {
        if self.deinited {
            Err(Ps2Error::Deinited)
        } else {
            Ok(())
        }
    }

    /// Bytes waiting in the receive queue.
    pub fn len(&self) -> Ps2Result<usize> {
        self.check_live()?;
        Ok(self.link.len())
    }

    pub fn is_empty(&self) -> Ps2Result<bool> {
        self.check_live()?;
        Ok(self.link.is_empty())
    }

    /// Oldest received byte, or `None` if nothing has arrived.
    pub fn get_byte(&mut self) -> Ps2Result<Option<u8>> {
        self.check_live()?;
        Ok(self.link.pop())
    }

    /// Send the low byte of `value` and return the device's response byte.
    ///
    /// Blocks for at most the sum of the configured windows.
    pub fn send_byte(&mut self, value: u32) -> Ps2Result<u8> {
        self.check_live()?;
        let byte = (value & 0xFF) as u8;
        let response =
            transmit::send_byte(&mut self.hal, self.link, self.pins, &self.config, byte)?;
        Ok(response)
    }

    /// Errors since the previous call; the register is cleared.
    pub fn get_error(&mut self) -> Ps2Result<Ps2ErrorFlags> {
        self.check_live()?;
        Ok(self.link.take_errors())
    }

    #[inline]
    pub fn pins(&self) -> Ps2Pins {
        self.pins
    }

    #[inline]
    pub fn config(&self) -> &Ps2Config {
        &self.config
    }

    #[inline]
    pub fn hal(&self) -> &H {
        &self.hal
    }

    #[inline]
    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }
}

impl<H: Ps2Hal> Drop for Ps2<H> {
    fn drop(&mut self) {
        self.deinit();
    }
}
