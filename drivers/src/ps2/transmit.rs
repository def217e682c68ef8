//! Host-to-device transmit sequencer.
//!
//! The caller owns the handshake (inhibit, request-to-send, deadlines); the
//! interrupt handler owns the bits. On each falling edge the device produces
//! while a send is in flight, [`TransmitSequencer::on_edge`] decides the next
//! Data level and returns it as a [`DataLine`] for the edge glue to apply.
//!
//! ```text
//! Idle -> Inhibiting -> RequestToSend -> Clocking(1..=9) -> AwaitingAck
//!      -> AwaitingResponse -> Done(byte) | Failed(kind) -> Idle
//! ```

use ps2io_abi::{TxFailure, odd_parity};
use ps2io_lib::{Deadline, klog_debug, klog_warn};

use super::config::Ps2Config;
use super::frame::FrameEvent;
use super::hal::{DataLine, Ps2Hal, Ps2Pins};
use super::link::Ps2Link;

/// Edge index (after request-to-send) that carries the parity bit.
const TX_PARITY_EDGE: u8 = 8;

/// Edge index at which the host lets go of Data for the stop bit.
const TX_STOP_EDGE: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    Idle,
    /// Clock held low by the host. Edges are ignored.
    Inhibiting,
    /// Data low, Clock released; waiting for the device's first edge.
    RequestToSend,
    /// Next edge puts out wire bit `n` (1-7 data, 8 parity, 9 stop).
    Clocking(u8),
    /// Data released; the next edge samples the device's ACK bit.
    AwaitingAck,
    /// ACKed; the next good frame from the device is the response.
    AwaitingResponse,
    Done(u8),
    Failed(TxFailure),
}

impl TxPhase {
    /// Phases in which clock edges belong to the transmitter, not the decoder.
    #[inline]
    pub const fn is_host_driven(self) -> bool {
        matches!(
            self,
            Self::Inhibiting | Self::RequestToSend | Self::Clocking(_) | Self::AwaitingAck
        )
    }

    #[inline]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed(_))
    }
}

pub struct TransmitSequencer {
    phase: TxPhase,
    byte: u8,
}

impl TransmitSequencer {
    pub const fn new() -> Self {
        Self {
            phase: TxPhase::Idle,
            byte: 0,
        }
    }

    #[inline]
    pub fn phase(&self) -> TxPhase {
        self.phase
    }

    #[inline]
    pub fn is_host_driven(&self) -> bool {
        self.phase.is_host_driven()
    }

    /// Load `byte` and enter the inhibit phase.
    pub fn begin(&mut self, byte: u8) {
        self.byte = byte;
        self.phase = TxPhase::Inhibiting;
    }

    pub fn request_to_send(&mut self) {
        self.phase = TxPhase::RequestToSend;
    }

    /// Return to Idle, handing back the phase the send ended in.
    pub fn finish(&mut self) -> TxPhase {
        core::mem::replace(&mut self.phase, TxPhase::Idle)
    }

    /// Advance by one falling Clock edge. Interrupt context.
    pub fn on_edge(&mut self, data_high: bool) -> DataLine {
        match self.phase {
            TxPhase::RequestToSend => {
                self.phase = TxPhase::Clocking(1);
                DataLine::for_level(self.byte & 1 != 0)
            }
            TxPhase::Clocking(n) if n < TX_PARITY_EDGE => {
                self.phase = TxPhase::Clocking(n + 1);
                DataLine::for_level((self.byte >> n) & 1 != 0)
            }
            TxPhase::Clocking(TX_PARITY_EDGE) => {
                self.phase = TxPhase::Clocking(TX_STOP_EDGE);
                DataLine::for_level(odd_parity(self.byte))
            }
            TxPhase::Clocking(_) => {
                self.phase = TxPhase::AwaitingAck;
                DataLine::Release
            }
            TxPhase::AwaitingAck => {
                self.phase = if data_high {
                    TxPhase::Failed(TxFailure::NoAck)
                } else {
                    TxPhase::AwaitingResponse
                };
                DataLine::Hold
            }
            _ => DataLine::Hold,
        }
    }

    /// Offer a decoded frame to a send waiting for its response.
    ///
    /// Returns true if the event was consumed and must not be queued.
    /// A stall timeout alone does not end the wait.
    pub fn offer_response(&mut self, event: FrameEvent) -> bool {
        if self.phase != TxPhase::AwaitingResponse {
            return false;
        }
        match event {
            FrameEvent::Byte(byte) => {
                self.phase = TxPhase::Done(byte);
                true
            }
            FrameEvent::Error(flags) if flags.has_frame_error() => {
                self.phase = TxPhase::Failed(TxFailure::BadResponse(flags));
                true
            }
            _ => false,
        }
    }
}

impl Default for TransmitSequencer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Caller-side handshake
// =============================================================================

/// Poll the link until `ready` holds or `window_us` runs out.
fn wait_for<H, F>(
    hal: &mut H,
    link: &Ps2Link,
    poll_us: u32,
    window_us: u32,
    mut ready: F,
) -> bool
where
    H: Ps2Hal,
    F: FnMut(&H, TxPhase) -> bool,
{
    let deadline = Deadline::starting_at(hal.now_us(), window_us);
    loop {
        if ready(&*hal, link.tx_phase()) {
            return true;
        }
        if deadline.expired(hal.now_us()) {
            return false;
        }
        hal.delay_us(poll_us);
    }
}

fn run_handshake<H: Ps2Hal>(
    hal: &mut H,
    link: &Ps2Link,
    pins: Ps2Pins,
    cfg: &Ps2Config,
) -> Result<u8, TxFailure> {
    let poll = cfg.poll_interval_us;

    if !wait_for(hal, link, poll, cfg.request_timeout_us, |_, p| {
        p != TxPhase::RequestToSend
    }) {
        return Err(TxFailure::RequestTimeout);
    }

    if !wait_for(hal, link, poll, cfg.transfer_timeout_us, |_, p| {
        !p.is_host_driven()
    }) {
        return Err(if hal.is_high(pins.clock) {
            TxFailure::ClockLowTimeout
        } else {
            TxFailure::ClockHighTimeout
        });
    }

    if let TxPhase::Failed(failure) = link.tx_phase() {
        return Err(failure);
    }

    if !wait_for(hal, link, poll, cfg.ack_release_timeout_us, |h, p| {
        p.is_finished() || h.is_high(pins.clock)
    }) {
        return Err(TxFailure::AckClockTimeout);
    }

    if !wait_for(hal, link, poll, cfg.response_timeout_us, |_, p| {
        p.is_finished()
    }) {
        return Err(TxFailure::NoResponse);
    }

    match link.tx_phase() {
        TxPhase::Done(byte) => Ok(byte),
        TxPhase::Failed(failure) => Err(failure),
        _ => Err(TxFailure::NoResponse),
    }
}

/// Write one byte to the device and wait for its response byte.
///
/// Both lines are released and the sequencer is back at Idle on every exit.
/// Failures are also raised in the link's status register.
pub fn send_byte<H: Ps2Hal>(
    hal: &mut H,
    link: &Ps2Link,
    pins: Ps2Pins,
    cfg: &Ps2Config,
    byte: u8,
) -> Result<u8, TxFailure> {
    link.begin_transmit(byte);
    hal.drive_low(pins.clock);
    hal.delay_us(cfg.inhibit_us);
    hal.drive_low(pins.data);
    link.request_to_send();
    hal.release(pins.clock);

    let waited = run_handshake(hal, link, pins, cfg);
    // The interrupt may have settled the send after the last deadline check.
    let result = match link.end_transmit() {
        TxPhase::Done(response) => Ok(response),
        TxPhase::Failed(failure) => Err(failure),
        _ => waited,
    };
    hal.release(pins.data);
    hal.release(pins.clock);

    match result {
        Ok(response) => {
            klog_debug!("ps2: sent 0x{:02x}, device answered 0x{:02x}", byte, response);
        }
        Err(failure) => {
            link.raise(failure.flags());
            klog_warn!("ps2: send 0x{:02x} failed: {}", byte, failure);
        }
    }
    result
}
