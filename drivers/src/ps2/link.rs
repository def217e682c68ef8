//! State shared between a driver and its clock interrupt.
//!
//! A [`Ps2Link`] outlives any driver bound to it: the platform registers it
//! with the edge interrupt as a `&'static`, so it is either a `static` or a
//! leaked allocation. Lock order is sequencer before decoder.

use core::sync::atomic::{AtomicBool, Ordering};

use ps2io_abi::{Ps2ErrorFlags, RX_QUEUE_CAPACITY};
use ps2io_lib::{ByteRing, IrqMutex};

use super::config::{OverflowPolicy, Ps2Config};
use super::frame::{FrameDecoder, FrameEvent};
use super::hal::DataLine;
use super::status::StatusRegister;
use super::transmit::{TransmitSequencer, TxPhase};

pub struct Ps2Link {
    decoder: IrqMutex<FrameDecoder>,
    tx: IrqMutex<TransmitSequencer>,
    rx: ByteRing<RX_QUEUE_CAPACITY>,
    status: StatusRegister,
    in_use: AtomicBool,
    drop_oldest: AtomicBool,
}

impl Ps2Link {
    pub const fn new() -> Self {
        Self {
            decoder: IrqMutex::new(FrameDecoder::new()),
            tx: IrqMutex::new(TransmitSequencer::new()),
            rx: ByteRing::new(),
            status: StatusRegister::new(),
            in_use: AtomicBool::new(false),
            drop_oldest: AtomicBool::new(false),
        }
    }

    // =========================================================================
    // Interrupt context
    // =========================================================================

    /// Falling edge on Clock. `data_high` is the Data level sampled at the edge.
    ///
    /// The returned action must be applied to the Data pin before the next
    /// rising edge.
    pub fn on_clock_falling_edge(&self, data_high: bool, now_us: u64) -> DataLine {
        let mut tx = self.tx.lock();
        if tx.is_host_driven() {
            return tx.on_edge(data_high);
        }

        let event = self.decoder.lock().sample(data_high, now_us);
        if event == FrameEvent::Pending || tx.offer_response(event) {
            return DataLine::Hold;
        }
        drop(tx);

        match event {
            FrameEvent::Byte(byte) => self.enqueue(byte),
            FrameEvent::Error(flags) => self.status.raise(flags),
            FrameEvent::Pending => {}
        }
        DataLine::Hold
    }

    fn enqueue(&self, byte: u8) {
        let stored = if self.drop_oldest.load(Ordering::Relaxed) {
            self.rx.push_overwrite(byte)
        } else {
            self.rx.push(byte)
        };
        if !stored {
            self.status.raise(Ps2ErrorFlags::BUFFER_OVERFLOW);
        }
    }

    // =========================================================================
    // Caller context
    // =========================================================================

    /// Claim the link for one driver. False if another driver holds it.
    pub fn acquire(&self) -> bool {
        self.in_use
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.in_use.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::Acquire)
    }

    /// Drop all protocol state and apply `cfg`'s interrupt-side settings.
    pub fn reset(&self, cfg: &Ps2Config) {
        {
            let mut tx = self.tx.lock();
            tx.finish();
            let mut decoder = self.decoder.lock();
            decoder.reset();
            decoder.set_stall_window(cfg.rx_stall_us);
        }
        self.drop_oldest.store(
            cfg.overflow == OverflowPolicy::DropOldest,
            Ordering::Relaxed,
        );
        self.rx.clear();
        self.status.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    #[inline]
    pub fn pop(&self) -> Option<u8> {
        self.rx.pop()
    }

    /// Read and clear the error register.
    #[inline]
    pub fn take_errors(&self) -> Ps2ErrorFlags {
        self.status.take()
    }

    #[inline]
    pub fn raise(&self, flags: Ps2ErrorFlags) {
        self.status.raise(flags);
    }

    /// Start a send. Any frame being received is abandoned.
    pub fn begin_transmit(&self, byte: u8) {
        let mut tx = self.tx.lock();
        tx.begin(byte);
        self.decoder.lock().reset();
    }

    pub fn request_to_send(&self) {
        self.tx.lock().request_to_send();
    }

    #[inline]
    pub fn tx_phase(&self) -> TxPhase {
        self.tx.lock().phase()
    }

    /// Return the sequencer to Idle, yielding the phase the send ended in.
    pub fn end_transmit(&self) -> TxPhase {
        let mut tx = self.tx.lock();
        let phase = tx.finish();
        if !phase.is_finished() {
            // Cut off mid-handshake; the device may be partway into a frame.
            self.decoder.lock().reset();
        }
        phase
    }
}

impl Default for Ps2Link {
    fn default() -> Self {
        Self::new()
    }
}
